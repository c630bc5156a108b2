//! Case-insensitive HTTP header storage.
//!
//! [`HeaderCollection`] stores header values under canonicalized names:
//! ASCII lower-case with `_` folded to `-`. Canonicalization happens at
//! every insertion and lookup boundary, so iteration only ever exposes
//! canonical names and callers may use whatever casing they like.
//!
//! Multiple values for one header are joined with `", "` at write time and
//! stored as a single string, never as a list. Retrieval can split the
//! joined string back into tokens, optionally ordered by the `;q=` quality
//! weight clients attach to negotiable headers such as `Accept-Language`.
//!
//! Header names and values are trusted as given: nothing rejects control
//! characters or otherwise validates wire legality. Higher layers own that
//! policy.

use crate::collection::KeyValueCollection;

/// Canonical header name: lower-cased, underscores folded to hyphens.
fn canonicalize(name: &str) -> String {
    name.to_ascii_lowercase().replace('_', "-")
}

/// An ordered header collection with case-insensitive access.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeaderCollection {
    inner: KeyValueCollection<String>,
}

impl HeaderCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            inner: KeyValueCollection::new(),
        }
    }

    /// Build a collection from name/value pairs, adding each pair in order.
    /// Pairs sharing a canonical name compose into one joined value.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut headers = Self::new();
        for (name, value) in pairs {
            headers.add_header(name.as_ref(), value.as_ref());
        }
        headers
    }

    /// Assign a header, overwriting any prior value.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.inner.set(canonicalize(name), value.to_string());
    }

    /// Assign a header from several values, joined with `", "`.
    pub fn set_header_values(&mut self, name: &str, values: &[&str]) {
        self.inner.set(canonicalize(name), values.join(", "));
    }

    /// Append a value to a header, composing with `", "` when the header
    /// already exists.
    pub fn add_header(&mut self, name: &str, value: &str) {
        let name = canonicalize(name);
        match self.inner.get_mut(&name) {
            Some(existing) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            None => self.inner.set(name, value.to_string()),
        }
    }

    /// The raw joined value of a header, if present.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.inner.get(&canonicalize(name)).map(String::as_str)
    }

    /// Alias of [`header`](Self::header), kept for interface-compatible
    /// naming with line-oriented consumers.
    pub fn header_line(&self, name: &str) -> Option<&str> {
        self.header(name)
    }

    /// Split a header into its comma-separated tokens, trimmed.
    ///
    /// Duplicate and empty tokens are preserved as-is; a value that itself
    /// contains a comma splits with it.
    pub fn header_values(&self, name: &str) -> Option<Vec<String>> {
        self.header(name)
            .map(|value| value.split(',').map(|token| token.trim().to_string()).collect())
    }

    /// Split a header into tokens ordered by descending `;q=` quality.
    ///
    /// The quality marker is stripped from each returned token. A missing
    /// quality defaults to 1.0; an unparseable one also counts as 1.0 rather
    /// than poisoning the comparison. Tokens of equal quality keep their
    /// original order.
    pub fn header_ordered_values(&self, name: &str) -> Option<Vec<String>> {
        let tokens = self.header_values(name)?;

        let mut weighted: Vec<(String, f64)> = tokens
            .into_iter()
            .map(|token| match token.split_once(";q=") {
                Some((bare, quality)) => {
                    let quality = quality.trim().parse::<f64>().unwrap_or_else(|_| {
                        tracing::warn!(header = %name, token = %token, "malformed q-value, assuming 1");
                        1.0
                    });
                    (bare.to_string(), quality)
                }
                None => (token, 1.0),
            })
            .collect();

        // Stable sort: equal qualities preserve submission order.
        weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

        Some(weighted.into_iter().map(|(token, _)| token).collect())
    }

    /// Whether the header exists, under any casing.
    pub fn has_header(&self, name: &str) -> bool {
        self.inner.has(&canonicalize(name))
    }

    /// Remove a header.
    pub fn remove_header(&mut self, name: &str) {
        self.inner.remove(&canonicalize(name));
    }

    /// Copy with the header assigned; the receiver is untouched.
    pub fn with_header(&self, name: &str, value: &str) -> Self {
        let mut headers = self.clone();
        headers.set_header(name, value);
        headers
    }

    /// Copy with a value appended to the header; the receiver is untouched.
    pub fn with_added_header(&self, name: &str, value: &str) -> Self {
        let mut headers = self.clone();
        headers.add_header(name, value);
        headers
    }

    /// Copy without the header; the receiver is untouched.
    pub fn without_header(&self, name: &str) -> Self {
        let mut headers = self.clone();
        headers.remove_header(name);
        headers
    }

    /// Iterate `(canonical_name, joined_value)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(name, value)| (name, value.as_str()))
    }

    /// Number of distinct headers.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the collection holds no headers.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
