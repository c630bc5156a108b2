use crate::base::HttpError;
use crate::collection::KeyValueCollection;
use crate::cookies::cookie::{Cookie, SameSite};

/// A cookie collection keyed by cookie name.
///
/// Setting a cookie whose name is already present replaces it in place;
/// iteration yields cookies in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CookieCollection {
    inner: KeyValueCollection<Cookie>,
}

impl CookieCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            inner: KeyValueCollection::new(),
        }
    }

    /// Build a collection from request name/value pairs, as delivered by a
    /// transport that has already split the `Cookie` header.
    ///
    /// Pairs with an empty name cannot form a cookie and are skipped.
    pub fn from_pairs<K, V, I>(pairs: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        let mut cookies = Self::new();
        for (name, value) in pairs {
            match Cookie::new(name.as_ref(), value.as_ref()) {
                Ok(cookie) => cookies.set_cookie(cookie),
                Err(_) => {
                    tracing::debug!("skipping request cookie with empty name");
                }
            }
        }
        cookies
    }

    /// Build a collection from a raw `Cookie` request header line such as
    /// `a=1; b=2`. Malformed segments are skipped, as browsers do.
    pub fn from_header_line(line: &str) -> Self {
        let mut cookies = Self::new();
        for parsed in cookie::Cookie::split_parse_encoded(line.to_string()) {
            match parsed {
                Ok(pair) => {
                    if let Ok(cookie) = Cookie::new(pair.name(), pair.value()) {
                        cookies.set_cookie(cookie);
                    }
                }
                Err(error) => {
                    tracing::debug!(error = %error, "skipping malformed cookie segment");
                }
            }
        }
        cookies
    }

    /// Construct a cookie with the full attribute set, store it, and return
    /// a copy of the stored cookie.
    #[allow(clippy::too_many_arguments)]
    pub fn create_cookie(
        &mut self,
        name: &str,
        value: &str,
        max_age: Option<i64>,
        domain: &str,
        path: &str,
        secure: Option<bool>,
        http_only: Option<bool>,
        same_site: Option<SameSite>,
    ) -> Result<Cookie, HttpError> {
        let mut cookie = Cookie::new(name, value)?;
        cookie.set_max_age(max_age);
        cookie.set_domain(domain);
        cookie.set_path(path);
        if let Some(secure) = secure {
            cookie.set_secure(secure);
        }
        if let Some(http_only) = http_only {
            cookie.set_http_only(http_only);
        }
        cookie.set_same_site(same_site);

        self.set_cookie(cookie.clone());
        Ok(cookie)
    }

    /// Store a cookie under its own name.
    pub fn set_cookie(&mut self, cookie: Cookie) {
        self.inner.set(cookie.name().to_string(), cookie);
    }

    /// Look up a cookie by name.
    ///
    /// Fails with [`HttpError::CookieNotFound`] when absent.
    pub fn get_cookie(&self, name: &str) -> Result<&Cookie, HttpError> {
        self.inner
            .get(name)
            .ok_or_else(|| HttpError::CookieNotFound(name.to_string()))
    }

    /// Whether a cookie with this name exists.
    pub fn has_cookie(&self, name: &str) -> bool {
        self.inner.has(name)
    }

    /// Remove a cookie by name.
    pub fn remove_cookie(&mut self, name: &str) {
        self.inner.remove(name);
    }

    /// Copy with the cookie stored; the receiver is untouched.
    pub fn with_cookie(&self, cookie: Cookie) -> Self {
        let mut cookies = self.clone();
        cookies.set_cookie(cookie);
        cookies
    }

    /// Copy without the named cookie; the receiver is untouched.
    pub fn without_cookie(&self, name: &str) -> Self {
        let mut cookies = self.clone();
        cookies.remove_cookie(name);
        cookies
    }

    /// Iterate cookies in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Cookie> {
        self.inner.values()
    }

    /// Number of cookies.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the collection holds no cookies.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
