use std::fmt;

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Duration, OffsetDateTime};

use crate::base::HttpError;

/// IMF-fixdate, the `Expires` wire format: `Sun, 06 Nov 1994 08:49:37 GMT`.
static IMF_FIXDATE: &[BorrowedFormatItem<'static>] = format_description!(
    "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
);

/// The `SameSite` cookie attribute modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
        }
    }
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single cookie with its attributes.
///
/// Every attribute has a paired in-place `set_*` and copying `with_*`
/// mutator; the `with_*` form never alters its receiver. `secure` and
/// `http_only` are tri-state: unset cookies emit neither flag.
///
/// `Display` produces the `Set-Cookie` wire format with `Max-Age`,
/// `Expires`, `Domain`, `Path`, `Secure`, `HttpOnly`, and `SameSite`
/// attributes in exactly that order.
#[derive(Debug, Clone, PartialEq)]
pub struct Cookie {
    name: String,
    value: String,
    max_age: Option<i64>,
    domain: String,
    path: String,
    secure: Option<bool>,
    http_only: Option<bool>,
    same_site: Option<SameSite>,
}

impl Cookie {
    /// Create a cookie with the given name and value and no attributes.
    ///
    /// Fails with [`HttpError::EmptyCookieName`] when the name is empty.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, HttpError> {
        let name = name.into();
        if name.is_empty() {
            return Err(HttpError::EmptyCookieName);
        }

        Ok(Self {
            name,
            value: value.into(),
            max_age: None,
            domain: String::new(),
            path: String::new(),
            secure: None,
            http_only: None,
            same_site: None,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Copy with the new name; the receiver is untouched.
    pub fn with_name(&self, name: impl Into<String>) -> Self {
        let mut cookie = self.clone();
        cookie.set_name(name);
        cookie
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Copy with the new value; the receiver is untouched.
    pub fn with_value(&self, value: impl Into<String>) -> Self {
        let mut cookie = self.clone();
        cookie.set_value(value);
        cookie
    }

    /// Max age in seconds, used to derive the `Expires` attribute.
    pub fn max_age(&self) -> Option<i64> {
        self.max_age
    }

    pub fn set_max_age(&mut self, seconds: Option<i64>) {
        self.max_age = seconds;
    }

    /// Copy with the new max age; the receiver is untouched.
    pub fn with_max_age(&self, seconds: Option<i64>) -> Self {
        let mut cookie = self.clone();
        cookie.set_max_age(seconds);
        cookie
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn set_domain(&mut self, domain: impl Into<String>) {
        self.domain = domain.into();
    }

    /// Copy with the new domain; the receiver is untouched.
    pub fn with_domain(&self, domain: impl Into<String>) -> Self {
        let mut cookie = self.clone();
        cookie.set_domain(domain);
        cookie
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<String>) {
        self.path = path.into();
    }

    /// Copy with the new path; the receiver is untouched.
    pub fn with_path(&self, path: impl Into<String>) -> Self {
        let mut cookie = self.clone();
        cookie.set_path(path);
        cookie
    }

    pub fn secure(&self) -> Option<bool> {
        self.secure
    }

    pub fn set_secure(&mut self, secure: bool) {
        self.secure = Some(secure);
    }

    /// Copy with the new secure flag; the receiver is untouched.
    pub fn with_secure(&self, secure: bool) -> Self {
        let mut cookie = self.clone();
        cookie.set_secure(secure);
        cookie
    }

    pub fn http_only(&self) -> Option<bool> {
        self.http_only
    }

    pub fn set_http_only(&mut self, http_only: bool) {
        self.http_only = Some(http_only);
    }

    /// Copy with the new http-only flag; the receiver is untouched.
    pub fn with_http_only(&self, http_only: bool) -> Self {
        let mut cookie = self.clone();
        cookie.set_http_only(http_only);
        cookie
    }

    pub fn same_site(&self) -> Option<SameSite> {
        self.same_site
    }

    pub fn set_same_site(&mut self, same_site: Option<SameSite>) {
        self.same_site = same_site;
    }

    /// Copy with the new same-site mode; the receiver is untouched.
    pub fn with_same_site(&self, same_site: Option<SameSite>) -> Self {
        let mut cookie = self.clone();
        cookie.set_same_site(same_site);
        cookie
    }

    /// Serialize to the `Set-Cookie` wire format with `Expires` computed
    /// against the supplied clock. `Display` delegates here with the current
    /// time; tests pin the clock.
    pub fn format_at(&self, now: OffsetDateTime) -> String {
        let mut line = format!("{}={}", self.name, urlencode(&self.value));

        if let Some(age) = self.max_age {
            line.push_str(&format!("; Max-Age={age}"));
            let expires = now + Duration::seconds(age);
            // A date outside the formattable range degrades to an absent
            // Expires rather than failing string conversion.
            if let Ok(date) = expires.format(IMF_FIXDATE) {
                line.push_str(&format!("; Expires={date}"));
            }
        }

        if !self.domain.is_empty() {
            line.push_str(&format!("; Domain={}", self.domain));
        }

        if !self.path.is_empty() {
            line.push_str(&format!("; Path={}", self.path));
        }

        if self.secure == Some(true) {
            line.push_str("; Secure");
        }

        if self.http_only == Some(true) {
            line.push_str("; HttpOnly");
        }

        if let Some(same_site) = self.same_site {
            line.push_str(&format!("; SameSite={same_site}"));
        }

        line
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_at(OffsetDateTime::now_utc()))
    }
}

/// `application/x-www-form-urlencoded` serialization of a cookie value,
/// space encoded as `+`.
fn urlencode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_empty_name_fails() {
        let err = Cookie::new("", "value").unwrap_err();
        assert!(matches!(err, HttpError::EmptyCookieName));
    }

    #[test]
    fn test_minimal_serialization() {
        let cookie = Cookie::new("session", "abc123").unwrap();
        assert_eq!(cookie.format_at(datetime!(2020-01-01 00:00:00 UTC)), "session=abc123");
    }

    #[test]
    fn test_value_is_urlencoded() {
        let cookie = Cookie::new("pref", "a b&c=d").unwrap();
        assert_eq!(
            cookie.format_at(datetime!(2020-01-01 00:00:00 UTC)),
            "pref=a+b%26c%3Dd"
        );
    }

    #[test]
    fn test_full_serialization_order() {
        let cookie = Cookie::new("n", "v")
            .unwrap()
            .with_max_age(Some(3600))
            .with_domain("d.tld")
            .with_path("/p")
            .with_secure(true)
            .with_http_only(true)
            .with_same_site(Some(SameSite::Strict));

        let now = datetime!(1994-11-06 07:49:37 UTC);
        assert_eq!(
            cookie.format_at(now),
            "n=v; Max-Age=3600; Expires=Sun, 06 Nov 1994 08:49:37 GMT; Domain=d.tld; Path=/p; Secure; HttpOnly; SameSite=Strict"
        );
    }

    #[test]
    fn test_max_age_zero_still_emits_expires() {
        let cookie = Cookie::new("gone", "").unwrap().with_max_age(Some(0));
        assert_eq!(
            cookie.format_at(datetime!(1994-11-06 08:49:37 UTC)),
            "gone=; Max-Age=0; Expires=Sun, 06 Nov 1994 08:49:37 GMT"
        );
    }

    #[test]
    fn test_unset_flags_are_omitted() {
        let cookie = Cookie::new("n", "v")
            .unwrap()
            .with_secure(false)
            .with_http_only(false);
        assert_eq!(cookie.format_at(datetime!(2020-01-01 00:00:00 UTC)), "n=v");
    }

    #[test]
    fn test_same_site_lax() {
        let cookie = Cookie::new("n", "v").unwrap().with_same_site(Some(SameSite::Lax));
        assert_eq!(
            cookie.format_at(datetime!(2020-01-01 00:00:00 UTC)),
            "n=v; SameSite=Lax"
        );
    }

    #[test]
    fn test_with_name_never_mutates_original() {
        let original = Cookie::new("original", "v").unwrap();
        let renamed = original.with_name("renamed");

        assert_eq!(original.name(), "original");
        assert_eq!(renamed.name(), "renamed");
        assert_eq!(renamed.value(), "v");
    }

    #[test]
    fn test_with_chain_changes_one_field_each() {
        let base = Cookie::new("n", "v").unwrap();
        let secured = base.with_secure(true);

        assert_eq!(base.secure(), None);
        assert_eq!(secured.secure(), Some(true));
        assert_eq!(secured.with_secure(false).secure(), Some(false));
        assert_eq!(secured.name(), base.name());
        assert_eq!(secured.value(), base.value());
    }
}
