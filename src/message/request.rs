use url::Url;

use crate::base::HttpError;
use crate::body::BodyStream;
use crate::cookies::{Cookie, CookieCollection};
use crate::headers::HeaderCollection;
use crate::message::Message;

/// An outgoing or incoming HTTP request.
///
/// The method is a free-form string: no verb validation happens here, the
/// transport decides what it is willing to send. The URI is a parsed
/// [`Url`]; the request-target is derived from its path.
#[derive(Debug, Clone)]
pub struct Request {
    message: Message,
    method: String,
    uri: Url,
    cookies: CookieCollection,
}

impl Request {
    /// A request with the given method and URI, empty headers and body.
    ///
    /// Fails with [`HttpError::InvalidUri`] when the URI does not parse.
    pub fn new(method: impl Into<String>, uri: &str) -> Result<Self, HttpError> {
        Ok(Self {
            message: Message::default(),
            method: method.into(),
            uri: Url::parse(uri)?,
            cookies: CookieCollection::new(),
        })
    }

    /// A request built from an already parsed URI and assembled parts.
    pub fn from_parts(
        method: impl Into<String>,
        uri: Url,
        headers: HeaderCollection,
        body: BodyStream,
        cookies: CookieCollection,
    ) -> Self {
        Self {
            message: Message::new(headers, body),
            method: method.into(),
            uri,
            cookies,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn set_method(&mut self, method: impl Into<String>) {
        self.method = method.into();
    }

    /// Copy with the new method; the receiver is untouched.
    pub fn with_method(&self, method: impl Into<String>) -> Self {
        let mut request = self.clone();
        request.set_method(method);
        request
    }

    pub fn uri(&self) -> &Url {
        &self.uri
    }

    pub fn set_uri(&mut self, uri: Url) {
        self.uri = uri;
    }

    /// Copy with the new URI; the receiver is untouched.
    pub fn with_uri(&self, uri: Url) -> Self {
        let mut request = self.clone();
        request.set_uri(uri);
        request
    }

    /// The URI path as sent on the request line; an empty path normalizes
    /// to `/`.
    pub fn request_target(&self) -> &str {
        let path = self.uri.path();
        if path.is_empty() {
            "/"
        } else {
            path
        }
    }

    pub fn set_request_target(&mut self, path: &str) {
        self.uri.set_path(path);
    }

    /// Copy with the new request-target path; the receiver is untouched.
    pub fn with_request_target(&self, path: &str) -> Self {
        let mut request = self.clone();
        request.set_request_target(path);
        request
    }

    // Message delegation

    pub fn protocol_version(&self) -> &str {
        self.message.protocol_version()
    }

    pub fn set_protocol_version(&mut self, version: impl Into<String>) {
        self.message.set_protocol_version(version);
    }

    /// Copy with the new protocol version; the receiver is untouched.
    pub fn with_protocol_version(&self, version: impl Into<String>) -> Self {
        let mut request = self.clone();
        request.set_protocol_version(version);
        request
    }

    pub fn headers(&self) -> &HeaderCollection {
        self.message.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderCollection {
        self.message.headers_mut()
    }

    pub fn set_headers(&mut self, headers: HeaderCollection) {
        self.message.set_headers(headers);
    }

    /// Copy with one header assigned; the receiver is untouched.
    pub fn with_header(&self, name: &str, value: &str) -> Self {
        let mut request = self.clone();
        request.headers_mut().set_header(name, value);
        request
    }

    /// Copy with one header value appended; the receiver is untouched.
    pub fn with_added_header(&self, name: &str, value: &str) -> Self {
        let mut request = self.clone();
        request.headers_mut().add_header(name, value);
        request
    }

    /// Copy without the header; the receiver is untouched.
    pub fn without_header(&self, name: &str) -> Self {
        let mut request = self.clone();
        request.headers_mut().remove_header(name);
        request
    }

    pub fn body(&self) -> &BodyStream {
        self.message.body()
    }

    pub fn body_mut(&mut self) -> &mut BodyStream {
        self.message.body_mut()
    }

    pub fn set_body(&mut self, body: BodyStream) {
        self.message.set_body(body);
    }

    /// Copy with the new body; the receiver is untouched.
    pub fn with_body(&self, body: BodyStream) -> Self {
        let mut request = self.clone();
        request.set_body(body);
        request
    }

    // Cookies

    pub fn cookies(&self) -> &CookieCollection {
        &self.cookies
    }

    pub fn cookies_mut(&mut self) -> &mut CookieCollection {
        &mut self.cookies
    }

    pub fn set_cookies(&mut self, cookies: CookieCollection) {
        self.cookies = cookies;
    }

    pub fn cookie(&self, name: &str) -> Result<&Cookie, HttpError> {
        self.cookies.get_cookie(name)
    }

    pub fn has_cookie(&self, name: &str) -> bool {
        self.cookies.has_cookie(name)
    }

    /// Copy with the cookie stored; the receiver is untouched.
    pub fn with_cookie(&self, cookie: Cookie) -> Self {
        let mut request = self.clone();
        request.cookies_mut().set_cookie(cookie);
        request
    }

    /// Copy without the named cookie; the receiver is untouched.
    pub fn without_cookie(&self, name: &str) -> Self {
        let mut request = self.clone();
        request.cookies_mut().remove_cookie(name);
        request
    }
}
