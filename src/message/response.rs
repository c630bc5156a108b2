use crate::base::HttpError;
use crate::body::BodyStream;
use crate::cookies::Cookie;
use crate::headers::HeaderCollection;
use crate::message::Message;

/// An outgoing HTTP response.
///
/// The status code is range-validated to 100–599 at every assignment. The
/// reason phrase falls back to the standard registry when not supplied.
///
/// Responses carry no cookie collection: outgoing cookies ride as literal
/// `Set-Cookie` headers, appended with [`with_set_cookie`](Self::with_set_cookie).
#[derive(Debug, Clone)]
pub struct Response {
    message: Message,
    status: u16,
    reason: Option<String>,
}

impl Response {
    /// A response with the given status, empty headers and body.
    ///
    /// Fails with [`HttpError::InvalidStatusCode`] outside 100–599.
    pub fn new(status: u16) -> Result<Self, HttpError> {
        if !(100..=599).contains(&status) {
            return Err(HttpError::InvalidStatusCode(status));
        }
        Ok(Self {
            message: Message::default(),
            status,
            reason: None,
        })
    }

    /// A response built from assembled parts.
    pub fn from_parts(
        status: u16,
        reason: Option<String>,
        headers: HeaderCollection,
        body: BodyStream,
    ) -> Result<Self, HttpError> {
        if !(100..=599).contains(&status) {
            return Err(HttpError::InvalidStatusCode(status));
        }
        Ok(Self {
            message: Message::new(headers, body),
            status,
            reason,
        })
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Reassign the status and optionally the reason phrase. A `None`
    /// reason clears any explicit phrase so the registry default applies.
    pub fn set_status(&mut self, status: u16, reason: Option<&str>) -> Result<(), HttpError> {
        if !(100..=599).contains(&status) {
            return Err(HttpError::InvalidStatusCode(status));
        }
        self.status = status;
        self.reason = reason.map(str::to_string);
        Ok(())
    }

    /// Copy with the new status; the receiver is untouched.
    pub fn with_status(&self, status: u16, reason: Option<&str>) -> Result<Self, HttpError> {
        let mut response = self.clone();
        response.set_status(status, reason)?;
        Ok(response)
    }

    /// The explicit reason phrase, else the registry default for the status,
    /// else the empty string.
    pub fn reason_phrase(&self) -> &str {
        self.reason
            .as_deref()
            .or_else(|| reason_phrase_for(self.status))
            .unwrap_or("")
    }

    pub fn set_reason_phrase(&mut self, reason: Option<&str>) {
        self.reason = reason.map(str::to_string);
    }

    /// Copy with the new reason phrase; the receiver is untouched.
    pub fn with_reason_phrase(&self, reason: Option<&str>) -> Self {
        let mut response = self.clone();
        response.set_reason_phrase(reason);
        response
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
        let mut response = self.clone();
        response.set_protocol_version(version);
        response
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
        let mut response = self.clone();
        response.headers_mut().set_header(name, value);
        response
    }

    /// Copy with one header value appended; the receiver is untouched.
    pub fn with_added_header(&self, name: &str, value: &str) -> Self {
        let mut response = self.clone();
        response.headers_mut().add_header(name, value);
        response
    }

    /// Copy without the header; the receiver is untouched.
    pub fn without_header(&self, name: &str) -> Self {
        let mut response = self.clone();
        response.headers_mut().remove_header(name);
        response
    }

    /// Copy with the cookie serialized onto a `Set-Cookie` header; the
    /// receiver is untouched.
    pub fn with_set_cookie(&self, cookie: &Cookie) -> Self {
        self.with_added_header("set-cookie", &cookie.to_string())
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
        let mut response = self.clone();
        response.set_body(body);
        response
    }
}

/// The registered reason phrase for a status code.
pub fn reason_phrase_for(status: u16) -> Option<&'static str> {
    let phrase = match status {
        // Informational 1xx
        100 => "Continue",
        101 => "Switching Protocols",
        102 => "Processing",
        // Successful 2xx
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        207 => "Multi-Status",
        208 => "Already Reported",
        226 => "IM Used",
        // Redirection 3xx
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        306 => "(Unused)",
        307 => "Temporary Redirect",
        308 => "Permanent Redirect",
        // Client error 4xx
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Requested Range Not Satisfiable",
        417 => "Expectation Failed",
        418 => "I'm a teapot",
        422 => "Unprocessable Entity",
        423 => "Locked",
        424 => "Failed Dependency",
        426 => "Upgrade Required",
        428 => "Precondition Required",
        429 => "Too Many Requests",
        431 => "Request Header Fields Too Large",
        451 => "Unavailable For Legal Reasons",
        // Server error 5xx
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        506 => "Variant Also Negotiates",
        507 => "Insufficient Storage",
        508 => "Loop Detected",
        510 => "Not Extended",
        511 => "Network Authentication Required",
        _ => return None,
    };
    Some(phrase)
}
