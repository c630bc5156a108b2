use std::net::{IpAddr, Ipv4Addr};

use url::Url;

use crate::attributes::AttributeCollection;
use crate::base::HttpError;
use crate::body::parsed::{parse_body, ParsedBody, DEFAULT_CHARSET};
use crate::body::BodyStream;
use crate::collection::KeyValueCollection;
use crate::cookies::{Cookie, CookieCollection};
use crate::files::{FilesCollection, UploadEntry, UploadedFile};
use crate::headers::HeaderCollection;
use crate::message::Request;

/// Proxy-related keys scanned for the originating client address, most
/// trustworthy first.
const CLIENT_IP_KEYS: [&str; 7] = [
    "HTTP_CLIENT_IP",
    "HTTP_X_FORWARDED_FOR",
    "HTTP_X_FORWARDED",
    "HTTP_X_CLUSTER_CLIENT_IP",
    "HTTP_FORWARDED_FOR",
    "HTTP_FORWARDED",
    "REMOTE_ADDR",
];

/// A snapshot of the server environment a transport captured for one
/// request: CGI-style server variables, upload descriptors, pre-split
/// cookie pairs, and the request body.
///
/// The core types never read ambient process state; whoever hosts the
/// library assembles one of these explicitly.
#[derive(Debug, Default)]
pub struct Environment {
    pub server: KeyValueCollection<String>,
    pub uploads: Vec<(String, UploadEntry)>,
    pub cookies: Vec<(String, String)>,
    pub body: BodyStream,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    fn server_value(&self, key: &str) -> Option<&str> {
        self.server
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

/// An incoming request as seen by the server: a [`Request`] plus the
/// server parameters, uploaded files, and application attributes.
#[derive(Debug, Clone)]
pub struct ServerRequest {
    request: Request,
    server: KeyValueCollection<String>,
    files: FilesCollection,
    attributes: AttributeCollection,
}

impl ServerRequest {
    /// A server request with the given method and URI and nothing else.
    pub fn new(method: impl Into<String>, uri: &str) -> Result<Self, HttpError> {
        Ok(Self {
            request: Request::new(method, uri)?,
            server: KeyValueCollection::new(),
            files: FilesCollection::new(),
            attributes: AttributeCollection::new(),
        })
    }

    /// Build a server request from an environment snapshot.
    ///
    /// Derives the protocol version from `SERVER_PROTOCOL`, assembles the
    /// URI from the scheme/auth/host/port variables and `REQUEST_URI`,
    /// lifts `HTTP_*` variables (plus `CONTENT_TYPE`/`CONTENT_LENGTH`) into
    /// headers, and normalizes the upload descriptors. Cookie pairs come
    /// from the snapshot when present, else from the `HTTP_COOKIE` line.
    pub fn from_environment(env: Environment) -> Result<Self, HttpError> {
        let method = env
            .server_value("REQUEST_METHOD")
            .unwrap_or("GET")
            .to_string();

        let protocol_version = env
            .server_value("SERVER_PROTOCOL")
            .and_then(|protocol| protocol.split_once('/'))
            .map(|(_, version)| version.to_string())
            .unwrap_or_else(|| "1.1".to_string());

        let uri = Url::parse(&assemble_uri(&env))?;

        let headers = environment_headers(&env.server);

        let cookies = if env.cookies.is_empty() {
            match env.server_value("HTTP_COOKIE") {
                Some(line) => CookieCollection::from_header_line(line),
                None => CookieCollection::new(),
            }
        } else {
            CookieCollection::from_pairs(env.cookies)
        };

        let mut request = Request::from_parts(method, uri, headers, env.body, cookies);
        request.set_protocol_version(protocol_version);

        Ok(Self {
            request,
            server: env.server,
            files: FilesCollection::from_entries(env.uploads),
            attributes: AttributeCollection::new(),
        })
    }

    /// The wrapped request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    /// Read-mostly server metadata captured at construction.
    pub fn server_params(&self) -> &KeyValueCollection<String> {
        &self.server
    }

    pub fn server_param(&self, key: &str) -> Option<&str> {
        self.server.get(key).map(String::as_str)
    }

    // Uploaded files

    pub fn uploaded_files(&self) -> &FilesCollection {
        &self.files
    }

    pub fn set_uploaded_files(&mut self, files: FilesCollection) {
        self.files = files;
    }

    /// Copy with the new files collection; the receiver is untouched.
    pub fn with_uploaded_files(&self, files: FilesCollection) -> Self {
        let mut request = self.clone();
        request.set_uploaded_files(files);
        request
    }

    /// The files received under a form field.
    pub fn files(&self, field: &str) -> Result<&[UploadedFile], HttpError> {
        self.files.get_files(field)
    }

    // Attributes

    pub fn attributes(&self) -> &AttributeCollection {
        &self.attributes
    }

    pub fn set_attributes(&mut self, attributes: AttributeCollection) {
        self.attributes = attributes;
    }

    /// Copy with the new attribute collection; the receiver is untouched.
    pub fn with_attributes(&self, attributes: AttributeCollection) -> Self {
        let mut request = self.clone();
        request.set_attributes(attributes);
        request
    }

    pub fn attribute(&self, name: &str) -> Option<&serde_json::Value> {
        self.attributes.get_attribute(name)
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.has_attribute(name)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<serde_json::Value>) {
        self.attributes.set_attribute(name, value);
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove_attribute(name);
    }

    /// Copy with the attribute assigned; the receiver is untouched.
    pub fn with_attribute(&self, name: &str, value: impl Into<serde_json::Value>) -> Self {
        let mut request = self.clone();
        request.set_attribute(name, value);
        request
    }

    /// Copy without the attribute; the receiver is untouched.
    pub fn without_attribute(&self, name: &str) -> Self {
        let mut request = self.clone();
        request.remove_attribute(name);
        request
    }

    // Request/message delegation

    pub fn method(&self) -> &str {
        self.request.method()
    }

    pub fn uri(&self) -> &Url {
        self.request.uri()
    }

    pub fn request_target(&self) -> &str {
        self.request.request_target()
    }

    pub fn protocol_version(&self) -> &str {
        self.request.protocol_version()
    }

    pub fn headers(&self) -> &HeaderCollection {
        self.request.headers()
    }

    pub fn headers_mut(&mut self) -> &mut HeaderCollection {
        self.request.headers_mut()
    }

    /// Copy with one header assigned; the receiver is untouched.
    pub fn with_header(&self, name: &str, value: &str) -> Self {
        let mut request = self.clone();
        request.headers_mut().set_header(name, value);
        request
    }

    /// Copy without the header; the receiver is untouched.
    pub fn without_header(&self, name: &str) -> Self {
        let mut request = self.clone();
        request.headers_mut().remove_header(name);
        request
    }

    pub fn cookies(&self) -> &CookieCollection {
        self.request.cookies()
    }

    pub fn cookie(&self, name: &str) -> Result<&Cookie, HttpError> {
        self.request.cookies().get_cookie(name)
    }

    /// Copy with the cookie stored; the receiver is untouched.
    pub fn with_cookie(&self, cookie: Cookie) -> Self {
        let mut request = self.clone();
        request.request_mut().cookies_mut().set_cookie(cookie);
        request
    }

    /// Copy without the named cookie; the receiver is untouched.
    pub fn without_cookie(&self, name: &str) -> Self {
        let mut request = self.clone();
        request.request_mut().cookies_mut().remove_cookie(name);
        request
    }

    pub fn body(&self) -> &BodyStream {
        self.request.body()
    }

    pub fn body_mut(&mut self) -> &mut BodyStream {
        self.request.body_mut()
    }

    /// Copy with the new body; the receiver is untouched.
    pub fn with_body(&self, body: BodyStream) -> Self {
        let mut request = self.clone();
        request.request_mut().set_body(body);
        request
    }

    // Derived accessors

    /// The lower-cased MIME type of the body: everything before the first
    /// `;` of the `Content-Type` header.
    pub fn body_type(&self) -> Option<String> {
        self.headers().header("content-type").map(|content_type| {
            content_type
                .split(';')
                .next()
                .unwrap_or(content_type)
                .trim()
                .to_ascii_lowercase()
        })
    }

    /// The `key=value` parameters following the MIME type in the
    /// `Content-Type` header.
    pub fn body_meta(&self) -> KeyValueCollection<String> {
        let mut meta = KeyValueCollection::new();
        let Some(content_type) = self.headers().header("content-type") else {
            return meta;
        };
        for parameter in content_type.split(';').skip(1) {
            if let Some((key, value)) = parameter.split_once('=') {
                meta.set(key.trim().to_ascii_lowercase(), value.trim().to_string());
            }
        }
        meta
    }

    /// The declared body charset, defaulting to the platform charset.
    pub fn body_charset(&self) -> String {
        self.body_meta()
            .get("charset")
            .cloned()
            .unwrap_or_else(|| DEFAULT_CHARSET.to_string())
    }

    /// Decode the body according to its declared MIME type: JSON and XML
    /// payloads parse into trees, form-encoded bodies into pairs, anything
    /// else stays opaque text. Bytes are re-encoded to UTF-8 first when the
    /// declared charset differs.
    ///
    /// Reads the body stream from the start and rewinds it.
    pub fn parsed_body(&mut self) -> Result<ParsedBody, HttpError> {
        let body_type = self.body_type();
        let charset = self.body_charset();
        let bytes = self.request.body_mut().bytes()?;
        Ok(parse_body(body_type.as_deref(), &charset, &bytes))
    }

    /// The originating client address.
    ///
    /// Scans the proxy header chain most-trustworthy-first and returns the
    /// first token that is a public, non-reserved IPv4 address. When no
    /// token qualifies, falls back to `REMOTE_ADDR` as-is.
    pub fn client_ip(&self) -> Option<IpAddr> {
        for key in CLIENT_IP_KEYS {
            let Some(value) = self.server.get(key) else {
                continue;
            };
            for token in value.split(',') {
                let token = token.trim();
                match token.parse::<Ipv4Addr>() {
                    Ok(address) if is_public_ipv4(address) => {
                        return Some(IpAddr::V4(address));
                    }
                    _ => {
                        tracing::debug!(key = %key, token = %token, "client ip candidate rejected");
                    }
                }
            }
        }

        self.server
            .get("REMOTE_ADDR")
            .and_then(|address| address.parse::<IpAddr>().ok())
    }
}

/// Lift `HTTP_*` server variables into a header collection, together with
/// the two content negotiation variables a CGI gateway leaves unprefixed.
fn environment_headers(server: &KeyValueCollection<String>) -> HeaderCollection {
    let mut headers = HeaderCollection::new();
    for (key, value) in server.iter() {
        if let Some(name) = key.strip_prefix("HTTP_") {
            headers.add_header(name, value);
        }
    }
    for key in ["CONTENT_TYPE", "CONTENT_LENGTH"] {
        if let Some(value) = server.get(key).filter(|value| !value.is_empty()) {
            headers.set_header(key, value);
        }
    }
    headers
}

/// Assemble the absolute request URI from CGI-style variables.
fn assemble_uri(env: &Environment) -> String {
    let scheme = env
        .server_value("REQUEST_SCHEME")
        .map(str::to_string)
        .unwrap_or_else(|| {
            let https = env
                .server_value("HTTPS")
                .is_some_and(|https| https.eq_ignore_ascii_case("on"));
            if https { "https" } else { "http" }.to_string()
        });

    let mut uri = format!("{scheme}://");

    if let Some(user) = env.server_value("PHP_AUTH_USER") {
        uri.push_str(user);
        if let Some(password) = env.server_value("PHP_AUTH_PW") {
            uri.push(':');
            uri.push_str(password);
        }
        uri.push('@');
    }

    let host = env.server_value("HTTP_HOST").unwrap_or("localhost");
    uri.push_str(host);

    // HTTP_HOST may already carry an explicit port.
    if !host.contains(':') {
        if let Some(port) = env.server_value("SERVER_PORT") {
            if port != "80" && port != "443" {
                uri.push(':');
                uri.push_str(port);
            }
        }
    }

    let target = env.server_value("REQUEST_URI").unwrap_or("/");
    if !target.starts_with('/') {
        uri.push('/');
    }
    uri.push_str(target);

    uri
}

/// Public, non-reserved IPv4: rejects the private, loopback, link-local,
/// shared (CGN), benchmarking, documentation, multicast, broadcast, and
/// future-reserved ranges.
fn is_public_ipv4(address: Ipv4Addr) -> bool {
    let octets = address.octets();
    !(address.is_unspecified()
        || address.is_private()
        || address.is_loopback()
        || address.is_link_local()
        || address.is_broadcast()
        || address.is_documentation()
        || address.is_multicast()
        || octets[0] == 0
        // 100.64.0.0/10 carrier-grade NAT
        || (octets[0] == 100 && (octets[1] & 0xc0) == 64)
        // 192.0.0.0/24 IETF protocol assignments
        || (octets[0] == 192 && octets[1] == 0 && octets[2] == 0)
        // 198.18.0.0/15 benchmarking
        || (octets[0] == 198 && (octets[1] & 0xfe) == 18)
        // 240.0.0.0/4 reserved
        || octets[0] >= 240)
}
