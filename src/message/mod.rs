//! HTTP message types.
//!
//! [`Message`] is the shared core every concrete message composes: protocol
//! version, header collection, body stream. [`Request`], [`Response`], and
//! [`ServerRequest`] wrap it with their own fields.
//!
//! Mutation follows one protocol everywhere: in-place `set_*` methods for
//! construction-time assembly, and copying `with_*` methods that return a
//! structurally independent instance with a single field changed, leaving
//! the receiver untouched.

pub mod request;
pub mod response;
pub mod server;

pub use request::Request;
pub use response::Response;
pub use server::{Environment, ServerRequest};

use crate::body::BodyStream;
use crate::headers::HeaderCollection;

/// The shared message core: protocol version, headers, body.
///
/// The body is always a valid stream; an absent body is an empty memory
/// stream. Cloning deep-copies the header collection and the body buffer.
#[derive(Debug, Clone)]
pub struct Message {
    protocol_version: String,
    headers: HeaderCollection,
    body: BodyStream,
}

impl Message {
    /// A message with the given headers and body, protocol version `1.1`.
    pub fn new(headers: HeaderCollection, body: BodyStream) -> Self {
        Self {
            protocol_version: "1.1".to_string(),
            headers,
            body,
        }
    }

    pub fn protocol_version(&self) -> &str {
        &self.protocol_version
    }

    pub fn set_protocol_version(&mut self, version: impl Into<String>) {
        self.protocol_version = version.into();
    }

    /// Copy with the new protocol version; the receiver is untouched.
    pub fn with_protocol_version(&self, version: impl Into<String>) -> Self {
        let mut message = self.clone();
        message.set_protocol_version(version);
        message
    }

    pub fn headers(&self) -> &HeaderCollection {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderCollection {
        &mut self.headers
    }

    pub fn set_headers(&mut self, headers: HeaderCollection) {
        self.headers = headers;
    }

    /// Copy with the new header collection; the receiver is untouched.
    pub fn with_headers(&self, headers: HeaderCollection) -> Self {
        let mut message = self.clone();
        message.set_headers(headers);
        message
    }

    /// Copy with one header assigned; the receiver is untouched.
    pub fn with_header(&self, name: &str, value: &str) -> Self {
        let mut message = self.clone();
        message.headers.set_header(name, value);
        message
    }

    /// Copy with one header value appended; the receiver is untouched.
    pub fn with_added_header(&self, name: &str, value: &str) -> Self {
        let mut message = self.clone();
        message.headers.add_header(name, value);
        message
    }

    /// Copy without the header; the receiver is untouched.
    pub fn without_header(&self, name: &str) -> Self {
        let mut message = self.clone();
        message.headers.remove_header(name);
        message
    }

    pub fn body(&self) -> &BodyStream {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut BodyStream {
        &mut self.body
    }

    pub fn set_body(&mut self, body: BodyStream) {
        self.body = body;
    }

    /// Copy with the new body; the receiver is untouched.
    pub fn with_body(&self, body: BodyStream) -> Self {
        let mut message = self.clone();
        message.set_body(body);
        message
    }
}

impl Default for Message {
    fn default() -> Self {
        Self::new(HeaderCollection::new(), BodyStream::empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_protocol_version() {
        let message = Message::new(HeaderCollection::new(), BodyStream::empty());
        assert_eq!(message.protocol_version(), "1.1");
    }

    #[test]
    fn test_with_protocol_version_leaves_original_untouched() {
        let message = Message::default();
        let upgraded = message.with_protocol_version("2.0");

        assert_eq!(message.protocol_version(), "1.1");
        assert_eq!(upgraded.protocol_version(), "2.0");
    }

    #[test]
    fn test_with_header_is_copy_on_write() {
        let message = Message::new(HeaderCollection::new(), BodyStream::empty());
        let tagged = message.with_header("X-Test", "1");

        assert!(!message.headers().has_header("x-test"));
        assert_eq!(tagged.headers().header("x-test"), Some("1"));
    }

    #[test]
    fn test_clone_deep_copies_body() {
        let mut message = Message::new(HeaderCollection::new(), BodyStream::from_string("one"));
        let mut copy = message.clone();

        copy.body_mut().write(b"two").unwrap();
        assert_eq!(message.body_mut().contents().unwrap(), "one");
        assert_eq!(copy.body_mut().contents().unwrap(), "two");
    }

    #[test]
    fn test_with_body_replaces_stream() {
        let message = Message::new(HeaderCollection::new(), BodyStream::from_string("old"));
        let mut replaced = message.with_body(BodyStream::from_string("new"));
        assert_eq!(replaced.body_mut().contents().unwrap(), "new");
    }
}
