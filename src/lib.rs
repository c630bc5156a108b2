//! # httpmsg
//!
//! Immutable HTTP message value objects for Rust.
//!
//! `httpmsg` gives an HTTP-processing framework a standard in-memory
//! representation of wire-level messages (requests, responses, headers,
//! cookies, uploaded files, and body streams) decoupled from any transport
//! or server implementation. Nothing here opens a socket: a transport
//! collaborator constructs a [`ServerRequest`](message::ServerRequest) from
//! its environment snapshot, application code reads immutable views, and
//! new instances are derived through copy-on-write `with_*` methods instead
//! of in-place mutation.
//!
//! ## Quick Start
//!
//! ```rust
//! use httpmsg::cookies::Cookie;
//! use httpmsg::message::Response;
//!
//! let cookie = Cookie::new("session", "abc123")?
//!     .with_path("/")
//!     .with_secure(true);
//!
//! let response = Response::new(200)?
//!     .with_header("Content-Type", "text/html")
//!     .with_set_cookie(&cookie);
//!
//! assert_eq!(response.reason_phrase(), "OK");
//! # Ok::<(), httpmsg::base::HttpError>(())
//! ```
//!
//! ## Modules
//!
//! - [`base`] - Error taxonomy
//! - [`collection`] - Ordered key/value storage underlying every collection
//! - [`headers`] - Case-insensitive headers with q-value negotiation order
//! - [`cookies`] - Cookie value objects and the `Set-Cookie` wire format
//! - [`attributes`] - Request-scoped metadata
//! - [`files`] - Uploaded-file descriptors and layout normalization
//! - [`body`] - Body streams and payload decoding
//! - [`message`] - Request, Response, and ServerRequest composition
//!
//! ## Immutability
//!
//! Every `with_*` method clones its receiver, applies one change, and
//! returns the copy; owned sub-collections and memory-backed bodies are
//! deep-copied, so clones never alias. Callers can fan read-only views out
//! across threads without coordination as long as each thread works on its
//! own clone; the body stream cursor is the one piece of visible state and
//! is documented on [`body::BodyStream`].

pub mod attributes;
pub mod base;
pub mod body;
pub mod collection;
pub mod cookies;
pub mod files;
pub mod headers;
pub mod message;

pub use base::HttpError;
