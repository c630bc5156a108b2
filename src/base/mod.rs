//! Base types and error handling.
//!
//! Provides the crate-wide error taxonomy:
//! - [`HttpError`](error::HttpError): every failure condition the message
//!   types can raise, from invalid constructor arguments to stream I/O.

pub mod error;

pub use error::HttpError;
