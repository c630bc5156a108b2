use thiserror::Error;

/// Failure conditions raised by the message types.
///
/// Every condition is signaled synchronously at the offending call. There is
/// no retry layer and no central error channel; each component fails
/// independently.
#[derive(Debug, Error)]
pub enum HttpError {
    // Invalid arguments
    #[error("Cookie name must not be empty")]
    EmptyCookieName,
    #[error("Status code {0} is outside the 100-599 range")]
    InvalidStatusCode(u16),
    #[error("Invalid URI: {0}")]
    InvalidUri(#[from] url::ParseError),

    // Lookups of undeclared entries
    #[error("Undefined cookie `{0}`")]
    CookieNotFound(String),
    #[error("Undefined upload field `{0}`")]
    FileNotFound(String),

    // Stream runtime failures
    #[error("Stream is not readable")]
    StreamNotReadable,
    #[error("Stream is not writable")]
    StreamNotWritable,
    #[error("Stream is not seekable")]
    StreamNotSeekable,
    #[error("Stream has been closed")]
    StreamClosed,
    #[error("Stream I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

impl HttpError {
    /// Whether the error identifies a lookup of an entry that was never
    /// declared, as opposed to an invalid argument or a stream failure.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            HttpError::CookieNotFound(_) | HttpError::FileNotFound(_)
        )
    }
}
