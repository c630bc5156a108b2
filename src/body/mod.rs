//! Message body streams.
//!
//! [`BodyStream`] is the one stateful resource in the message graph: a byte
//! stream with a cursor, readable/writable/seekable capability flags, and
//! either an in-memory buffer or a file behind it. Messages always own a
//! valid body stream; an "empty body" is an empty memory stream, never an
//! absent one.
//!
//! Operations are sequential. The stream performs no locking; callers fanning
//! a message out across threads must clone it first (clones never share a
//! memory buffer) or provide their own exclusion.

pub mod parsed;

use std::fs::{File, OpenOptions};
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

use bytes::Bytes;

use crate::base::HttpError;

pub use parsed::{ParsedBody, XmlNode};

trait RawStream: Read + Write + Seek {}
impl<T: Read + Write + Seek> RawStream for T {}

#[derive(Debug)]
enum StreamInner {
    Memory(Cursor<Vec<u8>>),
    File(File),
    Closed,
}

/// A readable/writable/seekable message body.
///
/// Cloning deep-copies memory-backed streams. File-backed streams duplicate
/// the OS handle, so a clone shares the underlying file object and its
/// cursor; if duplication fails the clone degrades to a closed stream.
#[derive(Debug)]
pub struct BodyStream {
    inner: StreamInner,
    readable: bool,
    writable: bool,
    seekable: bool,
}

impl BodyStream {
    /// An empty in-memory stream, readable, writable, and seekable.
    pub fn empty() -> Self {
        Self::from_bytes(Bytes::new())
    }

    /// An in-memory stream over the given bytes, cursor at the start.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            inner: StreamInner::Memory(Cursor::new(bytes.to_vec())),
            readable: true,
            writable: true,
            seekable: true,
        }
    }

    /// An in-memory stream over a string, cursor at the start.
    pub fn from_string(content: impl Into<String>) -> Self {
        Self::from_bytes(Bytes::from(content.into().into_bytes()))
    }

    /// A read-only stream over an existing file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, HttpError> {
        let file = File::open(path)?;
        Ok(Self {
            inner: StreamInner::File(file),
            readable: true,
            writable: false,
            seekable: true,
        })
    }

    /// A read/write stream over a file, created when missing.
    pub fn from_path_writable(path: impl AsRef<Path>) -> Result<Self, HttpError> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self {
            inner: StreamInner::File(file),
            readable: true,
            writable: true,
            seekable: true,
        })
    }

    pub fn is_readable(&self) -> bool {
        self.readable
    }

    pub fn is_writable(&self) -> bool {
        self.writable
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    fn raw(&mut self) -> Result<&mut dyn RawStream, HttpError> {
        match &mut self.inner {
            StreamInner::Memory(cursor) => Ok(cursor),
            StreamInner::File(file) => Ok(file),
            StreamInner::Closed => Err(HttpError::StreamClosed),
        }
    }

    /// Read up to `length` bytes from the cursor.
    pub fn read(&mut self, length: usize) -> Result<Vec<u8>, HttpError> {
        if !self.readable {
            return Err(HttpError::StreamNotReadable);
        }
        let raw = self.raw()?;
        let mut buffer = Vec::with_capacity(length);
        raw.take(length as u64).read_to_end(&mut buffer)?;
        Ok(buffer)
    }

    /// Write bytes at the cursor, returning the count written.
    pub fn write(&mut self, bytes: &[u8]) -> Result<usize, HttpError> {
        if !self.writable {
            return Err(HttpError::StreamNotWritable);
        }
        let raw = self.raw()?;
        raw.write_all(bytes)?;
        Ok(bytes.len())
    }

    /// Read from the cursor to the end as a string, then rewind when the
    /// stream allows it. Bytes that are not valid UTF-8 are replaced.
    pub fn contents(&mut self) -> Result<String, HttpError> {
        if !self.readable {
            return Err(HttpError::StreamNotReadable);
        }
        let raw = self.raw()?;
        let mut buffer = Vec::new();
        raw.read_to_end(&mut buffer)?;
        if self.seekable {
            self.rewind()?;
        }
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }

    /// Snapshot the entire stream from the beginning, rewinding afterwards.
    pub fn bytes(&mut self) -> Result<Bytes, HttpError> {
        if !self.readable {
            return Err(HttpError::StreamNotReadable);
        }
        if !self.seekable {
            return Err(HttpError::StreamNotSeekable);
        }
        let raw = self.raw()?;
        raw.seek(SeekFrom::Start(0))?;
        let mut buffer = Vec::new();
        raw.read_to_end(&mut buffer)?;
        raw.seek(SeekFrom::Start(0))?;
        Ok(Bytes::from(buffer))
    }

    /// Move the cursor to an absolute offset.
    pub fn seek(&mut self, position: u64) -> Result<(), HttpError> {
        if !self.seekable {
            return Err(HttpError::StreamNotSeekable);
        }
        self.raw()?.seek(SeekFrom::Start(position))?;
        Ok(())
    }

    /// Move the cursor back to the start.
    pub fn rewind(&mut self) -> Result<(), HttpError> {
        self.seek(0)
    }

    /// Current cursor offset.
    pub fn tell(&mut self) -> Result<u64, HttpError> {
        let raw = self.raw()?;
        Ok(raw.stream_position()?)
    }

    /// Whether the cursor sits at or past the end of the stream.
    pub fn eof(&mut self) -> Result<bool, HttpError> {
        let size = self.size().ok_or(HttpError::StreamClosed)?;
        Ok(self.tell()? >= size)
    }

    /// Total stream size in bytes, when known.
    pub fn size(&self) -> Option<u64> {
        match &self.inner {
            StreamInner::Memory(cursor) => Some(cursor.get_ref().len() as u64),
            StreamInner::File(file) => file.metadata().ok().map(|meta| meta.len()),
            StreamInner::Closed => None,
        }
    }

    /// Release the underlying resource. Subsequent operations fail with
    /// [`HttpError::StreamClosed`].
    pub fn close(&mut self) {
        self.inner = StreamInner::Closed;
        self.readable = false;
        self.writable = false;
        self.seekable = false;
    }
}

impl Default for BodyStream {
    fn default() -> Self {
        Self::empty()
    }
}

impl Clone for BodyStream {
    fn clone(&self) -> Self {
        let inner = match &self.inner {
            StreamInner::Memory(cursor) => StreamInner::Memory(cursor.clone()),
            StreamInner::File(file) => match file.try_clone() {
                Ok(duplicate) => StreamInner::File(duplicate),
                Err(error) => {
                    tracing::warn!(error = %error, "file-backed body could not be duplicated, clone is closed");
                    return Self {
                        inner: StreamInner::Closed,
                        readable: false,
                        writable: false,
                        seekable: false,
                    };
                }
            },
            StreamInner::Closed => StreamInner::Closed,
        };
        Self {
            inner,
            readable: self.readable,
            writable: self.writable,
            seekable: self.seekable,
        }
    }
}

impl From<&str> for BodyStream {
    fn from(content: &str) -> Self {
        Self::from_string(content)
    }
}

impl From<String> for BodyStream {
    fn from(content: String) -> Self {
        Self::from_string(content)
    }
}

impl From<Vec<u8>> for BodyStream {
    fn from(content: Vec<u8>) -> Self {
        Self::from_bytes(Bytes::from(content))
    }
}

impl From<Bytes> for BodyStream {
    fn from(content: Bytes) -> Self {
        Self::from_bytes(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stream() {
        let mut body = BodyStream::empty();
        assert_eq!(body.size(), Some(0));
        assert!(body.eof().unwrap());
        assert_eq!(body.contents().unwrap(), "");
    }

    #[test]
    fn test_read_partial() {
        let mut body = BodyStream::from_string("hello world");
        assert_eq!(body.read(5).unwrap(), b"hello");
        assert_eq!(body.tell().unwrap(), 5);
        assert_eq!(body.read(100).unwrap(), b" world");
        assert!(body.eof().unwrap());
    }

    #[test]
    fn test_contents_reads_from_cursor_then_rewinds() {
        let mut body = BodyStream::from_string("hello world");
        body.seek(6).unwrap();
        assert_eq!(body.contents().unwrap(), "world");
        assert_eq!(body.tell().unwrap(), 0);
    }

    #[test]
    fn test_write_then_snapshot() {
        let mut body = BodyStream::empty();
        assert_eq!(body.write(b"abc").unwrap(), 3);
        assert_eq!(body.bytes().unwrap(), Bytes::from_static(b"abc"));
        // bytes() rewound the cursor
        assert_eq!(body.tell().unwrap(), 0);
    }

    #[test]
    fn test_overwrite_at_cursor() {
        let mut body = BodyStream::from_string("xxxxx");
        body.write(b"ab").unwrap();
        assert_eq!(body.bytes().unwrap(), Bytes::from_static(b"abxxx"));
    }

    #[test]
    fn test_closed_stream_fails() {
        let mut body = BodyStream::from_string("data");
        body.close();

        assert!(!body.is_readable());
        assert_eq!(body.size(), None);
        assert!(matches!(body.read(1).unwrap_err(), HttpError::StreamNotReadable));
    }

    #[test]
    fn test_clone_does_not_share_memory() {
        let mut body = BodyStream::from_string("shared?");
        let mut copy = body.clone();

        copy.write(b"CHANGED").unwrap();
        assert_eq!(body.contents().unwrap(), "shared?");
        assert_eq!(copy.contents().unwrap(), "CHANGED");
    }

    #[test]
    fn test_clone_keeps_cursor_position() {
        let mut body = BodyStream::from_string("abcdef");
        body.seek(3).unwrap();
        let mut copy = body.clone();
        assert_eq!(copy.tell().unwrap(), 3);
    }

    #[test]
    fn test_file_backed_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.txt");
        std::fs::write(&path, b"file contents").unwrap();

        let mut body = BodyStream::from_path(&path).unwrap();
        assert!(body.is_readable());
        assert!(!body.is_writable());
        assert_eq!(body.size(), Some(13));
        assert_eq!(body.contents().unwrap(), "file contents");
        assert!(matches!(body.write(b"x").unwrap_err(), HttpError::StreamNotWritable));
    }

    #[test]
    fn test_file_backed_writable_stream() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");

        let mut body = BodyStream::from_path_writable(&path).unwrap();
        body.write(b"written").unwrap();
        assert_eq!(body.bytes().unwrap(), Bytes::from_static(b"written"));
    }

    #[test]
    fn test_missing_file_fails() {
        let err = BodyStream::from_path("/does/not/exist").unwrap_err();
        assert!(matches!(err, HttpError::Io(_)));
    }
}
