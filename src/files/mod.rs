//! Uploaded file descriptors.
//!
//! A transport hands this module the upload descriptors it extracted from a
//! multipart request body, in whichever of the two conventional layouts it
//! produced them: one descriptor per file already grouped under its form
//! field, or one parallel array per attribute indexed by upload slot.
//! [`FilesCollection::from_entries`] normalizes both into the same shape:
//! one list of [`UploadedFile`]s per form field.
//!
//! Files are never moved or persisted here; the temp path travels through
//! untouched for the application to consume.

use std::path::{Path, PathBuf};

use crate::base::HttpError;
use crate::collection::KeyValueCollection;

/// Upload status codes, matching the conventional numeric values a web
/// runtime reports per received file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadError {
    Ok,
    ExceedsMaxSize,
    ExceedsFormSize,
    Partial,
    NoFile,
    NoTmpDir,
    CantWrite,
    Extension,
    Unknown(u8),
}

impl UploadError {
    pub fn code(&self) -> u8 {
        match self {
            UploadError::Ok => 0,
            UploadError::ExceedsMaxSize => 1,
            UploadError::ExceedsFormSize => 2,
            UploadError::Partial => 3,
            UploadError::NoFile => 4,
            UploadError::NoTmpDir => 6,
            UploadError::CantWrite => 7,
            UploadError::Extension => 8,
            UploadError::Unknown(code) => *code,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, UploadError::Ok)
    }
}

impl From<u8> for UploadError {
    fn from(code: u8) -> Self {
        match code {
            0 => UploadError::Ok,
            1 => UploadError::ExceedsMaxSize,
            2 => UploadError::ExceedsFormSize,
            3 => UploadError::Partial,
            4 => UploadError::NoFile,
            6 => UploadError::NoTmpDir,
            7 => UploadError::CantWrite,
            8 => UploadError::Extension,
            other => UploadError::Unknown(other),
        }
    }
}

/// One received file: temp storage handle plus the client-supplied metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    temp_path: PathBuf,
    client_name: String,
    client_media_type: Option<String>,
    client_size: Option<u64>,
    error: UploadError,
}

impl UploadedFile {
    pub fn new(
        temp_path: impl Into<PathBuf>,
        client_name: impl Into<String>,
        client_media_type: Option<String>,
        client_size: Option<u64>,
        error: UploadError,
    ) -> Self {
        Self {
            temp_path: temp_path.into(),
            client_name: client_name.into(),
            client_media_type,
            client_size,
            error,
        }
    }

    /// Where the transport staged the file contents.
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Filename as supplied by the client. Untrusted.
    pub fn client_name(&self) -> &str {
        &self.client_name
    }

    /// MIME type as supplied by the client. Untrusted.
    pub fn client_media_type(&self) -> Option<&str> {
        self.client_media_type.as_deref()
    }

    /// Byte size as supplied by the client.
    pub fn client_size(&self) -> Option<u64> {
        self.client_size
    }

    /// Upload status reported by the transport.
    pub fn error(&self) -> UploadError {
        self.error
    }
}

/// One raw upload descriptor, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMeta {
    pub temp_path: String,
    pub name: String,
    pub media_type: Option<String>,
    pub size: Option<u64>,
    pub error: u8,
}

impl FileMeta {
    fn into_file(self) -> UploadedFile {
        UploadedFile::new(
            self.temp_path,
            self.name,
            self.media_type,
            self.size,
            UploadError::from(self.error),
        )
    }
}

/// The descriptor layouts a transport may deliver for one form field.
#[derive(Debug, Clone, PartialEq)]
pub enum UploadEntry {
    /// A standalone file.
    Single(FileMeta),
    /// Several files, one descriptor each.
    Grouped(Vec<FileMeta>),
    /// Several files described attribute-by-attribute, arrays indexed in
    /// parallel by upload slot.
    Parallel {
        names: Vec<String>,
        media_types: Vec<String>,
        temp_paths: Vec<String>,
        sizes: Vec<u64>,
        errors: Vec<u8>,
    },
}

/// Uploaded files keyed by form field, one normalized list per field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilesCollection {
    inner: KeyValueCollection<Vec<UploadedFile>>,
}

impl FilesCollection {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self {
            inner: KeyValueCollection::new(),
        }
    }

    /// Normalize raw descriptor entries into one list of files per field.
    ///
    /// Parallel arrays of unequal length truncate to the shortest; the
    /// dropped slots are incomplete descriptors.
    pub fn from_entries<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, UploadEntry)>,
    {
        let mut files = Self::new();
        for (field, entry) in entries {
            let field = field.into();
            let list = match entry {
                UploadEntry::Single(meta) => vec![meta.into_file()],
                UploadEntry::Grouped(metas) => metas.into_iter().map(FileMeta::into_file).collect(),
                UploadEntry::Parallel {
                    names,
                    media_types,
                    temp_paths,
                    sizes,
                    errors,
                } => {
                    let count = names
                        .len()
                        .min(media_types.len())
                        .min(temp_paths.len())
                        .min(sizes.len())
                        .min(errors.len());
                    if count < names.len() {
                        tracing::warn!(
                            field = %field,
                            declared = names.len(),
                            kept = count,
                            "parallel upload arrays disagree on length, truncating"
                        );
                    }
                    (0..count)
                        .map(|slot| {
                            FileMeta {
                                temp_path: temp_paths[slot].clone(),
                                name: names[slot].clone(),
                                media_type: Some(media_types[slot].clone()),
                                size: Some(sizes[slot]),
                                error: errors[slot],
                            }
                            .into_file()
                        })
                        .collect()
                }
            };
            files.inner.set(field, list);
        }
        files
    }

    /// The files received under a form field.
    ///
    /// Fails with [`HttpError::FileNotFound`] when the field never appeared
    /// in the request.
    pub fn get_files(&self, field: &str) -> Result<&[UploadedFile], HttpError> {
        self.inner
            .get(field)
            .map(Vec::as_slice)
            .ok_or_else(|| HttpError::FileNotFound(field.to_string()))
    }

    /// Whether the form field carried any upload.
    pub fn has_files(&self, field: &str) -> bool {
        self.inner.has(field)
    }

    /// Assign the file list for a form field.
    pub fn set_files(&mut self, field: &str, files: Vec<UploadedFile>) {
        self.inner.set(field, files);
    }

    /// Remove a form field and its files.
    pub fn remove_files(&mut self, field: &str) {
        self.inner.remove(field);
    }

    /// Copy with the field assigned; the receiver is untouched.
    pub fn with_files(&self, field: &str, files: Vec<UploadedFile>) -> Self {
        let mut collection = self.clone();
        collection.set_files(field, files);
        collection
    }

    /// Copy without the field; the receiver is untouched.
    pub fn without_files(&self, field: &str) -> Self {
        let mut collection = self.clone();
        collection.remove_files(field);
        collection
    }

    /// Iterate `(field, files)` in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[UploadedFile])> {
        self.inner.iter().map(|(field, files)| (field, files.as_slice()))
    }

    /// Number of form fields carrying uploads.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether any field carried an upload.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(name: &str, path: &str, size: u64, error: u8) -> FileMeta {
        FileMeta {
            temp_path: path.to_string(),
            name: name.to_string(),
            media_type: Some("text/plain".to_string()),
            size: Some(size),
            error,
        }
    }

    #[test]
    fn test_single_entry() {
        let files = FilesCollection::from_entries(vec![(
            "document",
            UploadEntry::Single(meta("notes.txt", "/tmp/u1", 120, 0)),
        )]);

        let list = files.get_files("document").unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].client_name(), "notes.txt");
        assert_eq!(list[0].temp_path(), Path::new("/tmp/u1"));
        assert!(list[0].error().is_ok());
    }

    #[test]
    fn test_parallel_and_grouped_layouts_normalize_identically() {
        let grouped = FilesCollection::from_entries(vec![(
            "photos",
            UploadEntry::Grouped(vec![
                meta("a.gif", "/tmp/a", 10, 0),
                meta("b.gif", "/tmp/b", 20, 1),
            ]),
        )]);

        let parallel = FilesCollection::from_entries(vec![(
            "photos",
            UploadEntry::Parallel {
                names: vec!["a.gif".to_string(), "b.gif".to_string()],
                media_types: vec!["text/plain".to_string(), "text/plain".to_string()],
                temp_paths: vec!["/tmp/a".to_string(), "/tmp/b".to_string()],
                sizes: vec![10, 20],
                errors: vec![0, 1],
            },
        )]);

        assert_eq!(grouped, parallel);
    }

    #[test]
    fn test_parallel_truncates_to_shortest() {
        let files = FilesCollection::from_entries(vec![(
            "partial",
            UploadEntry::Parallel {
                names: vec!["a".to_string(), "b".to_string(), "c".to_string()],
                media_types: vec!["x/y".to_string(), "x/y".to_string(), "x/y".to_string()],
                temp_paths: vec!["/tmp/a".to_string(), "/tmp/b".to_string()],
                sizes: vec![1, 2, 3],
                errors: vec![0, 0, 0],
            },
        )]);

        assert_eq!(files.get_files("partial").unwrap().len(), 2);
    }

    #[test]
    fn test_missing_field_fails() {
        let files = FilesCollection::new();
        let err = files.get_files("ghost").unwrap_err();
        assert!(matches!(err, HttpError::FileNotFound(field) if field == "ghost"));
    }

    #[test]
    fn test_upload_error_codes_round_trip() {
        for code in [0u8, 1, 2, 3, 4, 6, 7, 8, 42] {
            assert_eq!(UploadError::from(code).code(), code);
        }
        assert_eq!(UploadError::from(5), UploadError::Unknown(5));
    }

    #[test]
    fn test_with_files_leaves_original_untouched() {
        let files = FilesCollection::new();
        let extended = files.with_files(
            "upload",
            vec![meta("x", "/tmp/x", 1, 0).into_file()],
        );

        assert!(files.is_empty());
        assert!(extended.has_files("upload"));
    }
}
