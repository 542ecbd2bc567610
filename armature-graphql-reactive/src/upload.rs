//! File references for upload operations.

use std::path::PathBuf;

/// Default MIME type for uploaded files.
pub const DEFAULT_MIME_TYPE: &str = "application/octet-stream";

/// Where a file's content comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileContent {
    /// In-memory content.
    Bytes(Vec<u8>),
    /// Content read from disk by the client.
    Path(PathBuf),
}

/// A file attached to an upload operation.
///
/// The adapter passes files to the client uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphQLFile {
    /// The operation variable the file binds to.
    pub field_name: String,
    /// Original file name.
    pub original_name: String,
    /// MIME type.
    pub mime_type: String,
    /// File content.
    pub content: FileContent,
}

impl GraphQLFile {
    /// Create a file from in-memory bytes.
    pub fn from_bytes(
        field_name: impl Into<String>,
        original_name: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            original_name: original_name.into(),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            content: FileContent::Bytes(data.into()),
        }
    }

    /// Create a file backed by a path on disk.
    pub fn from_path(
        field_name: impl Into<String>,
        original_name: impl Into<String>,
        path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            original_name: original_name.into(),
            mime_type: DEFAULT_MIME_TYPE.to_string(),
            content: FileContent::Path(path.into()),
        }
    }

    /// Set the MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Content length, when known without touching the filesystem.
    pub fn content_length(&self) -> Option<usize> {
        match &self.content {
            FileContent::Bytes(bytes) => Some(bytes.len()),
            FileContent::Path(_) => None,
        }
    }
}
