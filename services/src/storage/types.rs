//! File storage types.

/// Metadata for a stored blob.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    pub bucket: String,
    pub key: String,
    pub content_type: String,
    pub size: u64,
}

/// Request to store one blob.
#[derive(Debug, Clone)]
pub struct FileUploadRequest {
    pub key: String,
    pub content: Vec<u8>,
    pub content_type: String,
}

impl FileUploadRequest {
    pub fn new(key: impl Into<String>, content: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            content,
            content_type: content_type.into(),
        }
    }
}

/// Error type for file storage operations.
#[derive(Debug, thiserror::Error)]
pub enum FileStorageError {
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),
}
