//! Storage trait definitions.

use super::types::{FileMetadata, FileUploadRequest};
use std::future::Future;

/// Generic interface for object storage. Operations name their bucket
/// because inbound-mail notifications reference arbitrary buckets while
/// attachment blobs land in the configured one.
pub trait FileStorage: Clone + Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    fn download(
        &self,
        bucket: &str,
        key: &str,
    ) -> impl Future<Output = Result<Vec<u8>, Self::Error>> + Send;

    fn upload(
        &self,
        bucket: &str,
        request: FileUploadRequest,
    ) -> impl Future<Output = Result<FileMetadata, Self::Error>> + Send;
}
