//! Object storage using OpenDAL.
//!
//! Trait-based abstraction over S3-compatible services, with an in-memory
//! mock for tests and credential-less local runs.

mod mock;
mod s3;
mod traits;
mod types;

pub use mock::MockFileStorage;
pub use s3::{S3Config, S3FileStorage};
pub use traits::FileStorage;
pub use types::{FileMetadata, FileStorageError, FileUploadRequest};

#[cfg(test)]
mod tests {
    use super::*;

    async fn generic_upload<S: FileStorage>(
        storage: &S,
        bucket: &str,
        key: &str,
        content: Vec<u8>,
    ) -> Result<FileMetadata, S::Error> {
        let request = FileUploadRequest::new(key, content, "application/octet-stream");
        storage.upload(bucket, request).await
    }

    #[tokio::test]
    async fn test_generic_file_storage_trait() {
        let storage = MockFileStorage::new();
        let metadata = generic_upload(&storage, "blobs", "test/file.bin", b"binary data".to_vec())
            .await
            .unwrap();
        assert_eq!(metadata.key, "test/file.bin");
    }

    #[tokio::test]
    async fn test_default_s3_storage_is_mock_backed() {
        let storage = S3FileStorage::new_for_test();
        let metadata = generic_upload(&storage, "blobs", "a", vec![0])
            .await
            .unwrap();
        assert_eq!(storage.download("blobs", &metadata.key).await.unwrap(), [0]);
    }
}
