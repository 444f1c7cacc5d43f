//! Mock object storage for testing.

use super::traits::FileStorage;
use super::types::{FileMetadata, FileStorageError, FileUploadRequest};

/// In-memory mock implementation of `FileStorage` for testing.
#[derive(Clone, Default)]
pub struct MockFileStorage {
    objects:
        std::sync::Arc<std::sync::RwLock<std::collections::HashMap<(String, String), MockObject>>>,
}

#[derive(Clone)]
struct MockObject {
    content: Vec<u8>,
    metadata: FileMetadata,
}

impl MockFileStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an object so a test can download it later.
    pub fn put(&self, bucket: &str, key: &str, content: Vec<u8>, content_type: &str) {
        let mut objects = self.objects.write().expect("lock poisoned");
        let metadata = FileMetadata {
            bucket: bucket.to_owned(),
            key: key.to_owned(),
            content_type: content_type.to_owned(),
            size: content.len() as u64,
        };
        objects.insert(
            (bucket.to_owned(), key.to_owned()),
            MockObject { content, metadata },
        );
    }

    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Metadata recorded for one stored object.
    pub fn metadata_of(&self, bucket: &str, key: &str) -> Option<FileMetadata> {
        self.objects
            .read()
            .expect("lock poisoned")
            .get(&(bucket.to_owned(), key.to_owned()))
            .map(|object| object.metadata.clone())
    }

    /// Keys currently stored under `bucket`, in no particular order.
    pub fn keys_in(&self, bucket: &str) -> Vec<String> {
        self.objects
            .read()
            .expect("lock poisoned")
            .keys()
            .filter(|(stored, _)| stored == bucket)
            .map(|(_, key)| key.clone())
            .collect()
    }
}

impl FileStorage for MockFileStorage {
    type Error = FileStorageError;

    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, Self::Error> {
        let objects = self.objects.read().expect("lock poisoned");
        objects
            .get(&(bucket.to_owned(), key.to_owned()))
            .map(|object| object.content.clone())
            .ok_or_else(|| FileStorageError::NotFound {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            })
    }

    async fn upload(
        &self,
        bucket: &str,
        request: FileUploadRequest,
    ) -> Result<FileMetadata, Self::Error> {
        let mut objects = self.objects.write().expect("lock poisoned");
        let metadata = FileMetadata {
            bucket: bucket.to_owned(),
            key: request.key.clone(),
            content_type: request.content_type,
            size: request.content.len() as u64,
        };
        objects.insert(
            (bucket.to_owned(), request.key),
            MockObject {
                content: request.content,
                metadata: metadata.clone(),
            },
        );
        Ok(metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trips_objects_per_bucket() {
        let storage = MockFileStorage::new();
        storage.put("inbound", "m1", b"raw mail".to_vec(), "message/rfc822");

        let content = storage.download("inbound", "m1").await.unwrap();
        assert_eq!(content, b"raw mail");

        let missing = storage.download("other", "m1").await;
        assert!(matches!(missing, Err(FileStorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn upload_records_metadata() {
        let storage = MockFileStorage::new();
        let metadata = storage
            .upload(
                "blobs",
                FileUploadRequest::new("ATTACHMENT/1", vec![1, 2, 3], "application/pdf"),
            )
            .await
            .unwrap();

        assert_eq!(metadata.bucket, "blobs");
        assert_eq!(metadata.size, 3);
        assert_eq!(storage.keys_in("blobs"), ["ATTACHMENT/1"]);
        assert_eq!(
            storage.metadata_of("blobs", "ATTACHMENT/1"),
            Some(metadata)
        );
    }
}
