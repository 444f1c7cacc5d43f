//! S3-compatible storage implementation.

use super::mock::MockFileStorage;
use super::traits::FileStorage;
use super::types::{FileMetadata, FileStorageError, FileUploadRequest};

/// Credentials and addressing for an S3-compatible service.
#[derive(Clone)]
pub struct S3Config {
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Object storage against S3 or a compatible service. Without configuration
/// it falls back to an in-memory mock, which keeps local runs and tests off
/// the network.
#[derive(Clone)]
pub struct S3FileStorage {
    #[allow(dead_code)]
    config: Option<S3Config>,
    mock: Option<MockFileStorage>,
}

impl S3FileStorage {
    pub fn new_for_test() -> Self {
        Self {
            config: None,
            mock: Some(MockFileStorage::new()),
        }
    }

    pub fn new(config: S3Config) -> Self {
        Self {
            config: Some(config),
            mock: None,
        }
    }

    #[cfg(not(test))]
    fn operator(&self, bucket: &str) -> Result<opendal::Operator, FileStorageError> {
        let config = self.config.as_ref().ok_or_else(|| {
            FileStorageError::ConnectionError("No configuration provided".to_owned())
        })?;

        let mut builder = opendal::services::S3::default()
            .bucket(bucket)
            .region(&config.region)
            .access_key_id(&config.access_key_id)
            .secret_access_key(&config.secret_access_key);
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint(endpoint);
        }

        opendal::Operator::new(builder)
            .map(|op| op.finish())
            .map_err(|e| FileStorageError::StorageError(e.to_string()))
    }
}

impl Default for S3FileStorage {
    fn default() -> Self {
        Self::new_for_test()
    }
}

impl S3FileStorage {
    #[cfg(not(test))]
    async fn remote_download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, FileStorageError> {
        let op = self.operator(bucket)?;
        let buffer = op.read(key).await.map_err(|e| match e.kind() {
            opendal::ErrorKind::NotFound => FileStorageError::NotFound {
                bucket: bucket.to_owned(),
                key: key.to_owned(),
            },
            _ => FileStorageError::StorageError(e.to_string()),
        })?;
        Ok(buffer.to_vec())
    }

    #[cfg(not(test))]
    async fn remote_upload(
        &self,
        bucket: &str,
        request: FileUploadRequest,
    ) -> Result<FileMetadata, FileStorageError> {
        let op = self.operator(bucket)?;
        let size = request.content.len() as u64;
        op.write(&request.key, request.content)
            .await
            .map_err(|e| FileStorageError::StorageError(e.to_string()))?;

        Ok(FileMetadata {
            bucket: bucket.to_owned(),
            key: request.key,
            content_type: request.content_type,
            size,
        })
    }

    // Test builds never talk to a real service.
    #[cfg(test)]
    async fn remote_download(
        &self,
        _bucket: &str,
        _key: &str,
    ) -> Result<Vec<u8>, FileStorageError> {
        Err(FileStorageError::ConnectionError(
            "No mock storage configured for test".to_owned(),
        ))
    }

    #[cfg(test)]
    async fn remote_upload(
        &self,
        _bucket: &str,
        _request: FileUploadRequest,
    ) -> Result<FileMetadata, FileStorageError> {
        Err(FileStorageError::ConnectionError(
            "No mock storage configured for test".to_owned(),
        ))
    }
}

impl FileStorage for S3FileStorage {
    type Error = FileStorageError;

    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, Self::Error> {
        if let Some(mock) = &self.mock {
            return mock.download(bucket, key).await;
        }
        self.remote_download(bucket, key).await
    }

    async fn upload(
        &self,
        bucket: &str,
        request: FileUploadRequest,
    ) -> Result<FileMetadata, Self::Error> {
        if let Some(mock) = &self.mock {
            return mock.upload(bucket, request).await;
        }
        self.remote_upload(bucket, request).await
    }
}
