use async_trait::async_trait;
use qrdrop_core::StorageBackend;
use qrdrop_storage::{
    ByteStream, LocalStorage, ObjectMetadata, Storage, StorageError, StorageResult,
    UploadToken,
};
use std::path::Path;
use std::time::Duration;

/// Local storage that rejects uploads to keys under `fail_prefix`.
pub struct FlakyStorage {
    inner: LocalStorage,
    fail_prefix: &'static str,
}

impl FlakyStorage {
    pub fn new(inner: LocalStorage, fail_prefix: &'static str) -> Self {
        Self {
            inner,
            fail_prefix,
        }
    }
}

#[async_trait]
impl Storage for FlakyStorage {
    async fn upload_token(&self, key: &str, ttl: Duration) -> StorageResult<UploadToken> {
        self.inner.upload_token(key, ttl).await
    }

    async fn put_file(&self, token: &UploadToken, local_path: &Path) -> StorageResult<String> {
        if token.key.starts_with(self.fail_prefix) {
            return Err(StorageError::UploadFailed(format!(
                "injected failure for {}",
                token.key
            )));
        }
        self.inner.put_file(token, local_path).await
    }

    async fn stat(&self, key: &str) -> StorageResult<ObjectMetadata> {
        self.inner.stat(key).await
    }

    async fn sign(&self, base_url: &str, ttl: Duration) -> StorageResult<String> {
        self.inner.sign(base_url, ttl).await
    }

    fn public_url(&self, key: &str) -> String {
        self.inner.public_url(key)
    }

    async fn download_signed(&self, signed_url: &str) -> StorageResult<ByteStream> {
        self.inner.download_signed(signed_url).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }

    fn backend_type(&self) -> StorageBackend {
        self.inner.backend_type()
    }
}
