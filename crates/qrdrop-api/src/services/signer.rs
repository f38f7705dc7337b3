use std::sync::Arc;
use std::time::Duration;

use qrdrop_core::{AppError, StorageConfig};
use qrdrop_storage::{Storage, UploadToken};

/// Applies the configured expiry policy to the storage signing primitives.
///
/// Nothing is cached: each call signs with a window anchored at call time.
#[derive(Clone)]
pub struct UrlSigner {
    storage: Arc<dyn Storage>,
    upload_ttl: Duration,
    download_ttl: Duration,
}

impl UrlSigner {
    pub fn new(storage: Arc<dyn Storage>, upload_ttl: Duration, download_ttl: Duration) -> Self {
        Self {
            storage,
            upload_ttl,
            download_ttl,
        }
    }

    pub fn from_config(storage: Arc<dyn Storage>, config: &StorageConfig) -> Self {
        Self::new(
            storage,
            Duration::from_secs(config.upload_token_ttl_secs),
            Duration::from_secs(config.private_url_ttl_secs),
        )
    }

    /// Signed download URL for `base_url`, valid for the download TTL.
    pub async fn issue(&self, base_url: &str) -> Result<String, AppError> {
        self.storage
            .sign(base_url, self.download_ttl)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }

    /// Upload token for `key`, valid for the upload TTL.
    pub async fn upload_token(&self, key: &str) -> Result<UploadToken, AppError> {
        self.storage
            .upload_token(key, self.upload_ttl)
            .await
            .map_err(|e| AppError::Storage(e.to_string()))
    }
}
