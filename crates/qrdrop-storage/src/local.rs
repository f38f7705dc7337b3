use crate::traits::{ByteStream, ObjectMetadata, Storage, StorageError, StorageResult, UploadToken};
use crate::StorageBackend;
use async_trait::async_trait;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use futures::StreamExt;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::fs;
use tokio_util::io::ReaderStream;

type HmacSha256 = Hmac<Sha256>;

/// Local filesystem storage implementation
///
/// Objects live under `base_path/{key}` and are served externally from
/// `base_url/{key}`. Upload tokens and download URLs carry an HMAC-SHA256
/// signature over `{op}\n{key}\n{deadline}`, encoded URL-safe base64.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
    signing_key: Vec<u8>,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/qrdrop")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:5000/files")
    /// * `signing_key` - HMAC key for upload tokens and signed URLs
    pub async fn new(
        base_path: impl Into<PathBuf>,
        base_url: String,
        signing_key: impl Into<Vec<u8>>,
    ) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
            signing_key: signing_key.into(),
        })
    }

    /// Convert storage key to filesystem path with security validation
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        if storage_key.contains('\\') || storage_key.contains('\0') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        Ok(self.base_path.join(storage_key))
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }

    fn key_from_url<'a>(&self, url: &'a str) -> StorageResult<&'a str> {
        url.strip_prefix(self.base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                StorageError::InvalidKey(format!("URL is not served by this storage: {}", url))
            })
    }

    fn mac(&self, op: &str, key: &str, deadline: i64) -> StorageResult<HmacSha256> {
        let mut mac = HmacSha256::new_from_slice(&self.signing_key)
            .map_err(|e| StorageError::ConfigError(format!("Invalid signing key: {}", e)))?;
        mac.update(op.as_bytes());
        mac.update(b"\n");
        mac.update(key.as_bytes());
        mac.update(b"\n");
        mac.update(deadline.to_string().as_bytes());
        Ok(mac)
    }

    fn signature(&self, op: &str, key: &str, deadline: i64) -> StorageResult<String> {
        let tag = self.mac(op, key, deadline)?.finalize().into_bytes();
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(tag))
    }

    fn verify(&self, op: &str, key: &str, deadline: i64, signature: &str) -> StorageResult<()> {
        if Utc::now().timestamp() > deadline {
            return Err(StorageError::InvalidToken(format!("{} token expired", op)));
        }
        let tag = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(signature)
            .map_err(|_| StorageError::InvalidToken("malformed signature".to_string()))?;
        self.mac(op, key, deadline)?
            .verify_slice(&tag)
            .map_err(|_| StorageError::InvalidToken("signature mismatch".to_string()))
    }

    /// Check a URL produced by `sign` and return the key it grants access to.
    pub fn verify_download_url(&self, url: &str) -> StorageResult<String> {
        let (base, query) = url
            .split_once('?')
            .ok_or_else(|| StorageError::InvalidToken("missing signature".to_string()))?;
        let key = self.key_from_url(base)?;

        let mut deadline = None;
        let mut token = None;
        for pair in query.split('&') {
            match pair.split_once('=') {
                Some(("e", v)) => deadline = v.parse::<i64>().ok(),
                Some(("token", v)) => token = Some(v),
                _ => {}
            }
        }
        let (Some(deadline), Some(token)) = (deadline, token) else {
            return Err(StorageError::InvalidToken("missing signature".to_string()));
        };

        self.verify("get", key, deadline, token)?;
        Ok(key.to_string())
    }
}

fn deadline_after(ttl: Duration) -> DateTime<Utc> {
    let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
    Utc::now()
        .checked_add_signed(ttl)
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_token(&self, key: &str, ttl: Duration) -> StorageResult<UploadToken> {
        self.key_to_path(key)?;
        let expires_at = deadline_after(ttl);
        let deadline = expires_at.timestamp();
        let signature = self.signature("put", key, deadline)?;

        Ok(UploadToken {
            key: key.to_string(),
            value: format!("{}.{}", deadline, signature),
            expires_at,
        })
    }

    async fn put_file(&self, token: &UploadToken, local_path: &Path) -> StorageResult<String> {
        let (deadline, signature) = token
            .value
            .split_once('.')
            .and_then(|(d, s)| d.parse::<i64>().ok().map(|d| (d, s)))
            .ok_or_else(|| StorageError::InvalidToken("malformed upload token".to_string()))?;
        self.verify("put", &token.key, deadline, signature)?;

        let path = self.key_to_path(&token.key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let start = std::time::Instant::now();
        let size = fs::copy(local_path, &path).await.map_err(|e| {
            tracing::error!(
                error = %e,
                key = %token.key,
                source_path = %local_path.display(),
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Local storage upload failed"
            );
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %token.key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(self.generate_url(&token.key))
    }

    async fn stat(&self, key: &str) -> StorageResult<ObjectMetadata> {
        let path = self.key_to_path(key)?;
        let start = std::time::Instant::now();

        let meta = match fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => meta,
            Ok(_) => return Err(StorageError::NotFound(key.to_string())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => return Err(StorageError::BackendError(e.to_string())),
        };

        let last_modified = meta
            .modified()
            .ok()
            .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
            .and_then(|d| Utc.timestamp_opt(d.as_secs() as i64, d.subsec_nanos()).single())
            .unwrap_or_else(Utc::now);

        tracing::debug!(
            key = %key,
            size_bytes = meta.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stat"
        );

        Ok(ObjectMetadata {
            key: key.to_string(),
            size: meta.len(),
            last_modified,
            e_tag: None,
        })
    }

    async fn sign(&self, base_url: &str, ttl: Duration) -> StorageResult<String> {
        let key = self.key_from_url(base_url)?;
        self.key_to_path(key)?;
        let deadline = deadline_after(ttl).timestamp();
        let signature = self.signature("get", key, deadline)?;
        Ok(format!("{}?e={}&token={}", base_url, deadline, signature))
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let path = self.key_to_path(key)?;

        match fs::remove_file(&path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Local storage delete failed");
                return Err(StorageError::DeleteFailed(format!(
                    "Failed to delete file {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        tracing::info!(key = %key, "Local storage delete successful");
        Ok(())
    }

    async fn download_signed(&self, signed_url: &str) -> StorageResult<ByteStream> {
        let key = self.verify_download_url(signed_url)?;
        let path = self.key_to_path(&key)?;
        let start = std::time::Instant::now();

        let file = match fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StorageError::NotFound(key))
            }
            Err(e) => return Err(StorageError::IoError(e)),
        };
        if !file.metadata().await?.is_file() {
            return Err(StorageError::NotFound(key));
        }

        tracing::debug!(
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download started"
        );

        let stream = ReaderStream::new(file).map(move |chunk| {
            chunk.map_err(|e| {
                tracing::error!(error = %e, key = %key, "Local storage stream download error");
                StorageError::IoError(e)
            })
        });
        Ok(Box::pin(stream))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
