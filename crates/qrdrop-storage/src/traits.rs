//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::Stream;
use qrdrop_core::AppError;
use std::path::Path;
use std::pin::Pin;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => AppError::NotFound(format!("File not found: {}", key)),
            other => AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Object body as a stream of chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Credential authorizing a single upload to one key until `expires_at`
#[derive(Debug, Clone)]
pub struct UploadToken {
    pub key: String,
    pub value: String,
    pub expires_at: DateTime<Utc>,
}

impl UploadToken {
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }
}

/// What a successful `stat` reports about a remote object
#[derive(Debug, Clone)]
pub struct ObjectMetadata {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
    pub e_tag: Option<String>,
}

/// Storage abstraction trait
///
/// Every call is a single remote round-trip with no retry; a failure is
/// terminal for the request that issued it.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Issue an upload token scoped to `key`, valid for `ttl`.
    async fn upload_token(&self, key: &str, ttl: Duration) -> StorageResult<UploadToken>;

    /// Upload the file at `local_path` to the token's key and return the
    /// object's public base URL.
    async fn put_file(&self, token: &UploadToken, local_path: &Path) -> StorageResult<String>;

    /// Existence check. Absent objects yield `StorageError::NotFound`.
    async fn stat(&self, key: &str) -> StorageResult<ObjectMetadata>;

    /// Mint a time-limited download URL for a base URL returned by
    /// `put_file` or `public_url`. Each call signs afresh.
    async fn sign(&self, base_url: &str, ttl: Duration) -> StorageResult<String>;

    /// Unsigned base URL of `key`
    fn public_url(&self, key: &str) -> String;

    /// Delete a file by its storage key
    async fn delete(&self, key: &str) -> StorageResult<()>;

    /// Stream the object a signed download URL grants access to.
    ///
    /// Only backends whose signed URLs are served by this process implement
    /// it; elsewhere the URL is served by the backend itself.
    async fn download_signed(&self, signed_url: &str) -> StorageResult<ByteStream> {
        Err(StorageError::NotFound(format!(
            "{} storage does not serve signed URLs: {}",
            self.backend_type(),
            signed_url
        )))
    }

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
