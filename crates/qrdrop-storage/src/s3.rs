use crate::traits::{ObjectMetadata, Storage, StorageError, StorageResult, UploadToken};
use crate::StorageBackend;
use async_trait::async_trait;
use chrono::Utc;
use http::Method;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::signer::Signer;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, Result as ObjectResult};
use std::time::Duration;

/// S3 storage implementation
///
/// Uploads go through a presigned PUT URL (the upload token) sent with
/// `reqwest`; everything else talks to the bucket through `object_store`.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    http: reqwest::Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Credentials come from the standard AWS_* environment variables.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http)
                .with_virtual_hosted_style_request(false);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            http,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3: `https://{bucket}.s3.{region}.amazonaws.com/{key}`.
    /// For S3-compatible providers, path-style under the endpoint:
    /// `{endpoint}/{bucket}/{key}`.
    fn generate_url(&self, key: &str) -> String {
        format!("{}{}", self.url_prefix(), key)
    }

    fn url_prefix(&self) -> String {
        match self.endpoint_url {
            Some(ref endpoint) => {
                format!("{}/{}/", endpoint.trim_end_matches('/'), self.bucket)
            }
            None => format!("https://{}.s3.{}.amazonaws.com/", self.bucket, self.region),
        }
    }

    fn key_from_url(&self, url: &str) -> StorageResult<String> {
        let prefix = self.url_prefix();
        url.strip_prefix(prefix.as_str())
            .map(|key| key.split('?').next().unwrap_or(key))
            .filter(|key| !key.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                StorageError::InvalidKey(format!("URL is not in bucket {}: {}", self.bucket, url))
            })
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_token(&self, key: &str, ttl: Duration) -> StorageResult<UploadToken> {
        let location = Path::from(key.to_string());
        let url_result: ObjectResult<_> = self.store.signed_url(Method::PUT, &location, ttl).await;

        let url = url_result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                "S3 upload token issuance failed"
            );
            StorageError::BackendError(e.to_string())
        })?;

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| StorageError::ConfigError(format!("Invalid token TTL: {}", e)))?;

        Ok(UploadToken {
            key: key.to_string(),
            value: url.to_string(),
            expires_at: Utc::now() + ttl,
        })
    }

    async fn put_file(
        &self,
        token: &UploadToken,
        local_path: &std::path::Path,
    ) -> StorageResult<String> {
        if token.is_expired() {
            return Err(StorageError::InvalidToken(format!(
                "upload token for {} has expired",
                token.key
            )));
        }

        let data = tokio::fs::read(local_path).await?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let result = self
            .http
            .put(&token.value)
            .body(data)
            .send()
            .await
            .and_then(|resp| resp.error_for_status());

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %token.key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %token.key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(self.generate_url(&token.key))
    }

    async fn stat(&self, key: &str) -> StorageResult<ObjectMetadata> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.head(&location).await;

        let meta = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 head failed"
                );
                StorageError::BackendError(other.to_string())
            }
        })?;

        tracing::debug!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = meta.size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 head successful"
        );

        Ok(ObjectMetadata {
            key: key.to_string(),
            size: meta.size,
            last_modified: meta.last_modified,
            e_tag: meta.e_tag,
        })
    }

    async fn sign(&self, base_url: &str, ttl: Duration) -> StorageResult<String> {
        let key = self.key_from_url(base_url)?;
        let location = Path::from(key);
        let url_result: ObjectResult<_> = self.store.signed_url(Method::GET, &location, ttl).await;

        let url = url_result
            .map_err(|e| StorageError::BackendError(e.to_string()))?
            .to_string();

        Ok(url)
    }

    fn public_url(&self, key: &str) -> String {
        self.generate_url(key)
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 delete failed"
            );
            StorageError::DeleteFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
