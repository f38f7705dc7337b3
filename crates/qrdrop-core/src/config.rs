//! Configuration module
//!
//! Configuration is read once from the process environment at start-up,
//! validated, and then shared read-only with every component.

use std::env;
use std::path::PathBuf;

use crate::models::ExtensionPolicy;
use crate::storage_types::StorageBackend;

const DEFAULT_PORT: u16 = 5000;
const MAX_CONTENT_LENGTH: usize = 100 * 1024 * 1024;
const UPLOAD_TOKEN_EXPIRE_SECS: u64 = 3600;
const PRIVATE_URL_EXPIRE_SECS: u64 = 3600;
const MIN_SIGNING_KEY_LEN: usize = 16;

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub host: String,
    pub server_port: u16,
    pub debug: bool,
    pub environment: String,
    /// External origin for play links, e.g. `https://qr.example.com`
    pub public_base_url: Option<String>,
}

/// Storage backend settings
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, R2, ...)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub local_signing_key: Option<String>,
    pub upload_token_ttl_secs: u64,
    pub private_url_ttl_secs: u64,
}

impl StorageConfig {
    pub fn region(&self) -> Option<&str> {
        self.s3_region.as_deref().or(self.aws_region.as_deref())
    }
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageConfig,
    pub upload_folder: PathBuf,
    pub qrcode_folder: PathBuf,
    pub max_content_length: usize,
    pub extensions: ExtensionPolicy,
    pub rollback_orphaned_media: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let flag = |key: &str, default: bool| {
            lookup(key)
                .map(|v| matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
                .unwrap_or(default)
        };

        let base = BaseConfig {
            host: var_or("HOST", "0.0.0.0"),
            server_port: var_or("PORT", &DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            debug: flag("DEBUG", false),
            environment: lookup("ENVIRONMENT")
                .or_else(|| lookup("APP_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            public_base_url: lookup("PUBLIC_BASE_URL")
                .map(|s| s.trim().trim_end_matches('/').to_string())
                .filter(|s| !s.is_empty()),
        };

        let backend = match lookup("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let storage = StorageConfig {
            backend,
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION"),
            s3_endpoint: lookup("S3_ENDPOINT"),
            aws_region: lookup("AWS_REGION"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
            local_signing_key: lookup("LOCAL_STORAGE_SIGNING_KEY"),
            upload_token_ttl_secs: var_or(
                "UPLOAD_TOKEN_EXPIRE_SECS",
                &UPLOAD_TOKEN_EXPIRE_SECS.to_string(),
            )
            .parse()
            .map_err(|_| anyhow::anyhow!("UPLOAD_TOKEN_EXPIRE_SECS must be a valid number"))?,
            private_url_ttl_secs: var_or(
                "PRIVATE_URL_EXPIRE_SECS",
                &PRIVATE_URL_EXPIRE_SECS.to_string(),
            )
            .parse()
            .map_err(|_| anyhow::anyhow!("PRIVATE_URL_EXPIRE_SECS must be a valid number"))?,
        };

        let extensions = ExtensionPolicy::from_lists(
            &var_or("IMAGE_EXTENSIONS", "jpg,png,jpeg,gif"),
            &var_or("VIDEO_EXTENSIONS", "mp4,mov,webm,mkv,avi,wmv,flv"),
        )
        .map_err(|e| anyhow::anyhow!("{}", e))?;

        Ok(Config {
            base,
            storage,
            upload_folder: PathBuf::from(var_or("UPLOAD_FOLDER", "static/uploads")),
            qrcode_folder: PathBuf::from(var_or("QRCODE_FOLDER", "static/qrcodes")),
            max_content_length: var_or("MAX_CONTENT_LENGTH", &MAX_CONTENT_LENGTH.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("MAX_CONTENT_LENGTH must be a valid number"))?,
            extensions,
            rollback_orphaned_media: flag("ROLLBACK_ORPHANED_MEDIA", true),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_content_length == 0 {
            return Err(anyhow::anyhow!("MAX_CONTENT_LENGTH must be greater than 0"));
        }
        if self.storage.upload_token_ttl_secs == 0 {
            return Err(anyhow::anyhow!(
                "UPLOAD_TOKEN_EXPIRE_SECS must be greater than 0"
            ));
        }
        if self.storage.private_url_ttl_secs == 0 {
            return Err(anyhow::anyhow!("PRIVATE_URL_EXPIRE_SECS must be greater than 0"));
        }
        if self.extensions.is_empty() {
            return Err(anyhow::anyhow!("at least one allowed extension is required"));
        }
        if let Some(url) = &self.base.public_base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(anyhow::anyhow!(
                    "PUBLIC_BASE_URL must start with http:// or https://"
                ));
            }
        }

        match self.storage.backend {
            StorageBackend::S3 => {
                if self.storage.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.storage.region().is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.storage.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
                match &self.storage.local_signing_key {
                    Some(key) if key.len() >= MIN_SIGNING_KEY_LEN => {}
                    _ => {
                        return Err(anyhow::anyhow!(
                            "LOCAL_STORAGE_SIGNING_KEY must be at least {} bytes long",
                            MIN_SIGNING_KEY_LEN
                        ))
                    }
                }
            }
        }

        Ok(())
    }
}
