//! Configuration validation
//!
//! Validates critical configuration values at startup to catch misconfigurations early.

use anyhow::{Context, Result};
use qrdrop_core::{Config, StorageBackend};

/// Validate critical configuration values
///
/// Delegates the structural checks to `Config::validate` and adds the
/// deployment-level warnings that do not prevent start-up.
pub fn validate_config(config: &Config) -> Result<()> {
    config.validate()?;

    if config.is_production() && config.base.public_base_url.is_none() {
        tracing::warn!(
            "PUBLIC_BASE_URL not set in production - play links will be derived from request headers"
        );
    }

    if config.storage.backend == StorageBackend::Local && config.is_production() {
        tracing::warn!("Local storage backend in production - objects are not replicated");
    }

    if !config.rollback_orphaned_media {
        tracing::warn!(
            "ROLLBACK_ORPHANED_MEDIA disabled - failed code-image uploads leave media objects behind"
        );
    }

    tracing::info!(
        image_extensions = %config.extensions.images().join(","),
        video_extensions = %config.extensions.videos().join(","),
        max_content_length = config.max_content_length,
        "Upload policy"
    );

    Ok(())
}

/// Create the local scratch directories if they are missing.
pub async fn prepare_scratch_dirs(config: &Config) -> Result<()> {
    for dir in [&config.upload_folder, &config.qrcode_folder] {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_nested_scratch_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::from_lookup(|_| None).unwrap();
        config.upload_folder = dir.path().join("static/uploads");
        config.qrcode_folder = dir.path().join("static/qrcodes");

        prepare_scratch_dirs(&config).await.unwrap();
        assert!(config.upload_folder.is_dir());
        assert!(config.qrcode_folder.is_dir());
    }

    #[test]
    fn rejects_incomplete_storage_settings() {
        let config = Config::from_lookup(|_| None).unwrap();
        assert!(validate_config(&config).is_err());
    }
}
