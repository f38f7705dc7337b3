//! Identifier resolution by probing storage existence.

use std::time::Instant;

use qrdrop_core::{AppError, ItemId, MediaKind};
use qrdrop_storage::{keys, StorageError};

use crate::state::AppState;

pub const NOT_FOUND_MESSAGE: &str = "File does not exist";

#[derive(Debug, Clone)]
pub struct ResolvedMedia {
    pub id: ItemId,
    pub media_url: String,
    pub qrcode_url: String,
    pub filename: String,
    pub extension: String,
    pub kind: MediaKind,
}

pub struct ResolveService<'a> {
    state: &'a AppState,
}

impl<'a> ResolveService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Resolve an untrusted identifier.
    ///
    /// The code image anchors existence and is checked first. Media keys are
    /// then checked in `ExtensionPolicy::lookup_order`, first hit wins. At most
    /// `extensions + 1` stat calls are made; a segment that is not a canonical
    /// identifier makes none.
    #[tracing::instrument(skip(self))]
    pub async fn resolve(&self, raw_id: &str) -> Result<ResolvedMedia, AppError> {
        let id = ItemId::parse(raw_id)
            .ok_or_else(|| AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))?;
        let start = Instant::now();
        let storage = &self.state.storage;

        let code_key = keys::code_key(&id);
        if !self.exists(&code_key).await? {
            tracing::debug!(file_id = %id, key = %code_key, "Code image not found");
            return Err(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()));
        }

        let mut lookups = 1;
        for (ext, kind) in self.state.config.extensions.lookup_order() {
            let media_key = keys::media_key(&id, ext);
            lookups += 1;
            if !self.exists(&media_key).await? {
                continue;
            }

            let media_url = self
                .state
                .signer
                .issue(&storage.public_url(&media_key))
                .await?;
            let qrcode_url = self
                .state
                .signer
                .issue(&storage.public_url(&code_key))
                .await?;

            tracing::info!(
                file_id = %id,
                extension = %ext,
                lookups,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "Resolved media"
            );

            return Ok(ResolvedMedia {
                id,
                media_url,
                qrcode_url,
                filename: format!("file.{}", ext),
                extension: ext.to_string(),
                kind,
            });
        }

        tracing::warn!(
            file_id = %id,
            lookups,
            "Code image exists but no media object matched any allowed extension"
        );
        Err(AppError::NotFound(NOT_FOUND_MESSAGE.to_string()))
    }

    async fn exists(&self, key: &str) -> Result<bool, AppError> {
        match self.state.storage.stat(key).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound(_)) => Ok(false),
            Err(e) => Err(AppError::Storage(e.to_string())),
        }
    }
}
