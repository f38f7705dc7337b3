//! Upload ingestion: media object first, then its paired code image.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use futures::Stream;
use qrdrop_core::{AppError, ItemId, MediaKind};
use qrdrop_storage::keys;

use crate::services::scratch::ScratchFile;
use crate::state::AppState;
use crate::utils::upload::sanitize_filename;

/// Everything the client needs after a successful upload
#[derive(Debug, Clone)]
pub struct IngestOutcome {
    pub id: ItemId,
    pub media_url: String,
    pub qrcode_url: String,
    pub play_url: String,
    pub kind: MediaKind,
    pub filename: String,
    pub extension: String,
}

pub struct IngestService<'a> {
    state: &'a AppState,
}

impl<'a> IngestService<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    /// Ingest one uploaded file.
    ///
    /// The filename is validated before any disk or storage I/O. Once the
    /// media object is stored, a failure to produce the code image triggers a
    /// compensating delete of the media object when rollback is enabled, so a
    /// failed ingestion never leaves a resolvable or orphaned pair behind.
    #[tracing::instrument(skip(self, body), fields(file_id = tracing::field::Empty))]
    pub async fn ingest<S>(
        &self,
        filename: &str,
        origin: &str,
        body: S,
    ) -> Result<IngestOutcome, AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>> + Unpin,
    {
        let config = &self.state.config;
        let (extension, kind) = config.extensions.validate_filename(filename)?;
        let original_filename = sanitize_filename(filename);

        let id = ItemId::generate();
        tracing::Span::current().record("file_id", tracing::field::display(&id));
        let start = Instant::now();

        let media = ScratchFile::create(
            &config.upload_folder,
            &keys::media_file_name(&id, &extension),
        )
        .await?;
        let size = media.write_stream(body).await?;
        tracing::debug!(
            file_id = %id,
            extension = %extension,
            size_bytes = size,
            "Upload saved to scratch file"
        );

        let media_key = keys::media_key(&id, &extension);
        let token = self.state.signer.upload_token(&media_key).await?;
        let media_url = self
            .state
            .storage
            .put_file(&token, media.path())
            .await
            .map_err(|e| AppError::Storage(e.to_string()))?;
        media.close();

        let play_url = format!("{}/play/{}", origin.trim_end_matches('/'), id);

        let code_base_url = match self.store_code_image(&id, &play_url).await {
            Ok(url) => url,
            Err(e) => {
                self.compensate(&id, &media_key).await;
                return Err(e);
            }
        };

        let qrcode_url = self.state.signer.issue(&code_base_url).await?;

        tracing::info!(
            file_id = %id,
            extension = %extension,
            is_video = kind.is_video(),
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload ingested"
        );

        Ok(IngestOutcome {
            id,
            media_url,
            qrcode_url,
            play_url,
            kind,
            filename: original_filename,
            extension,
        })
    }

    /// Render the code image for `play_url`, upload it, and return its base URL.
    async fn store_code_image(&self, id: &ItemId, play_url: &str) -> Result<String, AppError> {
        let renderer = Arc::clone(&self.state.renderer);
        let data = play_url.to_string();
        let png = tokio::task::spawn_blocking(move || renderer.render_png(&data))
            .await
            .map_err(|e| AppError::Internal(format!("QR rendering task failed: {}", e)))??;

        let code = ScratchFile::create(&self.state.config.qrcode_folder, &keys::code_file_name(id))
            .await?;
        code.write_all(&png).await?;

        let code_key = keys::code_key(id);
        let token = self.state.signer.upload_token(&code_key).await?;
        let url = self
            .state
            .storage
            .put_file(&token, code.path())
            .await
            .map_err(|e| {
                tracing::error!(file_id = %id, key = %code_key, error = %e, "Code image upload failed");
                AppError::Storage(e.to_string())
            })?;
        code.close();
        Ok(url)
    }

    async fn compensate(&self, id: &ItemId, media_key: &str) {
        if !self.state.config.rollback_orphaned_media {
            tracing::warn!(
                file_id = %id,
                key = %media_key,
                "Media object left without a code image"
            );
            return;
        }

        match self.state.storage.delete(media_key).await {
            Ok(()) => tracing::info!(file_id = %id, key = %media_key, "Rolled back media object"),
            Err(e) => tracing::error!(
                file_id = %id,
                key = %media_key,
                error = %e,
                "Failed to roll back media object"
            ),
        }
    }
}
