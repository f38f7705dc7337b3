use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use qrdrop_core::{AppError, ItemId};
use qrdrop_storage::keys;
use std::sync::Arc;

/// Serve a code image still present in the local scratch directory.
///
/// Only remnants on local disk are served; remote storage is never read.
pub async fn download_code(
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<impl IntoResponse, HttpAppError> {
    let not_found = || AppError::NotFound("QR code file does not exist".to_string());
    let id = ItemId::parse(&file_id).ok_or_else(not_found)?;

    let name = keys::code_file_name(&id);
    let path = state.config.qrcode_folder.join(&name);

    let data = match tokio::fs::read(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found().into()),
        Err(e) => {
            tracing::error!(error = %e, path = %path.display(), "Failed to read local code image");
            return Err(AppError::from(e).into());
        }
    };

    Ok((
        [
            (header::CONTENT_TYPE, "image/png".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", name),
            ),
        ],
        data,
    ))
}
