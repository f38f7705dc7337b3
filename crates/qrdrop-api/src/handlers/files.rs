//! Signed file route: serves objects of the local backend by signed URL.

use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Path, RawQuery, State},
    http::{header, StatusCode},
    response::Response,
};
use futures::StreamExt;
use qrdrop_core::models::content_type_for;
use qrdrop_core::AppError;
use qrdrop_storage::StorageError;
use std::sync::Arc;

/// Serve an object by signed URL. The signature proves the key and expiry.
///
/// # Errors
/// - `AppError::Forbidden` - missing, forged or expired signature (403)
/// - `AppError::NotFound` - object absent or key not addressable (404)
#[tracing::instrument(skip(state, query), fields(operation = "get_signed_file"))]
pub async fn get_signed_file(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    RawQuery(query): RawQuery,
) -> Result<Response, HttpAppError> {
    let signed_url = format!(
        "{}?{}",
        state.storage.public_url(&key),
        query.unwrap_or_default()
    );

    let stream = state
        .storage
        .download_signed(&signed_url)
        .await
        .map_err(|e| match e {
            StorageError::InvalidToken(reason) => {
                tracing::warn!(key = %key, reason = %reason, "Rejected signed file request");
                AppError::Forbidden("Invalid or expired link".to_string())
            }
            StorageError::NotFound(_) | StorageError::InvalidKey(_) => {
                AppError::NotFound("File does not exist".to_string())
            }
            other => {
                tracing::error!(error = %other, key = %key, "Failed to retrieve file from storage");
                AppError::Storage(other.to_string())
            }
        })?;

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let extension = key.rsplit_once('.').map(|(_, ext)| ext).unwrap_or_default();

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(extension))
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from_stream(body_stream))
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to build response");
            HttpAppError::from(AppError::Internal(e.to_string()))
        })?;

    Ok(response)
}
