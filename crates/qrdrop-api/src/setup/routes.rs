use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::http::Uri;
use axum::routing::{get, post};
use axum::Router;
use qrdrop_core::{Config, StorageBackend};
use tower_http::trace::TraceLayer;

use crate::handlers::{download, files, health, media_get, pages, upload};
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router<()> {
    // The limit applies to the whole multipart request, not just the file.
    let body_limit = config.max_content_length;

    let mut router = Router::new()
        .route("/", get(pages::index))
        .route("/play/{file_id}", get(pages::play))
        .route("/health", get(health::health_check))
        .route("/api/upload", post(upload::upload_file))
        .route("/api/media/{file_id}", get(media_get::get_media_info))
        .route("/download/{file_id}", get(download::download_code));

    if let Some(prefix) = signed_file_prefix(config) {
        tracing::info!(prefix = %prefix, "Serving signed local files");
        router = router.route(&format!("{}/{{*key}}", prefix), get(files::get_signed_file));
    }

    router
        .with_state(state)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
}

/// Path under which the local backend's signed URLs point back at this server.
fn signed_file_prefix(config: &Config) -> Option<String> {
    if config.storage.backend != StorageBackend::Local {
        return None;
    }
    let base_url = config.storage.local_storage_base_url.as_deref()?;
    let prefix = match base_url.parse::<Uri>() {
        Ok(uri) => uri.path().trim_end_matches('/').to_string(),
        Err(e) => {
            tracing::warn!(error = %e, base_url = %base_url, "Unparseable local storage base URL");
            return None;
        }
    };
    if prefix.is_empty() {
        tracing::warn!(
            base_url = %base_url,
            "Local storage base URL has no path, signed files must be served externally"
        );
        return None;
    }
    Some(prefix)
}
