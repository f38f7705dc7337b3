//! Storage setup and initialization

use anyhow::Result;
use qrdrop_core::Config;
use qrdrop_storage::{create_storage, Storage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(&config.storage).await?;
    tracing::info!(
        backend = %storage.backend_type(),
        upload_token_ttl_secs = config.storage.upload_token_ttl_secs,
        private_url_ttl_secs = config.storage.private_url_ttl_secs,
        "Storage abstraction initialized successfully"
    );
    Ok(storage)
}
