//! Application setup and initialization
//!
//! This module contains all application initialization logic extracted from main.rs
//! for better organization and testability.

pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::services::code_image::QrCodeRenderer;
use crate::state::AppState;
use anyhow::{Context, Result};
use qrdrop_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Initialize telemetry first
    crate::telemetry::init_telemetry(config.base.debug)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Validate configuration - fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;
    validation::prepare_scratch_dirs(&config)
        .await
        .context("Failed to prepare scratch directories")?;

    tracing::info!("Configuration loaded and validated successfully");

    let storage = storage::setup_storage(&config).await?;

    let config = Arc::new(config);
    let state = Arc::new(AppState::new(
        config.clone(),
        storage,
        Arc::new(QrCodeRenderer::default()),
    ));

    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}
