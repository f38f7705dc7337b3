//! qrdrop API Library
//!
//! This crate provides the HTTP handlers, ingest and resolve services, and
//! application setup for the upload-to-QR service.

// Module declarations
mod handlers;
mod telemetry;
mod utils;

// Public modules
pub mod error;
pub mod services;
pub mod setup;
pub mod state;

// Re-exports
pub use error::{ErrorResponse, HttpAppError};
pub use services::code_image::{CodeRenderer, QrCodeRenderer};
pub use state::AppState;
