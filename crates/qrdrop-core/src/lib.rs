//! qrdrop Core Library
//!
//! This crate provides the configuration, error types and domain models
//! shared by the storage adapter and the HTTP service.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, StorageConfig};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ExtensionPolicy, ItemId, MediaKind};
pub use storage_types::StorageBackend;
