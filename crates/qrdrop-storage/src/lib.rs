//! qrdrop Storage Library
//!
//! This crate provides the storage abstraction and its implementations for
//! S3-compatible buckets and the local filesystem.
//!
//! # Storage key format
//!
//! - **Media object**: `media/{id}.{ext}`
//! - **Code image**: `codes/{id}_code.png`
//!
//! Keys must not contain `..` or a leading `/`. Key generation is centralized in the
//! `keys` module so all backends and callers stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use qrdrop_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteStream, ObjectMetadata, Storage, StorageError, StorageResult, UploadToken};
