//! Data models for the application
//!
//! Nothing here is persisted locally: an item exists only as a pair of
//! remote objects correlated by its identifier.

mod item;
mod media;
mod responses;

// Re-export all models for convenient imports
pub use item::*;
pub use media::*;
pub use responses::*;
