//! Remote key and scratch-file naming.
//!
//! Key format is bit-exact and shared by all backends:
//!
//! - media object: `media/{id}.{ext}`
//! - code image: `codes/{id}_code.png`
//!
//! The prefixes are disjoint, so no media key can equal a code key. Extensions
//! come from an `ExtensionPolicy`, which only admits `[a-z0-9]+`.

use qrdrop_core::ItemId;

pub const MEDIA_PREFIX: &str = "media/";
pub const CODE_PREFIX: &str = "codes/";
pub const CODE_SUFFIX: &str = "_code.png";

/// Remote key of the media object for `id` with extension `ext`.
pub fn media_key(id: &ItemId, ext: &str) -> String {
    format!("{}{}", MEDIA_PREFIX, media_file_name(id, ext))
}

/// Remote key of the code image paired with `id`.
pub fn code_key(id: &ItemId) -> String {
    format!("{}{}", CODE_PREFIX, code_file_name(id))
}

/// Local scratch file name for the media upload.
pub fn media_file_name(id: &ItemId, ext: &str) -> String {
    format!("{}.{}", id, ext.to_ascii_lowercase())
}

/// Local scratch file name for the rendered code image.
pub fn code_file_name(id: &ItemId) -> String {
    format!("{}{}", id, CODE_SUFFIX)
}
