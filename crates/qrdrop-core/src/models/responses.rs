use serde::{Deserialize, Serialize};

use super::ItemId;

/// Body returned by `POST /api/upload`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub file_id: ItemId,
    pub media_url: String,
    pub qrcode_url: String,
    pub play_url: String,
    pub is_video: bool,
    pub filename: String,
    pub file_extension: String,
    pub message: String,
}

/// Body returned by `GET /api/media/{file_id}` when the item resolves
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaInfoResponse {
    pub file_id: ItemId,
    pub media_url: String,
    pub qrcode_url: String,
    pub filename: String,
    pub file_extension: String,
    pub is_video: bool,
    pub exists: bool,
}

/// Body returned by `GET /api/media/{file_id}` when nothing resolves.
///
/// `file_id` echoes the raw path segment, which need not be a valid id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaNotFoundResponse {
    pub file_id: String,
    pub exists: bool,
    pub error: String,
}

impl MediaNotFoundResponse {
    pub fn new(file_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file_id: file_id.into(),
            exists: false,
            error: error.into(),
        }
    }
}
