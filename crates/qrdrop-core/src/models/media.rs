use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Media category derived from the extension allow-list partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn is_video(&self) -> bool {
        matches!(self, MediaKind::Video)
    }
}

/// `Content-Type` for a stored object, keyed by its lowercase extension.
pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        "avi" => "video/x-msvideo",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        _ => "application/octet-stream",
    }
}

/// Ordered allow-list of media extensions.
///
/// The same partition is used to accept uploads and to classify looked-up
/// objects, so ingestion and resolution can never disagree on `is_video`.
/// Entries are lowercase `[a-z0-9]+` and unique across both lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionPolicy {
    images: Vec<String>,
    videos: Vec<String>,
}

impl Default for ExtensionPolicy {
    // Ordered by expected frequency so common uploads resolve in few lookups.
    fn default() -> Self {
        Self {
            images: ["jpg", "png", "jpeg", "gif"].map(String::from).to_vec(),
            videos: ["mp4", "mov", "webm", "mkv", "avi", "wmv", "flv"]
                .map(String::from)
                .to_vec(),
        }
    }
}

impl ExtensionPolicy {
    pub fn new<I, V>(images: I, videos: V) -> Result<Self, AppError>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
        V: IntoIterator,
        V::Item: AsRef<str>,
    {
        let images = normalize(images);
        let videos = normalize(videos);

        if images.is_empty() && videos.is_empty() {
            return Err(AppError::InvalidInput(
                "extension allow-list must not be empty".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for ext in images.iter().chain(videos.iter()) {
            if !ext.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
                return Err(AppError::InvalidInput(format!(
                    "invalid extension '{}': only letters and digits are allowed",
                    ext
                )));
            }
            if !seen.insert(ext.as_str()) {
                return Err(AppError::InvalidInput(format!(
                    "extension '{}' is listed more than once",
                    ext
                )));
            }
        }

        Ok(Self { images, videos })
    }

    /// Parse comma-separated lists as found in the environment.
    pub fn from_lists(images: &str, videos: &str) -> Result<Self, AppError> {
        Self::new(images.split(','), videos.split(','))
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn videos(&self) -> &[String] {
        &self.videos
    }

    /// Classify an extension, case-insensitively.
    pub fn classify(&self, ext: &str) -> Option<MediaKind> {
        let ext = ext.to_ascii_lowercase();
        if self.images.iter().any(|e| *e == ext) {
            Some(MediaKind::Image)
        } else if self.videos.iter().any(|e| *e == ext) {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    /// Candidate extensions in lookup order: images first, then videos, each
    /// in declaration order.
    pub fn lookup_order(&self) -> impl Iterator<Item = (&str, MediaKind)> {
        self.images
            .iter()
            .map(|e| (e.as_str(), MediaKind::Image))
            .chain(self.videos.iter().map(|e| (e.as_str(), MediaKind::Video)))
    }

    pub fn len(&self) -> usize {
        self.images.len() + self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate a client-supplied filename and return its lowercased
    /// extension together with the media kind.
    pub fn validate_filename(&self, filename: &str) -> Result<(String, MediaKind), AppError> {
        if filename.trim().is_empty() {
            return Err(AppError::InvalidInput("No file selected".to_string()));
        }

        let ext = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .filter(|ext| !ext.is_empty())
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "File type not allowed. Allowed types: {}",
                    self.allowed_list()
                ))
            })?;

        match self.classify(&ext) {
            Some(kind) => Ok((ext, kind)),
            None => Err(AppError::InvalidInput(format!(
                "File type not allowed. Allowed types: {}",
                self.allowed_list()
            ))),
        }
    }

    fn allowed_list(&self) -> String {
        self.lookup_order()
            .map(|(e, _)| e)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn normalize<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    items
        .into_iter()
        .map(|s| s.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_cover_default_extensions() {
        let policy = ExtensionPolicy::default();
        for (ext, kind) in policy.lookup_order() {
            let mime = content_type_for(ext);
            let prefix = if kind.is_video() { "video/" } else { "image/" };
            assert!(mime.starts_with(prefix), "{ext} -> {mime}");
        }
        assert_eq!(content_type_for("bin"), "application/octet-stream");
    }

    #[test]
    fn default_policy_covers_original_formats() {
        let policy = ExtensionPolicy::default();
        for ext in ["png", "jpg", "jpeg", "gif"] {
            assert_eq!(policy.classify(ext), Some(MediaKind::Image), "{ext}");
        }
        for ext in ["mp4", "avi", "mov", "wmv", "flv", "webm", "mkv"] {
            assert_eq!(policy.classify(ext), Some(MediaKind::Video), "{ext}");
        }
        assert_eq!(policy.len(), 11);
    }

    #[test]
    fn classify_is_case_insensitive() {
        let policy = ExtensionPolicy::default();
        assert_eq!(policy.classify("JPG"), Some(MediaKind::Image));
        assert_eq!(policy.classify("Mp4"), Some(MediaKind::Video));
        assert_eq!(policy.classify("exe"), None);
    }

    #[test]
    fn validate_filename_uses_last_segment() {
        let policy = ExtensionPolicy::default();
        let (ext, kind) = policy.validate_filename("holiday.tar.MOV").unwrap();
        assert_eq!(ext, "mov");
        assert!(kind.is_video());

        let (ext, kind) = policy.validate_filename("photo.jpg").unwrap();
        assert_eq!(ext, "jpg");
        assert_eq!(kind, MediaKind::Image);
    }

    #[test]
    fn validate_filename_rejects_bad_names() {
        let policy = ExtensionPolicy::default();
        for name in ["", "   ", "noextension", "trailingdot.", "script.exe", "archive.png.zip"] {
            let err = policy.validate_filename(name).unwrap_err();
            assert!(matches!(err, AppError::InvalidInput(_)), "{name}");
        }
    }

    #[test]
    fn lookup_order_is_images_then_videos() {
        let policy = ExtensionPolicy::from_lists("png, JPG", "webm,.mp4").unwrap();
        let order: Vec<_> = policy.lookup_order().collect();
        assert_eq!(
            order,
            vec![
                ("png", MediaKind::Image),
                ("jpg", MediaKind::Image),
                ("webm", MediaKind::Video),
                ("mp4", MediaKind::Video),
            ]
        );
    }

    #[test]
    fn rejects_duplicates_and_unsafe_entries() {
        assert!(ExtensionPolicy::from_lists("png,jpg", "png").is_err());
        assert!(ExtensionPolicy::from_lists("png/../x", "mp4").is_err());
        assert!(ExtensionPolicy::from_lists("code_png", "").is_err());
        assert!(ExtensionPolicy::from_lists("", " , ").is_err());
    }

    #[test]
    fn media_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&MediaKind::Video).unwrap(), "\"video\"");
    }
}
