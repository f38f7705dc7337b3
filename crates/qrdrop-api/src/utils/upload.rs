//! Common utilities for the upload handler

use axum::extract::multipart::MultipartError;
use axum::http::{header, HeaderMap, StatusCode};
use qrdrop_core::AppError;

/// Map a multipart read failure, keeping body-limit rejections distinct.
pub fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed size".to_string())
    } else {
        AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text()))
    }
}

/// Display-safe version of a client filename.
///
/// Only the last path component is kept and characters outside
/// `[alnum . - _]` become `_`. Names with nothing usable left become `file`.
pub fn sanitize_filename(filename: &str) -> String {
    const MAX_FILENAME_LENGTH: usize = 255;

    // Clients on any platform may send either separator.
    let filename_only = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(['.', '_']).is_empty() || sanitized.len() < 3 {
        return "file".to_string();
    }

    sanitized
}

/// External origin (`scheme://host[:port]`) used to build play links.
///
/// A configured origin always wins. Otherwise the request's forwarded or
/// `Host` header is used when it looks like a hostname.
pub fn request_origin(headers: &HeaderMap, configured: Option<&str>) -> String {
    if let Some(origin) = configured {
        return origin.to_string();
    }

    let first_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let host = first_value("x-forwarded-host")
        .or_else(|| first_value(header::HOST.as_str()))
        .filter(|h| is_valid_host(h))
        .unwrap_or("localhost");
    let scheme = match first_value("x-forwarded-proto") {
        Some(p) if p.eq_ignore_ascii_case("https") => "https",
        _ => "http",
    };

    format!("{}://{}", scheme, host)
}

fn is_valid_host(host: &str) -> bool {
    host.len() <= 255
        && host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | ':' | '[' | ']'))
}
