//! Error types module
//!
//! All request-level failures are unified under `AppError`. Each variant
//! self-describes its HTTP presentation through `ErrorMetadata`, so the HTTP
//! crate only has to render it.

use std::io;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for client-caused limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORAGE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File too large: {0}")]
    PayloadTooLarge(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error: {message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", LogLevel::Debug),
        AppError::PayloadTooLarge(_) => (413, "PAYLOAD_TOO_LARGE", LogLevel::Warn),
        AppError::NotFound(_) => (404, "NOT_FOUND", LogLevel::Debug),
        AppError::Forbidden(_) => (403, "FORBIDDEN", LogLevel::Warn),
        AppError::Storage(_) => (500, "STORAGE_ERROR", LogLevel::Error),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", LogLevel::Error)
        }
    }
}

impl AppError {
    /// Get the error type name for logs
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::PayloadTooLarge(_) => "PayloadTooLarge",
            AppError::NotFound(_) => "NotFound",
            AppError::Forbidden(_) => "Forbidden",
            AppError::Storage(_) => "Storage",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).2
    }

    // Storage and internal failures carry the backend/exception text so the
    // client sees what went wrong; nothing in this service is tenant-scoped.
    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::PayloadTooLarge(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Forbidden(ref msg) => msg.clone(),
            AppError::Storage(ref msg) => format!("Storage operation failed: {}", msg),
            AppError::Internal(ref msg) => format!("Processing failed: {}", msg),
            AppError::InternalWithSource { message, .. } => {
                format!("Processing failed: {}", message)
            }
        }
    }
}
