//! Error types module
//!
//! All failures surfaced to the HTTP layer are unified under `AppError`.
//! Lower crates keep their own error enums and are folded into `AppError`
//! at the API boundary.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DECODE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or malformed request parameters (e.g. `convertTo`).
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The uploaded bytes could not be read as an image.
    #[error("Decode error: {0}")]
    Decode(String),

    /// The image could not be written in the requested format.
    #[error("Encode error: {0}")]
    Encode(String),

    /// Read, write or delete failure on the local filesystem.
    #[error("Filesystem error: {0}")]
    Filesystem(String),

    /// An archive was requested while nothing is tracked.
    #[error("No files to download")]
    EmptyExport,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Variant name, used as a structured logging field.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "Validation",
            AppError::Decode(_) => "Decode",
            AppError::Encode(_) => "Encode",
            AppError::Filesystem(_) => "Filesystem",
            AppError::EmptyExport => "EmptyExport",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::Validation(_) | AppError::EmptyExport => 400,
            AppError::Decode(_)
            | AppError::Encode(_)
            | AppError::Filesystem(_)
            | AppError::Internal(_) => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Decode(_) => "DECODE_ERROR",
            AppError::Encode(_) => "ENCODE_ERROR",
            AppError::Filesystem(_) => "FILESYSTEM_ERROR",
            AppError::EmptyExport => "EMPTY_EXPORT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::Decode(msg)
            | AppError::Encode(msg)
            | AppError::Filesystem(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::EmptyExport => "No files to download".to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::Validation(_) | AppError::EmptyExport => LogLevel::Debug,
            AppError::Filesystem(_) => LogLevel::Warn,
            AppError::Decode(_) | AppError::Encode(_) | AppError::Internal(_) => LogLevel::Error,
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Filesystem(err.to_string())
    }
}
