//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Lower-crate errors are folded
//! into `AppError` here so every failure is logged with the level its
//! metadata asks for. Routes whose wire contract needs a different body
//! (`/convert`, the empty `/download-all`) map the error themselves.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use convertly_core::{AppError, ErrorMetadata, LogLevel};
use convertly_processing::ProcessingError;
use convertly_services::ServiceError;
use convertly_storage::StorageError;
use serde::Serialize;

/// `{ "success": false, "error": "<message>" }`
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Wrapper type for AppError to implement IntoResponse
/// This is necessary because of Rust's orphan rules - we can't implement
/// IntoResponse (external trait) for AppError (external type from convertly-core)
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl HttpAppError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn log(&self) {
        let error = &self.0;
        let error_type = error.error_type();
        match error.log_level() {
            LogLevel::Debug => {
                tracing::debug!(error = %error, error_type = error_type, "Error occurred");
            }
            LogLevel::Warn => {
                tracing::warn!(error = %error, error_type = error_type, "Error occurred");
            }
            LogLevel::Error => {
                tracing::error!(error = %error, error_type = error_type, "Error occurred");
            }
        }
    }
}

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app_error = match err {
            StorageError::InvalidName(name) => {
                AppError::Internal(format!("Invalid output file name: {}", name))
            }
            StorageError::IoError(e) => AppError::Filesystem(e.to_string()),
            StorageError::ConfigError(msg) => AppError::Filesystem(msg),
        };
        HttpAppError(app_error)
    }
}

impl From<ProcessingError> for HttpAppError {
    fn from(err: ProcessingError) -> Self {
        let app_error = match err {
            ProcessingError::Decode(msg) => AppError::Decode(msg),
            e @ ProcessingError::Encode { .. } => AppError::Encode(e.to_string()),
            ProcessingError::Font(msg) => AppError::Internal(msg),
            ProcessingError::Io(e) => AppError::Filesystem(e.to_string()),
        };
        HttpAppError(app_error)
    }
}

impl From<ServiceError> for HttpAppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Storage(e) => e.into(),
            ServiceError::Processing(e) => e.into(),
            ServiceError::EmptyExport => HttpAppError(AppError::EmptyExport),
            ServiceError::Archive(msg) | ServiceError::TaskFailed(msg) => {
                HttpAppError(AppError::Internal(msg))
            }
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        (status, Json(ErrorResponse::new(self.0.client_message()))).into_response()
    }
}
