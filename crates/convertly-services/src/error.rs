use convertly_processing::ProcessingError;
use convertly_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error("No files to download")]
    EmptyExport,

    #[error("Failed to build archive: {0}")]
    Archive(String),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::TaskFailed(err.to_string())
    }
}
