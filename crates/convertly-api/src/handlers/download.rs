//! `GET /download-all`

use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use convertly_core::constants::ARCHIVE_FILENAME;
use convertly_services::{create_zip_archive, ServiceError};

use crate::error::HttpAppError;
use crate::state::AppState;

/// Zip of every tracked output, or `400 No files to download` as plain text
/// when nothing has been converted since the last clear.
#[tracing::instrument(skip(state))]
pub async fn download_all(State(state): State<Arc<AppState>>) -> Result<Response, HttpAppError> {
    let archive = match create_zip_archive(&state.store).await {
        Ok(archive) => archive,
        Err(ServiceError::EmptyExport) => {
            tracing::debug!("Download requested with no tracked outputs");
            return Ok((StatusCode::BAD_REQUEST, "No files to download").into_response());
        }
        Err(e) => return Err(e.into()),
    };

    let disposition = format!("attachment; filename=\"{}\"", ARCHIVE_FILENAME);
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        archive,
    )
        .into_response())
}
