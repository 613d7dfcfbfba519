//! `POST /convert`

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use convertly_core::models::ConversionResult;
use convertly_core::AppError;
use serde::Serialize;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_convert_form;

/// Body returned for every failed conversion batch.
const CONVERSION_FAILED: &str = "Conversion failed";

#[derive(Debug, Serialize)]
pub struct ConvertResponse {
    pub success: bool,
    pub files: Vec<ConversionResult>,
}

/// Convert every uploaded image.
///
/// All failures, including a missing `convertTo` or a malformed body,
/// collapse to `500 {"success": false, "error": "Conversion failed"}` after
/// being logged.
#[tracing::instrument(skip(state, multipart))]
pub async fn convert_images(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    match run_conversion(&state, multipart).await {
        Ok(files) => Json(ConvertResponse {
            success: true,
            files,
        })
        .into_response(),
        Err(err) => {
            err.log();
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(CONVERSION_FAILED)),
            )
                .into_response()
        }
    }
}

async fn run_conversion(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Vec<ConversionResult>, HttpAppError> {
    let multipart = multipart
        .map_err(|e| AppError::Validation(format!("Expected a multipart form: {}", e)))?;

    let form = extract_convert_form(multipart, &state.config.upload_dir).await?;
    let (request, uploads) = form.into_request()?;

    tracing::info!(
        files = uploads.len(),
        format = %request.target.extension,
        watermark = !request.watermark_text.is_empty(),
        "Conversion requested"
    );

    let results = state.batch.run(request, uploads).await?;
    Ok(results)
}
