//! `POST /clear-all`

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::error::HttpAppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub success: bool,
}

/// Delete everything in the output directory and forget tracked outputs.
///
/// A directory that cannot be read yields `500` with the underlying message.
#[tracing::instrument(skip(state))]
pub async fn clear_all(State(state): State<Arc<AppState>>) -> Result<Json<ClearResponse>, HttpAppError> {
    state.store.delete_all().await?;
    Ok(Json(ClearResponse { success: true }))
}
