//! Route configuration and setup

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use convertly_core::Config;
use tower::ServiceBuilder;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
///
/// API routes first, then `/converted/<name>` from the output directory; any
/// other path falls through to the public asset directory.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/convert", post(handlers::convert::convert_images))
        .route("/download-all", get(handlers::download::download_all))
        .route("/clear-all", post(handlers::clear::clear_all))
        .with_state(state);

    Router::new()
        .merge(api_routes)
        .nest_service("/converted", ServeDir::new(&config.output_dir))
        .fallback_service(ServeDir::new(&config.public_dir))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(config.max_upload_size_bytes)),
        )
}
