//! Shared application state.

use std::sync::Arc;

use convertly_core::Config;
use convertly_services::BatchCoordinator;
use convertly_storage::OutputStore;

/// State handed to every handler behind an `Arc`.
pub struct AppState {
    pub config: Config,
    /// Output directory and the tracked output names.
    pub store: Arc<OutputStore>,
    pub batch: BatchCoordinator,
}
