//! Convertly API Library
//!
//! HTTP layer: routes, multipart parsing, response shapes and application
//! setup. Conversion work is delegated to convertly-services.

pub mod error;
pub mod handlers;
pub mod setup;
pub mod state;
pub mod telemetry;
mod utils;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
