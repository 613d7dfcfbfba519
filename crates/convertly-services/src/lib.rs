//! Convertly Services Layer
//!
//! Orchestration between the HTTP layer, the per-image pipeline and the
//! output store: running a conversion batch and exporting tracked outputs.
//! Handlers in convertly-api stay thin and call into this crate.

pub mod batch;
pub mod error;

#[cfg(feature = "archive")]
pub mod archive;

pub use batch::BatchCoordinator;
pub use error::ServiceError;

#[cfg(feature = "archive")]
pub use archive::create_zip_archive;
