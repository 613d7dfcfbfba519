//! Data models for the application
//!
//! Request parameters, per-file results and upload handles shared by the
//! processing pipeline and the HTTP layer.

mod conversion;
mod format;
mod upload;

pub use conversion::*;
pub use format::*;
pub use upload::*;
