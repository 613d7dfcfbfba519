//! Convertly Core Library
//!
//! Configuration, error types and domain models shared by every Convertly
//! crate.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
