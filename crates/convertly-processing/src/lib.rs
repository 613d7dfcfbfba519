//! Convertly Processing Library
//!
//! The per-image pipeline: bounding oversized images, composing the tiled
//! text watermark, and encoding to the requested format at a fixed quality.

pub mod compression;
pub mod converter;
pub mod error;
pub mod image;

pub use compression::ImageCompressor;
pub use converter::ImageConverter;
pub use error::ProcessingError;
pub use crate::image::{
    BoundedDimensions, SizeGuard, WatermarkComposer, WatermarkFont, WatermarkOverlay,
};
