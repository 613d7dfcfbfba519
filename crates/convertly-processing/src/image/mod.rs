//! Image processing module
//!
//! - Size guard (resize)
//! - Watermark overlay generation and compositing (watermark, font)

pub mod font;
pub mod resize;
pub mod watermark;

pub use font::WatermarkFont;
pub use resize::{BoundedDimensions, SizeGuard};
pub use watermark::{BlendMode, Gravity, Placement, WatermarkComposer, WatermarkOverlay};
