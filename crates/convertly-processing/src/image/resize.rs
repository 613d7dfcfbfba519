//! Size guard for oversized uploads.

use image::imageops::FilterType;
use image::DynamicImage;

/// Output dimensions after applying the size guard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundedDimensions {
    pub width: u32,
    pub height: u32,
    /// `false` when the source already fits and is passed through untouched.
    pub resized: bool,
}

pub struct SizeGuard;

impl SizeGuard {
    /// Fit `width x height` inside `max_dimension` on the longer side.
    ///
    /// Landscape images pin the width, portrait and square images pin the
    /// height. The other side is rounded from the aspect ratio and never
    /// drops below one pixel.
    pub fn bound(width: u32, height: u32, max_dimension: u32) -> BoundedDimensions {
        if width <= max_dimension && height <= max_dimension {
            return BoundedDimensions {
                width,
                height,
                resized: false,
            };
        }

        let aspect_ratio = width as f64 / height as f64;
        let (new_width, new_height) = if width > height {
            let h = (max_dimension as f64 / aspect_ratio).round() as u32;
            (max_dimension, h.max(1))
        } else {
            let w = (max_dimension as f64 * aspect_ratio).round() as u32;
            (w.max(1), max_dimension)
        };

        BoundedDimensions {
            width: new_width,
            height: new_height,
            resized: true,
        }
    }

    /// Resample to the bounded size with Lanczos3, or hand the image back.
    pub fn apply(image: DynamicImage, bounded: BoundedDimensions) -> DynamicImage {
        if !bounded.resized {
            return image;
        }

        tracing::debug!(
            from_width = image.width(),
            from_height = image.height(),
            to_width = bounded.width,
            to_height = bounded.height,
            "Downscaling oversized image"
        );

        image.resize_exact(bounded.width, bounded.height, FilterType::Lanczos3)
    }
}
