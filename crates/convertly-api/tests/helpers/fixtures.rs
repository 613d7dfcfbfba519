//! Test fixtures: encoded images built in memory.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

/// Horizontal/vertical gradient so encoders have real content to work with.
pub fn gradient(width: u32, height: u32) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 180])
    }))
}

pub fn encode(img: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), format)
        .expect("Failed to encode fixture");
    bytes
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode(&gradient(width, height), ImageFormat::Png)
}

/// Single-colour PNG; compresses to almost nothing even at large sizes.
pub fn create_flat_png(width: u32, height: u32) -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([240, 240, 240])));
    encode(&img, ImageFormat::Png)
}
