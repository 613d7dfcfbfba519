use std::io::Cursor;

use bytes::Bytes;
use convertly_core::constants::ENCODE_QUALITY;
use convertly_core::models::TargetFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageFormat};

use crate::error::ProcessingError;

/// Largest side libwebp accepts.
const WEBP_MAX_DIMENSION: u32 = 16383;

/// Output encoder. Lossy formats use [`ENCODE_QUALITY`]; PNG is lossless and
/// ignores it.
pub struct ImageCompressor;

impl ImageCompressor {
    /// Encode `img` as `format`.
    ///
    /// `Passthrough` re-encodes in `source_format`, the codec detected on
    /// the upload.
    pub fn compress(
        img: &DynamicImage,
        format: TargetFormat,
        source_format: Option<ImageFormat>,
    ) -> Result<Bytes, ProcessingError> {
        match format {
            TargetFormat::WebP => Self::compress_webp(img),
            TargetFormat::Png => Self::compress_png(img),
            TargetFormat::Jpeg => Self::compress_jpeg(img),
            TargetFormat::Passthrough => Self::compress_passthrough(img, source_format),
        }
    }

    fn compress_jpeg(img: &DynamicImage) -> Result<Bytes, ProcessingError> {
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, ENCODE_QUALITY);

        // JPEG has no alpha channel
        DynamicImage::ImageRgb8(img.to_rgb8())
            .write_with_encoder(encoder)
            .map_err(|e| ProcessingError::encode_failed("jpeg", e.to_string()))?;

        Ok(Bytes::from(buffer))
    }

    fn compress_png(img: &DynamicImage) -> Result<Bytes, ProcessingError> {
        let mut buffer = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut buffer, CompressionType::Default, FilterType::Adaptive);

        img.write_with_encoder(encoder)
            .map_err(|e| ProcessingError::encode_failed("png", e.to_string()))?;

        Ok(Bytes::from(buffer))
    }

    fn compress_webp(img: &DynamicImage) -> Result<Bytes, ProcessingError> {
        let (width, height) = (img.width(), img.height());
        if width > WEBP_MAX_DIMENSION || height > WEBP_MAX_DIMENSION {
            return Err(ProcessingError::encode_failed(
                "webp",
                format!(
                    "{}x{} exceeds the WebP limit of {} pixels per side",
                    width, height, WEBP_MAX_DIMENSION
                ),
            ));
        }

        let rgba_img = img.to_rgba8();
        let encoder = webp::Encoder::from_rgba(&rgba_img, width, height);
        let webp_data = encoder
            .encode_simple(false, ENCODE_QUALITY as f32)
            .map_err(|e| ProcessingError::encode_failed("webp", format!("{:?}", e)))?;

        Ok(Bytes::copy_from_slice(&webp_data))
    }

    fn compress_passthrough(
        img: &DynamicImage,
        source_format: Option<ImageFormat>,
    ) -> Result<Bytes, ProcessingError> {
        match source_format {
            Some(ImageFormat::Jpeg) => Self::compress_jpeg(img),
            Some(ImageFormat::Png) => Self::compress_png(img),
            Some(ImageFormat::WebP) => Self::compress_webp(img),
            Some(format) => {
                let mut buffer = Vec::new();
                img.write_to(&mut Cursor::new(&mut buffer), format)
                    .map_err(|e| ProcessingError::encode_failed(format!("{:?}", format), e.to_string()))?;
                Ok(Bytes::from(buffer))
            }
            None => Err(ProcessingError::encode_failed(
                "passthrough",
                "source format could not be detected",
            )),
        }
    }
}
