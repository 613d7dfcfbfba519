//! Single-image conversion: decode, bound, watermark, encode, persist.

use std::path::Path;
use std::sync::Arc;

use convertly_core::models::{ConversionResult, OutputTarget, TargetFormat, UploadedImage, WatermarkMode};
use image::{DynamicImage, ImageReader};

use crate::compression::ImageCompressor;
use crate::error::ProcessingError;
use crate::image::{SizeGuard, WatermarkComposer, WatermarkFont};

/// Converts uploads one at a time. Cheap to clone; the font is shared.
#[derive(Debug, Clone)]
pub struct ImageConverter {
    font: Arc<WatermarkFont>,
    max_dimension: u32,
}

impl ImageConverter {
    pub fn new(font: Arc<WatermarkFont>, max_dimension: u32) -> Self {
        Self {
            font,
            max_dimension,
        }
    }

    /// Convert `upload` into `output_dir` and delete its scratch file.
    ///
    /// The output is named `<base name>.<extension>` and silently replaces an
    /// existing file of the same name. On error the scratch file is removed
    /// when `upload` is dropped.
    pub fn convert(
        &self,
        upload: UploadedImage,
        target: &OutputTarget,
        mode: WatermarkMode,
        watermark_text: &str,
        output_dir: &Path,
    ) -> Result<ConversionResult, ProcessingError> {
        let reader = ImageReader::open(upload.path())?.with_guessed_format()?;
        let source_format = reader.format();
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        let bounded = SizeGuard::bound(width, height, self.max_dimension);

        // Uploads may exceed the decoder's default allocation limit.
        let mut reader = ImageReader::open(upload.path())?.with_guessed_format()?;
        reader.no_limits();
        let img = reader
            .decode()
            .map_err(|e| ProcessingError::Decode(e.to_string()))?;

        let mut img = SizeGuard::apply(img, bounded);

        if let Some(overlay) =
            WatermarkComposer::compose(bounded.width, bounded.height, watermark_text, mode)
        {
            let mut canvas = img.to_rgba8();
            overlay.composite_onto(&mut canvas, &self.font);
            img = DynamicImage::ImageRgba8(canvas);
        }

        if target.format == TargetFormat::Passthrough {
            tracing::warn!(
                extension = %target.extension,
                source_format = ?source_format,
                "Unsupported target format, keeping source encoding"
            );
        }

        let encoded = ImageCompressor::compress(&img, target.format, source_format)?;

        let output_name = target.output_name(&upload.base_name());
        let output_path = output_dir.join(&output_name);
        std::fs::write(&output_path, &encoded)?;

        let original_size = std::fs::metadata(upload.path())?.len();
        let converted_size = std::fs::metadata(&output_path)?.len();

        upload.remove()?;

        tracing::info!(
            output = %output_name,
            width = bounded.width,
            height = bounded.height,
            resized = bounded.resized,
            watermark = ?mode,
            original_size,
            converted_size,
            "Image converted"
        );

        Ok(ConversionResult::new(output_name, original_size, converted_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convertly_core::models::format_size;
    use image::{ImageFormat, Rgb, RgbImage};
    use std::io::Write;

    fn write_upload(dir: &Path, name: &str, img: &DynamicImage, format: ImageFormat) -> UploadedImage {
        let mut file = tempfile::NamedTempFile::new_in(dir).unwrap();
        let mut bytes = Vec::new();
        img.write_to(&mut std::io::Cursor::new(&mut bytes), format).unwrap();
        file.write_all(&bytes).unwrap();
        UploadedImage::new(file.into_temp_path(), name, bytes.len() as u64)
    }

    fn gradient(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, 200])
        }))
    }

    fn converter(max_dimension: u32) -> ImageConverter {
        ImageConverter::new(Arc::new(WatermarkFont::embedded().unwrap()), max_dimension)
    }

    #[test]
    fn test_convert_png_to_webp() {
        let uploads = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let upload = write_upload(uploads.path(), "cat.png", &gradient(120, 80), ImageFormat::Png);
        let scratch = upload.path().to_path_buf();
        let original_len = std::fs::metadata(&scratch).unwrap().len();

        let target = OutputTarget::parse("webp").unwrap();
        let result = converter(16000)
            .convert(upload, &target, WatermarkMode::None, "", output.path())
            .unwrap();

        assert_eq!(result.name, "cat.webp");
        assert_eq!(result.original_size, format_size(original_len));

        let written = std::fs::read(output.path().join("cat.webp")).unwrap();
        assert_eq!(image::guess_format(&written).unwrap(), ImageFormat::WebP);
        assert_eq!(result.converted_size, format_size(written.len() as u64));

        let decoded = image::load_from_memory(&written).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 80));
        assert!(!scratch.exists());
    }

    #[test]
    fn test_convert_bounds_and_watermarks() {
        let uploads = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let upload = write_upload(uploads.path(), "wide.png", &gradient(400, 200), ImageFormat::Png);

        let target = OutputTarget::parse("png").unwrap();
        let result = converter(300)
            .convert(upload, &target, WatermarkMode::Dark, "TEST", output.path())
            .unwrap();
        assert_eq!(result.name, "wide.png");

        let decoded = image::open(output.path().join("wide.png")).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (300, 150));
    }

    fn convert_white_png(mode: WatermarkMode, text: &str) -> (RgbImage, RgbImage) {
        let uploads = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let white = DynamicImage::ImageRgb8(RgbImage::from_pixel(300, 300, Rgb([255, 255, 255])));
        let upload = write_upload(uploads.path(), "blank.png", &white, ImageFormat::Png);

        let target = OutputTarget::parse("png").unwrap();
        converter(16000)
            .convert(upload, &target, mode, text, output.path())
            .unwrap();

        let written = image::open(output.path().join("blank.png")).unwrap();
        (white.to_rgb8(), written.to_rgb8())
    }

    #[test]
    fn test_convert_draws_dark_watermark() {
        let (_, written) = convert_white_png(WatermarkMode::Dark, "TEST");
        assert!(written.pixels().any(|p| p[0] < 255));
    }

    #[test]
    fn test_convert_without_mode_leaves_pixels_untouched() {
        let (original, written) = convert_white_png(WatermarkMode::None, "TEST");
        assert_eq!(written, original);
    }

    #[test]
    fn test_convert_without_text_leaves_pixels_untouched() {
        let (original, written) = convert_white_png(WatermarkMode::Dark, "");
        assert_eq!(written, original);
    }

    #[test]
    fn test_convert_passthrough_keeps_codec() {
        let uploads = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let upload = write_upload(uploads.path(), "scan.png", &gradient(32, 32), ImageFormat::Png);

        let target = OutputTarget::parse("tiff").unwrap();
        let result = converter(16000)
            .convert(upload, &target, WatermarkMode::None, "", output.path())
            .unwrap();

        assert_eq!(result.name, "scan.tiff");
        let written = std::fs::read(output.path().join("scan.tiff")).unwrap();
        assert_eq!(image::guess_format(&written).unwrap(), ImageFormat::Png);
    }

    #[test]
    fn test_convert_overwrites_existing_output() {
        let uploads = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        std::fs::write(output.path().join("dup.jpg"), b"stale").unwrap();

        let upload = write_upload(uploads.path(), "dup.png", &gradient(16, 16), ImageFormat::Png);
        let target = OutputTarget::parse("jpg").unwrap();
        converter(16000)
            .convert(upload, &target, WatermarkMode::None, "", output.path())
            .unwrap();

        let written = std::fs::read(output.path().join("dup.jpg")).unwrap();
        assert_eq!(image::guess_format(&written).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn test_convert_rejects_non_image() {
        let uploads = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let mut file = tempfile::NamedTempFile::new_in(uploads.path()).unwrap();
        file.write_all(b"definitely not an image").unwrap();
        let temp_path = file.into_temp_path();
        let scratch = temp_path.to_path_buf();
        let upload = UploadedImage::new(temp_path, "notes.txt", 23);

        let target = OutputTarget::parse("webp").unwrap();
        let result = converter(16000).convert(upload, &target, WatermarkMode::None, "", output.path());

        assert!(matches!(result, Err(ProcessingError::Decode(_))));
        assert!(!scratch.exists());
        assert_eq!(std::fs::read_dir(output.path()).unwrap().count(), 0);
    }
}
