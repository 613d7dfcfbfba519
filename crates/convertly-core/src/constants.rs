//! Fixed values of the conversion pipeline.

/// Quality applied to every lossy encode. Not configurable.
pub const ENCODE_QUALITY: u8 = 80;

/// Opacity of watermark text, as a fraction of full coverage.
pub const WATERMARK_OPACITY: f32 = 0.08;

/// Multipart field carrying the uploaded files.
pub const IMAGES_FIELD: &str = "images";

/// Prefix of the per-file watermark mode fields (`watermark_<baseName>`).
pub const WATERMARK_FIELD_PREFIX: &str = "watermark_";

/// Filename offered for the bulk download.
pub const ARCHIVE_FILENAME: &str = "converted_images.zip";
