//! Multipart parsing for `/convert`

use std::collections::HashMap;
use std::path::Path;

use axum::extract::multipart::Field;
use axum::extract::Multipart;
use convertly_core::constants::{IMAGES_FIELD, WATERMARK_FIELD_PREFIX};
use convertly_core::models::{
    ConversionRequest, OutputTarget, UploadedImage, WatermarkMode,
};
use convertly_core::AppError;
use tokio::io::AsyncWriteExt;

const CONVERT_TO_FIELD: &str = "convertTo";
const WATERMARK_TEXT_FIELD: &str = "watermarkText";

/// Everything a `/convert` form carries.
///
/// Files and text fields may arrive in any order, so the whole form is read
/// before the request is built.
#[derive(Debug, Default)]
pub struct ConvertForm {
    pub convert_to: Option<String>,
    pub watermark_text: String,
    pub watermark_modes: HashMap<String, WatermarkMode>,
    pub uploads: Vec<UploadedImage>,
}

impl ConvertForm {
    /// Split into the batch parameters and the uploaded files.
    pub fn into_request(self) -> Result<(ConversionRequest, Vec<UploadedImage>), AppError> {
        let convert_to = self
            .convert_to
            .ok_or_else(|| AppError::Validation("convertTo is required".to_string()))?;
        let target = OutputTarget::parse(&convert_to)?;

        let mut request = ConversionRequest::new(target, &self.watermark_text);
        request.watermark_modes = self.watermark_modes;
        Ok((request, self.uploads))
    }
}

/// Read a `/convert` form, streaming every file under `images` into
/// `upload_dir`.
pub async fn extract_convert_form(
    mut multipart: Multipart,
    upload_dir: &Path,
) -> Result<ConvertForm, AppError> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let mut form = ConvertForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read multipart: {}", e)))?
    {
        let field_name = field.name().map(|s| s.to_string()).unwrap_or_default();

        if field_name == IMAGES_FIELD {
            let upload = save_upload(field, upload_dir).await?;
            form.uploads.push(upload);
        } else if field_name == CONVERT_TO_FIELD {
            form.convert_to = Some(read_text(field).await?);
        } else if field_name == WATERMARK_TEXT_FIELD {
            form.watermark_text = read_text(field).await?;
        } else if let Some(base_name) = field_name.strip_prefix(WATERMARK_FIELD_PREFIX) {
            let base_name = base_name.to_string();
            let mode = WatermarkMode::parse(&read_text(field).await?);
            form.watermark_modes.insert(base_name, mode);
        } else {
            tracing::debug!(field = %field_name, "Ignoring unknown form field");
        }
    }

    Ok(form)
}

async fn read_text(field: Field<'_>) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form field: {}", e)))
}

/// Stream one file field to a scratch file.
async fn save_upload(mut field: Field<'_>, upload_dir: &Path) -> Result<UploadedImage, AppError> {
    let original_name = field
        .file_name()
        .map(|s| s.to_string())
        .unwrap_or_default();

    let temp_file = tempfile::Builder::new()
        .prefix("upload-")
        .tempfile_in(upload_dir)?;
    let (file, temp_path) = temp_file.into_parts();
    let mut file = tokio::fs::File::from_std(file);

    let mut size: u64 = 0;
    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file data: {}", e)))?
    {
        file.write_all(&chunk).await?;
        size += chunk.len() as u64;
    }
    file.flush().await?;

    tracing::debug!(file = %original_name, size, "Upload received");

    Ok(UploadedImage::new(temp_path, original_name, size))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_request_requires_convert_to() {
        let form = ConvertForm::default();
        assert!(matches!(
            form.into_request(),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_into_request_carries_modes_and_text() {
        let mut form = ConvertForm {
            convert_to: Some("WEBP".to_string()),
            watermark_text: "  ACME  ".to_string(),
            ..Default::default()
        };
        form.watermark_modes
            .insert("cat".to_string(), WatermarkMode::Dark);

        let (request, uploads) = form.into_request().unwrap();
        assert_eq!(request.target.extension, "webp");
        assert_eq!(request.watermark_text, "ACME");
        assert_eq!(request.mode_for("cat"), WatermarkMode::Dark);
        assert!(uploads.is_empty());
    }
}
