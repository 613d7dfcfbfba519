use crate::error::AppError;

/// Encoder selected for a conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetFormat {
    WebP,
    Png,
    Jpeg,
    /// Unrecognized `convertTo`: the source codec is kept, only the file
    /// extension follows the request.
    Passthrough,
}

impl TargetFormat {
    /// Case-insensitive match against the supported codecs.
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "webp" => TargetFormat::WebP,
            "png" => TargetFormat::Png,
            "jpg" | "jpeg" => TargetFormat::Jpeg,
            _ => TargetFormat::Passthrough,
        }
    }
}

/// Requested output: the extension written on disk plus the encoder behind it.
///
/// `jpg` and `jpeg` share an encoder but keep their own extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputTarget {
    pub extension: String,
    pub format: TargetFormat,
}

impl OutputTarget {
    pub fn parse(convert_to: &str) -> Result<Self, AppError> {
        let extension = convert_to.trim().to_lowercase();

        if extension.is_empty() {
            return Err(AppError::Validation("convertTo is required".to_string()));
        }

        // The extension becomes part of a filename in the output directory.
        if extension
            .chars()
            .any(|c| c == '/' || c == '\\' || c == '\0')
            || extension.contains("..")
        {
            return Err(AppError::Validation(format!(
                "convertTo contains invalid characters: {}",
                convert_to
            )));
        }

        Ok(Self {
            format: TargetFormat::parse(&extension),
            extension,
        })
    }

    /// `<base_name>.<extension>`
    pub fn output_name(&self, base_name: &str) -> String {
        format!("{}.{}", base_name, self.extension)
    }
}
