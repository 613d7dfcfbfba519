use std::path::Path;

use ab_glyph::FontArc;

use crate::error::ProcessingError;

/// DejaVu Sans, bundled so the watermark renders without system fonts.
const EMBEDDED_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Typeface used to rasterize watermark text.
#[derive(Clone)]
pub struct WatermarkFont {
    font: FontArc,
}

impl WatermarkFont {
    pub fn embedded() -> Result<Self, ProcessingError> {
        let font = FontArc::try_from_slice(EMBEDDED_FONT)
            .map_err(|e| ProcessingError::Font(e.to_string()))?;
        Ok(Self { font })
    }

    pub fn from_path(path: &Path) -> Result<Self, ProcessingError> {
        let bytes = std::fs::read(path)?;
        let font = FontArc::try_from_vec(bytes).map_err(|e| {
            ProcessingError::Font(format!("{}: {}", path.display(), e))
        })?;
        Ok(Self { font })
    }

    /// Font file from configuration when given, the bundled one otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ProcessingError> {
        match path {
            Some(path) => {
                tracing::info!(path = %path.display(), "Loading watermark font");
                Self::from_path(path)
            }
            None => Self::embedded(),
        }
    }

    pub fn as_font(&self) -> &FontArc {
        &self.font
    }
}

impl std::fmt::Debug for WatermarkFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatermarkFont").finish_non_exhaustive()
    }
}
