use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::format::OutputTarget;

/// Per-file watermark selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkMode {
    #[default]
    None,
    /// Low-opacity white text.
    Light,
    /// Low-opacity black text.
    Dark,
}

impl WatermarkMode {
    /// Empty and `none` disable the watermark, `light` selects white text and
    /// any other value selects black text. Matching is exact: `NONE` and
    /// `Light` both select black text.
    pub fn parse(s: &str) -> Self {
        match s {
            "" | "none" => WatermarkMode::None,
            "light" => WatermarkMode::Light,
            _ => WatermarkMode::Dark,
        }
    }
}

/// Parameters shared by every file of one `/convert` call.
#[derive(Debug, Clone)]
pub struct ConversionRequest {
    pub target: OutputTarget,
    /// Shared text, already trimmed. Empty disables watermarking.
    pub watermark_text: String,
    /// Mode per original base name.
    pub watermark_modes: HashMap<String, WatermarkMode>,
}

impl ConversionRequest {
    pub fn new(target: OutputTarget, watermark_text: &str) -> Self {
        Self {
            target,
            watermark_text: watermark_text.trim().to_string(),
            watermark_modes: HashMap::new(),
        }
    }

    /// Mode selected for a base name, `None` unless explicitly supplied.
    pub fn mode_for(&self, base_name: &str) -> WatermarkMode {
        self.watermark_modes
            .get(base_name)
            .copied()
            .unwrap_or_default()
    }
}

/// Outcome of converting one uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionResult {
    pub name: String,
    pub original_size: String,
    pub converted_size: String,
    /// Two decimals, negative when the output grew.
    pub saved_percent: String,
}

impl ConversionResult {
    pub fn new(name: impl Into<String>, original_bytes: u64, converted_bytes: u64) -> Self {
        Self {
            name: name.into(),
            original_size: format_size(original_bytes),
            converted_size: format_size(converted_bytes),
            saved_percent: saved_percent(original_bytes, converted_bytes),
        }
    }
}

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// `"X.XX KB"` below one MiB, `"X.XX MB"` from there on.
pub fn format_size(bytes: u64) -> String {
    let bytes = bytes as f64;
    if bytes < MIB {
        format!("{} KB", fixed_two(bytes / KIB))
    } else {
        format!("{} MB", fixed_two(bytes / MIB))
    }
}

/// `(1 - converted / original) * 100` with two decimals.
pub fn saved_percent(original_bytes: u64, converted_bytes: u64) -> String {
    if original_bytes == 0 {
        return "0.00".to_string();
    }
    let ratio = converted_bytes as f64 / original_bytes as f64;
    fixed_two((1.0 - ratio) * 100.0)
}

/// Two decimals, halfway cases rounded away from zero.
///
/// The tie is decided on the exact binary value: `1.125` becomes `1.13`
/// while `2.675`, stored as `2.67499...`, stays `2.67`.
fn fixed_two(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let sign = if value < 0.0 { "-" } else { "" };

    // Every f64 has at most 1074 fractional digits, so this expansion is exact.
    let exact = format!("{:.1074}", value.abs());
    let Some((int_part, frac)) = exact.split_once('.') else {
        return format!("{:.2}", value);
    };
    let (Some(kept), Some(next)) = (frac.get(..2), frac.as_bytes().get(2)) else {
        return format!("{:.2}", value);
    };
    let Ok(mut cents) = format!("{}{}", int_part, kept).parse::<u128>() else {
        return format!("{:.2}", value);
    };
    if *next >= b'5' {
        cents += 1;
    }
    format!("{}{}.{:02}", sign, cents / 100, cents % 100)
}
