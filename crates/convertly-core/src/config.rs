//! Configuration module
//!
//! Settings for the HTTP server and the conversion pipeline, read from the
//! environment (and a `.env` file when present).

use std::env;
use std::path::PathBuf;

const SERVER_PORT: u16 = 3000;
const MAX_DIMENSION: u32 = 16_000;
const MAX_UPLOAD_SIZE_MB: usize = 512;

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    /// Directory holding converted outputs, served under `/converted`.
    pub output_dir: PathBuf,
    /// Scratch directory for multipart uploads.
    pub upload_dir: PathBuf,
    /// Static assets served for every unmatched path.
    pub public_dir: PathBuf,
    /// Longest side an image may keep before it is scaled down.
    pub max_dimension: u32,
    /// Request body limit for `/convert`.
    pub max_upload_size_bytes: usize,
    /// TTF/OTF face used for watermark text. `None` selects the embedded face.
    pub watermark_font_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: SERVER_PORT,
            environment: "development".to_string(),
            output_dir: PathBuf::from("converted"),
            upload_dir: PathBuf::from("uploads"),
            public_dir: PathBuf::from("public"),
            max_dimension: MAX_DIMENSION,
            max_upload_size_bytes: MAX_UPLOAD_SIZE_MB * 1024 * 1024,
            watermark_font_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_source<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();

        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or(defaults.environment);

        let server_port = lookup("PORT")
            .unwrap_or_else(|| SERVER_PORT.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?;

        let max_dimension = lookup("MAX_DIMENSION")
            .unwrap_or_else(|| MAX_DIMENSION.to_string())
            .parse()
            .map_err(|_| anyhow::anyhow!("MAX_DIMENSION must be a positive integer"))?;

        let max_upload_size_mb = lookup("MAX_UPLOAD_SIZE_MB")
            .unwrap_or_else(|| MAX_UPLOAD_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_UPLOAD_SIZE_MB);

        let config = Config {
            server_port,
            environment,
            output_dir: lookup("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            upload_dir: lookup("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            public_dir: lookup("PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            max_dimension,
            max_upload_size_bytes: max_upload_size_mb * 1024 * 1024,
            watermark_font_path: lookup("WATERMARK_FONT_PATH")
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_dimension == 0 {
            return Err(anyhow::anyhow!("MAX_DIMENSION must be greater than 0"));
        }

        if self.output_dir == self.upload_dir {
            return Err(anyhow::anyhow!(
                "OUTPUT_DIR and UPLOAD_DIR must be different directories"
            ));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, anyhow::Error> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_source(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.server_port, 3000);
        assert_eq!(config.max_dimension, 16_000);
        assert_eq!(config.output_dir, PathBuf::from("converted"));
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.public_dir, PathBuf::from("public"));
        assert!(config.watermark_font_path.is_none());
        assert!(!config.is_production());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("OUTPUT_DIR", "/tmp/out"),
            ("MAX_DIMENSION", "4096"),
            ("MAX_UPLOAD_SIZE_MB", "10"),
            ("ENVIRONMENT", "Production"),
            ("WATERMARK_FONT_PATH", "/fonts/a.ttf"),
        ])
        .unwrap();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.output_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.max_dimension, 4096);
        assert_eq!(config.max_upload_size_bytes, 10 * 1024 * 1024);
        assert_eq!(
            config.watermark_font_path,
            Some(PathBuf::from("/fonts/a.ttf"))
        );
        assert!(config.is_production());
    }

    #[test]
    fn test_invalid_port_rejected() {
        assert!(config_from(&[("PORT", "not-a-port")]).is_err());
    }

    #[test]
    fn test_zero_max_dimension_rejected() {
        assert!(config_from(&[("MAX_DIMENSION", "0")]).is_err());
    }

    #[test]
    fn test_shared_output_and_upload_dir_rejected() {
        assert!(config_from(&[("OUTPUT_DIR", "same"), ("UPLOAD_DIR", "same")]).is_err());
    }
}
