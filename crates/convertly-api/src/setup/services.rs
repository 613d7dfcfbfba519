//! Construction of the long-lived services behind `AppState`.

use std::sync::Arc;

use anyhow::{Context, Result};
use convertly_core::Config;
use convertly_processing::{ImageConverter, WatermarkFont};
use convertly_services::BatchCoordinator;
use convertly_storage::OutputStore;

use crate::state::AppState;

pub async fn initialize_services(config: &Config) -> Result<Arc<AppState>> {
    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory {}",
                config.upload_dir.display()
            )
        })?;

    let store = Arc::new(
        OutputStore::new(&config.output_dir)
            .await
            .context("Failed to initialize output store")?,
    );

    let font = WatermarkFont::load(config.watermark_font_path.as_deref())
        .context("Failed to load watermark font")?;
    let converter = ImageConverter::new(Arc::new(font), config.max_dimension);
    let batch = BatchCoordinator::new(converter, Arc::clone(&store));

    tracing::info!(
        output_dir = %config.output_dir.display(),
        upload_dir = %config.upload_dir.display(),
        max_dimension = config.max_dimension,
        "Services initialized"
    );

    Ok(Arc::new(AppState {
        config: config.clone(),
        store,
        batch,
    }))
}
