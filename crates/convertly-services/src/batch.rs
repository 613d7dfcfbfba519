//! Conversion batches
//!
//! One `/convert` call carries any number of files. They are converted in
//! upload order on the blocking pool, one after the other, and the first
//! failure aborts the rest of the batch. Files converted before the failure
//! stay on disk and stay tracked.

use std::sync::Arc;

use convertly_core::models::{ConversionRequest, ConversionResult, UploadedImage};
use convertly_processing::ImageConverter;
use convertly_storage::OutputStore;

use crate::error::ServiceError;

#[derive(Clone)]
pub struct BatchCoordinator {
    converter: ImageConverter,
    store: Arc<OutputStore>,
}

impl BatchCoordinator {
    pub fn new(converter: ImageConverter, store: Arc<OutputStore>) -> Self {
        Self { converter, store }
    }

    /// Convert every upload and record each output name.
    ///
    /// Results come back in upload order. Scratch files of uploads that were
    /// not reached are removed when the remaining handles are dropped.
    pub async fn run(
        &self,
        request: ConversionRequest,
        uploads: Vec<UploadedImage>,
    ) -> Result<Vec<ConversionResult>, ServiceError> {
        self.store.ensure_directory().await?;

        let request = Arc::new(request);
        let total = uploads.len();
        let mut results = Vec::with_capacity(total);

        for (index, upload) in uploads.into_iter().enumerate() {
            let base_name = upload.base_name();
            let mode = request.mode_for(&base_name);

            tracing::debug!(
                file = %upload.original_name,
                size = upload.size,
                watermark = ?mode,
                position = index + 1,
                total,
                "Converting upload"
            );

            let converter = self.converter.clone();
            let request = Arc::clone(&request);
            let output_dir = self.store.directory().to_path_buf();

            let result = tokio::task::spawn_blocking(move || {
                converter.convert(
                    upload,
                    &request.target,
                    mode,
                    &request.watermark_text,
                    &output_dir,
                )
            })
            .await??;

            self.store.record(result.name.clone()).await;
            results.push(result);
        }

        tracing::info!(
            files = results.len(),
            format = %request.target.extension,
            "Conversion batch completed"
        );
        Ok(results)
    }
}
