use std::io::Write;

use convertly_storage::OutputStore;

use crate::error::ServiceError;

/// Zip every tracked output that still exists on disk, in tracking order.
///
/// Fails with [`ServiceError::EmptyExport`] when nothing is tracked. Tracked
/// names whose file has since disappeared are left out of the archive.
pub async fn create_zip_archive(store: &OutputStore) -> Result<Vec<u8>, ServiceError> {
    let names = store.list_tracked_files().await;
    if names.is_empty() {
        return Err(ServiceError::EmptyExport);
    }

    let mut entries = Vec::with_capacity(names.len());
    for name in names {
        let path = store.path_of(&name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => entries.push((name, data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(file = %name, "Tracked output missing, skipping");
            }
            Err(e) => return Err(ServiceError::Storage(e.into())),
        }
    }

    let entry_count = entries.len();
    let buffer = tokio::task::spawn_blocking(move || write_zip(entries)).await??;

    tracing::info!(
        entries = entry_count,
        size = buffer.len(),
        "Created output archive"
    );
    Ok(buffer)
}

fn write_zip(entries: Vec<(String, Vec<u8>)>) -> Result<Vec<u8>, ServiceError> {
    use zip::write::{FileOptions, ZipWriter};
    use zip::CompressionMethod;

    let mut buffer = Vec::new();
    {
        let mut zip = ZipWriter::new(std::io::Cursor::new(&mut buffer));
        let options = FileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(9))
            .unix_permissions(0o644);

        for (name, data) in entries {
            zip.start_file(name.as_str(), options).map_err(|e| {
                ServiceError::Archive(format!("Failed to add {} to ZIP: {}", name, e))
            })?;
            zip.write_all(&data).map_err(|e| {
                ServiceError::Archive(format!("Failed to write {} to ZIP: {}", name, e))
            })?;
        }

        zip.finish()
            .map_err(|e| ServiceError::Archive(format!("Failed to finalize ZIP archive: {}", e)))?;
    }

    Ok(buffer)
}
