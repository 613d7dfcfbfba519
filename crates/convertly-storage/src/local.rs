use std::path::{Path, PathBuf};

use tokio::fs;
use tokio::sync::Mutex;

use crate::error::{StorageError, StorageResult};

/// Local output directory plus the filenames converted since the last clear.
///
/// The tracked set keeps insertion order without duplicates. All mutations
/// go through one mutex, so a clear never interleaves with an append.
pub struct OutputStore {
    base_path: PathBuf,
    tracked: Mutex<Vec<String>>,
}

impl OutputStore {
    /// Create the store, making sure the output directory exists.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let store = Self {
            base_path: base_path.into(),
            tracked: Mutex::new(Vec::new()),
        };
        store.ensure_directory().await?;
        Ok(store)
    }

    pub fn directory(&self) -> &Path {
        &self.base_path
    }

    pub async fn ensure_directory(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create output directory {}: {}",
                self.base_path.display(),
                e
            ))
        })
    }

    /// Path of a file inside the output directory.
    pub fn path_of(&self, name: &str) -> StorageResult<PathBuf> {
        if name.is_empty()
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(StorageError::InvalidName(name.to_string()));
        }
        Ok(self.base_path.join(name))
    }

    /// Add a converted filename, keeping the first position on repeats.
    pub async fn record(&self, name: impl Into<String>) {
        let name = name.into();
        let mut tracked = self.tracked.lock().await;
        if !tracked.contains(&name) {
            tracked.push(name);
        }
    }

    /// Snapshot of the tracked filenames in insertion order.
    pub async fn list_tracked_files(&self) -> Vec<String> {
        self.tracked.lock().await.clone()
    }

    /// Delete every file in the output directory, tracked or not, and forget
    /// all tracked names.
    ///
    /// Per-file failures are logged and skipped. Failing to read the
    /// directory is an error and leaves the tracked set untouched.
    pub async fn delete_all(&self) -> StorageResult<usize> {
        let mut tracked = self.tracked.lock().await;

        let mut entries = fs::read_dir(&self.base_path).await?;
        let mut deleted = 0;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            match fs::remove_file(&path).await {
                Ok(()) => deleted += 1,
                Err(e) => {
                    tracing::warn!(
                        error = %e,
                        path = %path.display(),
                        "Failed to delete output file"
                    );
                }
            }
        }

        tracked.clear();
        tracing::info!(deleted, "Cleared output directory");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_new_creates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let base = temp_dir.path().join("converted");

        let store = OutputStore::new(&base).await.unwrap();
        assert!(base.is_dir());
        assert_eq!(store.directory(), base.as_path());
        assert!(store.list_tracked_files().await.is_empty());
    }

    #[tokio::test]
    async fn test_record_keeps_order_without_duplicates() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(temp_dir.path()).await.unwrap();

        store.record("b.webp").await;
        store.record("a.webp").await;
        store.record("b.webp").await;

        assert_eq!(store.list_tracked_files().await, vec!["b.webp", "a.webp"]);
    }

    #[tokio::test]
    async fn test_delete_all_removes_untracked_files_too() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(temp_dir.path()).await.unwrap();

        std::fs::write(temp_dir.path().join("tracked.png"), b"x").unwrap();
        std::fs::write(temp_dir.path().join("stray.png"), b"y").unwrap();
        store.record("tracked.png").await;

        let deleted = store.delete_all().await.unwrap();

        assert_eq!(deleted, 2);
        assert!(store.list_tracked_files().await.is_empty());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn test_delete_all_skips_entries_it_cannot_remove() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = OutputStore::new(temp_dir.path()).await.unwrap();

        std::fs::create_dir(temp_dir.path().join("nested")).unwrap();
        std::fs::write(temp_dir.path().join("a.jpg"), b"x").unwrap();
        store.record("a.jpg").await;

        let deleted = store.delete_all().await.unwrap();

        assert_eq!(deleted, 1);
        assert!(temp_dir.path().join("nested").is_dir());
        assert!(store.list_tracked_files().await.is_empty());
    }

    #[tokio::test]
    async fn test_delete_all_fails_when_directory_is_gone() {
        let temp_dir = tempfile::tempdir().unwrap();
        let base = temp_dir.path().join("converted");
        let store = OutputStore::new(&base).await.unwrap();
        store.record("a.webp").await;

        std::fs::remove_dir(&base).unwrap();

        let result = store.delete_all().await;
        assert!(matches!(result, Err(StorageError::IoError(_))));
        assert_eq!(store.list_tracked_files().await, vec!["a.webp"]);
    }

    #[test]
    fn test_path_of_rejects_traversal() {
        let store = OutputStore {
            base_path: PathBuf::from("converted"),
            tracked: Mutex::new(Vec::new()),
        };

        assert_eq!(
            store.path_of("cat.webp").unwrap(),
            PathBuf::from("converted/cat.webp")
        );
        assert!(store.path_of("../secret").is_err());
        assert!(store.path_of("..").is_err());
        assert!(store.path_of("a..b.webp").is_ok());
        assert!(store.path_of("a/b.png").is_err());
        assert!(store.path_of("").is_err());
    }
}
