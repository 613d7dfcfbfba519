use std::path::Path;

use tempfile::TempPath;

/// A file received from a multipart upload, parked in the scratch directory.
///
/// The scratch file is removed by [`UploadedImage::remove`] once processed, or
/// when the value is dropped on a failure path.
#[derive(Debug)]
pub struct UploadedImage {
    temp_path: TempPath,
    pub original_name: String,
    pub size: u64,
}

impl UploadedImage {
    pub fn new(temp_path: TempPath, original_name: impl Into<String>, size: u64) -> Self {
        Self {
            temp_path,
            original_name: original_name.into(),
            size,
        }
    }

    pub fn path(&self) -> &Path {
        &self.temp_path
    }

    /// Original filename without directories or its last extension.
    pub fn base_name(&self) -> String {
        base_name(&self.original_name)
    }

    /// Delete the scratch file, reporting the error instead of ignoring it.
    pub fn remove(self) -> std::io::Result<()> {
        self.temp_path.close()
    }
}

/// Filename without directories or its last extension.
pub fn base_name(filename: &str) -> String {
    let last_segment = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    Path::new(last_segment)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty() && *s != "..")
        .unwrap_or("unnamed")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name() {
        assert_eq!(base_name("cat.png"), "cat");
        assert_eq!(base_name("archive.tar.gz"), "archive.tar");
        assert_eq!(base_name("noext"), "noext");
        assert_eq!(base_name(".hidden"), ".hidden");
    }

    #[test]
    fn test_base_name_strips_directories() {
        assert_eq!(base_name("../../etc/passwd.png"), "passwd");
        assert_eq!(base_name("C:\\photos\\dog.jpg"), "dog");
        assert_eq!(base_name(""), "unnamed");
        assert_eq!(base_name(".."), "unnamed");
    }

    #[test]
    fn test_remove_deletes_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
        let temp_path = file.into_temp_path();
        let path = temp_path.to_path_buf();

        let upload = UploadedImage::new(temp_path, "photo.png", 0);
        assert_eq!(upload.base_name(), "photo");
        assert!(path.exists());

        upload.remove().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_deletes_scratch_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = tempfile::NamedTempFile::new_in(dir.path()).unwrap();
        let temp_path = file.into_temp_path();
        let path = temp_path.to_path_buf();

        drop(UploadedImage::new(temp_path, "photo.png", 0));
        assert!(!path.exists());
    }
}
