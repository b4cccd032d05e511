use std::fs;
use std::path::{Path, PathBuf};

use crate::backend::{BlobStore, PersistenceError, PersistenceResult};

/// File-based backend: one `<name>.json` file per store name.
///
/// The directory is created on first save.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Directory holding the blob files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Get the blob file path for a store name
    fn blob_path(&self, name: &str) -> PersistenceResult<PathBuf> {
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(PersistenceError::unavailable(format!(
                "Invalid store name: {:?}",
                name
            )));
        }
        Ok(self.dir.join(format!("{}.json", name)))
    }
}

impl BlobStore for FileBlobStore {
    fn load(&self, name: &str) -> PersistenceResult<Option<String>> {
        let path = self.blob_path(name)?;

        match fs::read_to_string(&path) {
            Ok(blob) => {
                tracing::debug!("Loaded store {} from {:?}", name, path);
                Ok(Some(blob))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, name: &str, blob: &str) -> PersistenceResult<()> {
        let path = self.blob_path(name)?;

        fs::create_dir_all(&self.dir)?;

        // Write-then-rename so a crash never leaves a truncated blob behind
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, blob)?;
        fs::rename(&tmp, &path)?;

        tracing::debug!("Saved store {} to {:?}", name, path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path().join("data"));

        assert!(store.load("habits-storage").unwrap().is_none());

        store.save("habits-storage", r#"{"state":{},"version":1}"#).unwrap();
        assert_eq!(
            store.load("habits-storage").unwrap().as_deref(),
            Some(r#"{"state":{},"version":1}"#)
        );
        assert!(dir.path().join("data").join("habits-storage.json").exists());
    }

    #[test]
    fn test_rejects_path_like_names() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::new(dir.path());

        assert!(matches!(
            store.save("../escape", "x"),
            Err(PersistenceError::Unavailable(_))
        ));
        assert!(matches!(store.load(""), Err(PersistenceError::Unavailable(_))));
    }
}
