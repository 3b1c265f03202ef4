//! Local object storage for uploaded files

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use crate::{Error, Result};

/// Stores objects as files under a root directory, addressed by
/// slash-separated keys.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Write an object, replacing any previous one under the same key.
    pub async fn put(&self, key: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp_path = path.with_extension("part");
        tokio::fs::write(&tmp_path, bytes).await.map_err(|e| {
            Error::Storage(format!("Failed to write {}: {}", tmp_path.display(), e))
        })?;
        tokio::fs::rename(&tmp_path, &path).await.map_err(|e| {
            Error::Storage(format!("Failed to store object {}: {}", key, e))
        })?;

        debug!(key, size = bytes.len(), "Stored upload object");
        Ok(path)
    }

    pub async fn exists(&self, key: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path_for(key)?).await?)
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let is_plain = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !is_plain {
            return Err(Error::InvalidInput(format!("invalid object key '{}'", key)));
        }
        Ok(self.root.join(relative))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_creates_nested_object() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlobStore::new(temp_dir.path());

        let path = store.put("registrations/E1/a.xlsx", b"bytes").await.unwrap();

        assert!(path.starts_with(temp_dir.path()));
        assert_eq!(tokio::fs::read(&path).await.unwrap(), b"bytes");
        assert!(store.exists("registrations/E1/a.xlsx").await.unwrap());
        assert!(!store.exists("registrations/E1/b.xlsx").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_cannot_escape_root() {
        let temp_dir = TempDir::new().unwrap();
        let store = BlobStore::new(temp_dir.path().join("blobs"));

        for key in ["../outside", "/etc/passwd", "a/../../b", ""] {
            let err = store.put(key, b"x").await.unwrap_err();
            assert_eq!(err.kind(), "invalid_input", "key {:?}", key);
        }
    }
}
