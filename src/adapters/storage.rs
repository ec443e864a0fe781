use crate::core::Storage;
use crate::utils::error::Result;
use std::path::{Path, PathBuf};

/// Local filesystem storage. Relative paths resolve against `base_path`,
/// absolute paths are used as-is.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.base_path.join(Path::new(path))
    }
}

impl Default for LocalStorage {
    fn default() -> Self {
        Self::new(".")
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let data = tokio::fs::read(self.resolve(path)).await?;
        Ok(data)
    }

    // 不自動建立目錄：目錄不存在就直接失敗
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        tokio::fs::write(self.resolve(path), data).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_then_read_relative_path() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("out.csv", b"a\nb\n").await.unwrap();

        assert_eq!(storage.read_file("out.csv").await.unwrap(), b"a\nb\n");
        assert!(dir.path().join("out.csv").exists());
    }

    #[tokio::test]
    async fn test_write_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        storage.write_file("out.csv", b"old content that is long").await.unwrap();
        storage.write_file("out.csv", b"new").await.unwrap();

        assert_eq!(storage.read_file("out.csv").await.unwrap(), b"new");
    }

    #[tokio::test]
    async fn test_write_into_missing_directory_fails() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());

        let result = storage.write_file("missing/out.csv", b"x").await;

        assert!(result.is_err());
        assert!(!dir.path().join("missing").exists());
    }

    #[tokio::test]
    async fn test_absolute_path_ignores_base() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new("/does/not/matter");
        let target = dir.path().join("abs.csv");

        storage
            .write_file(target.to_str().unwrap(), b"abs")
            .await
            .unwrap();

        assert_eq!(std::fs::read(&target).unwrap(), b"abs");
    }
}
