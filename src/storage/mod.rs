//! Storage zone and CDN integration
//!
//! Wraps the file API of a single storage zone plus the account-level
//! purge call of its pull zone.

pub mod client;
pub mod mock;
pub mod naming;
pub mod route;

pub use client::StorageClient;
pub use mock::MockStorageClient;
pub use naming::{HashedName, KeepName, NamingStrategy};
pub use route::{Endpoint, Route};

use crate::models::{ListingEntry, Upload};
use crate::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::Path;

#[async_trait]
pub trait StorageService: Send + Sync {
    async fn ping(&self) -> Result<bool>;
    async fn list(&self, path: &str) -> Result<Vec<ListingEntry>>;
    async fn exists(&self, path: &str) -> Result<bool>;
    async fn size(&self, path: &str) -> Result<Option<u64>>;
    async fn get(&self, path: &str) -> Result<Vec<u8>>;
    async fn upload(
        &self,
        local_path: &Path,
        remote_path: &str,
        randomize_name: bool,
    ) -> Result<Upload>;
    async fn delete(&self, path: &str) -> Result<bool>;
    async fn purge(&self, path: &str) -> Result<Value>;

    /// Upload a local file. Only a `201 Created` counts as stored.
    async fn put(&self, local_path: &Path, remote_path: &str, randomize_name: bool) -> Result<bool> {
        self.upload(local_path, remote_path, randomize_name)
            .await
            .map(|upload| upload.stored)
    }
}

pub(crate) fn require_path(path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(Error::EmptyPath);
    }
    Ok(())
}

/// Read a local file for upload, rejecting anything missing, unreadable or
/// empty.
pub(crate) async fn read_local_file(local_path: &Path) -> Result<Vec<u8>> {
    let metadata = tokio::fs::metadata(local_path)
        .await
        .map_err(|e| Error::local_file(local_path, format!("is not accessible: {}", e)))?;

    if !metadata.is_file() {
        return Err(Error::local_file(local_path, "is not a regular file"));
    }
    if metadata.len() == 0 {
        return Err(Error::local_file(local_path, "is empty"));
    }

    let data = tokio::fs::read(local_path)
        .await
        .map_err(|e| Error::local_file(local_path, format!("is not readable: {}", e)))?;

    if data.is_empty() {
        return Err(Error::local_file(local_path, "is empty"));
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_require_path_rejects_blank() {
        assert!(matches!(require_path(""), Err(Error::EmptyPath)));
        assert!(require_path("a.jpg").is_ok());
        // Only a zero-length path is blank; whitespace is a valid name.
        assert!(require_path("   ").is_ok());
    }

    #[tokio::test]
    async fn test_read_local_file_rejects_missing_and_empty() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("missing.jpg");
        let err = read_local_file(&missing).await.unwrap_err();
        assert!(matches!(err, Error::LocalFile { .. }));

        let empty = dir.path().join("empty.jpg");
        std::fs::File::create(&empty).unwrap();
        let err = read_local_file(&empty).await.unwrap_err();
        assert!(matches!(err, Error::LocalFile { .. }));

        let err = read_local_file(dir.path()).await.unwrap_err();
        assert!(matches!(err, Error::LocalFile { .. }));
    }

    #[tokio::test]
    async fn test_read_local_file_returns_contents() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"image bytes").unwrap();

        let data = read_local_file(file.path()).await.unwrap();
        assert_eq!(data, b"image bytes");
    }
}
