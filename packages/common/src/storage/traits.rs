use std::time::Duration;

use async_trait::async_trait;

use super::error::StorageError;

/// A raw upload received from a client, not yet persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadedFile {
    /// Original client-side filename.
    pub filename: String,
    pub content_type: Option<String>,
    pub data: Vec<u8>,
}

impl UploadedFile {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content_type: None,
            data: data.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }
}

/// Private file storage addressed by opaque paths.
///
/// Paths returned by [`FileStorage::upload`] are what gets persisted; URLs
/// are always derived on demand via [`FileStorage::temporary_url`].
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Persist an upload under `directory` and return its stored path.
    async fn upload(&self, file: &UploadedFile, directory: &str) -> Result<String, StorageError>;

    /// Produce a time-limited URL for a stored path.
    ///
    /// Returns `None` when the path is empty or no backend is configured;
    /// callers treat that as "no URL available", not as a failure.
    async fn temporary_url(
        &self,
        path: &str,
        ttl: Duration,
    ) -> Result<Option<String>, StorageError>;

    /// Delete a stored file.
    ///
    /// Returns `true` if the file was deleted, `false` if it did not exist.
    async fn delete(&self, path: &str) -> Result<bool, StorageError>;
}
