use std::time::Duration;

use async_trait::async_trait;

use super::error::StorageError;
use super::traits::{FileStorage, UploadedFile};

/// Stand-in used when no storage backend is configured.
///
/// Uploads fail, URLs resolve to `None`, deletes are no-ops.
pub struct UnconfiguredStorage;

#[async_trait]
impl FileStorage for UnconfiguredStorage {
    async fn upload(&self, _file: &UploadedFile, _directory: &str) -> Result<String, StorageError> {
        Err(StorageError::Unconfigured)
    }

    async fn temporary_url(
        &self,
        _path: &str,
        _ttl: Duration,
    ) -> Result<Option<String>, StorageError> {
        Ok(None)
    }

    async fn delete(&self, _path: &str) -> Result<bool, StorageError> {
        Ok(false)
    }
}
