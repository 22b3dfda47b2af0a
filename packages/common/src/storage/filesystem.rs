use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs;
use tokio::io::BufReader;

use super::error::StorageError;
use super::path::{object_path, validate_relative};
use super::signing::UrlSigner;
use super::traits::{FileStorage, UploadedFile};
use super::BoxReader;

/// Filesystem-backed private file storage.
///
/// Files live under `{root}/{stored path}`. Download links point at
/// `{public_base_url}/{stored path}` and carry an HMAC signature plus an
/// expiry timestamp, checked by [`LocalFileStorage::verify`] before serving.
pub struct LocalFileStorage {
    root: PathBuf,
    public_base_url: String,
    signer: UrlSigner,
    max_size: u64,
}

impl LocalFileStorage {
    /// Create a new filesystem store, creating the root directories.
    pub async fn new(
        root: PathBuf,
        public_base_url: impl Into<String>,
        signing_key: impl Into<Vec<u8>>,
        max_size: u64,
    ) -> Result<Self, StorageError> {
        fs::create_dir_all(&root).await?;
        fs::create_dir_all(root.join(".tmp")).await?;
        Ok(Self {
            root,
            public_base_url: public_base_url.into().trim_end_matches('/').to_string(),
            signer: UrlSigner::new(signing_key),
            max_size,
        })
    }

    fn full_path(&self, path: &str) -> Result<PathBuf, StorageError> {
        Ok(self.root.join(validate_relative(path)?))
    }

    fn temp_path(&self) -> PathBuf {
        self.root
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }

    /// Check a download link's signature and expiry.
    pub fn verify(&self, path: &str, expires: i64, signature: &str) -> bool {
        self.signer
            .verify(path, expires, signature, Utc::now().timestamp())
    }

    /// Open a stored file for streaming.
    pub async fn open(&self, path: &str) -> Result<(BoxReader, u64), StorageError> {
        let full = self.full_path(path)?;
        match fs::File::open(&full).await {
            Ok(file) => {
                let len = file.metadata().await?.len();
                Ok((Box::new(BufReader::new(file)), len))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(path.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl FileStorage for LocalFileStorage {
    async fn upload(&self, file: &UploadedFile, directory: &str) -> Result<String, StorageError> {
        if file.size() > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: file.size(),
                limit: self.max_size,
            });
        }

        let stored = object_path(directory, &file.filename);
        let target = self.full_path(&stored)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &file.data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).await?;
        }

        if let Err(e) = fs::rename(&temp_path, &target).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(stored)
    }

    async fn temporary_url(
        &self,
        path: &str,
        ttl: Duration,
    ) -> Result<Option<String>, StorageError> {
        if path.is_empty() {
            return Ok(None);
        }
        let path = validate_relative(path)?;
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let expires = Utc::now().timestamp().saturating_add(ttl_secs);
        let signature = self.signer.sign(path, expires);
        Ok(Some(format!(
            "{}/{path}?expires={expires}&signature={signature}",
            self.public_base_url
        )))
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let full = self.full_path(path)?;
        match fs::remove_file(&full).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
