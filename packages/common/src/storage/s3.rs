use std::time::Duration;

use async_trait::async_trait;
use ::s3::creds::Credentials;
use ::s3::{Bucket, Region};

use super::error::StorageError;
use super::path::{object_path, validate_relative};
use super::traits::{FileStorage, UploadedFile};
use crate::config::S3Config;

/// Longest expiry S3 accepts for a presigned URL (7 days).
const MAX_PRESIGN_SECS: u64 = 7 * 24 * 60 * 60;

/// S3-compatible object storage. Download links are presigned GET URLs.
pub struct S3FileStorage {
    bucket: Box<Bucket>,
    max_size: u64,
}

fn backend_err(e: impl std::fmt::Display) -> StorageError {
    StorageError::Backend(e.to_string())
}

impl S3FileStorage {
    pub fn new(config: &S3Config, max_size: u64) -> Result<Self, StorageError> {
        let region = match &config.endpoint {
            Some(endpoint) => Region::Custom {
                region: config.region.clone(),
                endpoint: endpoint.clone(),
            },
            None => config.region.parse().map_err(backend_err)?,
        };
        let credentials = Credentials::new(
            Some(config.access_key.as_str()),
            Some(config.secret_key.as_str()),
            None,
            None,
            None,
        )
        .map_err(backend_err)?;

        let mut bucket = Bucket::new(&config.bucket, region, credentials).map_err(backend_err)?;
        if config.path_style {
            bucket = bucket.with_path_style();
        }

        Ok(Self { bucket, max_size })
    }
}

#[async_trait]
impl FileStorage for S3FileStorage {
    async fn upload(&self, file: &UploadedFile, directory: &str) -> Result<String, StorageError> {
        if file.size() > self.max_size {
            return Err(StorageError::SizeLimitExceeded {
                actual: file.size(),
                limit: self.max_size,
            });
        }

        let stored = object_path(directory, &file.filename);
        let content_type = file
            .content_type
            .as_deref()
            .unwrap_or("application/octet-stream");

        let response = self
            .bucket
            .put_object_with_content_type(&stored, &file.data, content_type)
            .await
            .map_err(backend_err)?;
        let status = response.status_code();
        if !(200..300).contains(&status) {
            return Err(StorageError::Backend(format!(
                "upload of {stored} returned HTTP {status}"
            )));
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
        let secs = ttl.as_secs().clamp(1, MAX_PRESIGN_SECS) as u32;
        let url = self
            .bucket
            .presign_get(path, secs, None)
            .await
            .map_err(backend_err)?;
        Ok(Some(url))
    }

    async fn delete(&self, path: &str) -> Result<bool, StorageError> {
        let path = validate_relative(path)?;
        let response = self.bucket.delete_object(path).await.map_err(backend_err)?;
        match response.status_code() {
            200..=299 => Ok(true),
            404 => Ok(false),
            status => Err(StorageError::Backend(format!(
                "delete of {path} returned HTTP {status}"
            ))),
        }
    }
}
