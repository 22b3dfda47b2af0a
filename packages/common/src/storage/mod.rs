mod error;
mod path;
mod signing;
mod traits;

pub mod filesystem;
#[cfg(feature = "object-storage")]
pub mod s3;
pub mod unconfigured;

use std::sync::Arc;

use tokio::io::AsyncRead;
use tracing::{debug, warn};

use crate::config::{StorageAppConfig, StorageBackend};

pub use error::StorageError;
pub use path::validate_relative;
pub use signing::UrlSigner;
pub use traits::{FileStorage, UploadedFile};

/// Type alias for a boxed async reader.
pub type BoxReader = Box<dyn AsyncRead + Unpin + Send>;

/// Storage handles built from configuration.
///
/// `local` is set only for the filesystem backend, whose signed links are
/// served by this process.
pub struct StorageHandles {
    pub files: Arc<dyn FileStorage>,
    pub local: Option<Arc<filesystem::LocalFileStorage>>,
}

/// Build the configured storage backend.
pub async fn build_storage(config: &StorageAppConfig) -> Result<StorageHandles, StorageError> {
    match config.backend {
        StorageBackend::None => {
            warn!("File storage is not configured; uploads will fail");
            Ok(StorageHandles {
                files: Arc::new(unconfigured::UnconfiguredStorage),
                local: None,
            })
        }
        StorageBackend::Filesystem => {
            let key = config
                .signing_key
                .as_deref()
                .filter(|k| !k.is_empty())
                .ok_or_else(|| {
                    StorageError::Backend("storage.signing_key must be set".into())
                })?;
            let local = Arc::new(
                filesystem::LocalFileStorage::new(
                    config.root.clone(),
                    config.public_base_url.clone(),
                    key.as_bytes().to_vec(),
                    config.max_upload_size,
                )
                .await?,
            );
            debug!(root = %config.root.display(), "Filesystem storage ready");
            Ok(StorageHandles {
                files: local.clone(),
                local: Some(local),
            })
        }
        #[cfg(feature = "object-storage")]
        StorageBackend::S3 => {
            let s3_config = config
                .s3
                .as_ref()
                .ok_or_else(|| StorageError::Backend("storage.s3 section is missing".into()))?;
            Ok(StorageHandles {
                files: Arc::new(s3::S3FileStorage::new(s3_config, config.max_upload_size)?),
                local: None,
            })
        }
        #[cfg(not(feature = "object-storage"))]
        StorageBackend::S3 => Err(StorageError::Backend(
            "S3 storage requires the `object-storage` feature".into(),
        )),
    }
}
