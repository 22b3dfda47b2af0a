use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

/// Which storage backend holds uploaded files.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Local directory; links are signed and served by the API itself.
    #[default]
    Filesystem,
    /// S3-compatible object storage with presigned links.
    S3,
    /// No storage: uploads fail, file URLs resolve to nothing.
    None,
}

/// Connection settings for an S3-compatible bucket.
#[derive(Debug, Deserialize, Clone)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint (e.g. MinIO). Uses the AWS endpoint for `region` when absent.
    pub endpoint: Option<String>,
    pub access_key: String,
    pub secret_key: String,
    #[serde(default)]
    pub path_style: bool,
}

/// App-level file storage configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct StorageAppConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory for the filesystem backend. Default: "./storage".
    #[serde(default = "default_root")]
    pub root: PathBuf,
    /// Base URL under which signed filesystem links are served.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    /// HMAC key for filesystem download links. Required for that backend.
    pub signing_key: Option<String>,
    /// Lifetime of generated file links in minutes. Default: 1440 (24h).
    #[serde(default = "default_url_ttl_minutes")]
    pub url_ttl_minutes: u64,
    /// Maximum size of a single upload in bytes. Default: 32 MB.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size: u64,
    pub s3: Option<S3Config>,
}

fn default_root() -> PathBuf {
    PathBuf::from("./storage")
}
fn default_public_base_url() -> String {
    "http://127.0.0.1:3000/api/v1/files".into()
}
fn default_url_ttl_minutes() -> u64 {
    1440
}
fn default_max_upload_size() -> u64 {
    32 * 1024 * 1024
}

impl Default for StorageAppConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            root: default_root(),
            public_base_url: default_public_base_url(),
            signing_key: None,
            url_ttl_minutes: default_url_ttl_minutes(),
            max_upload_size: default_max_upload_size(),
            s3: None,
        }
    }
}

impl StorageAppConfig {
    /// Lifetime of generated file links. Saturates for absurd settings.
    pub fn url_ttl(&self) -> Duration {
        Duration::from_secs(self.url_ttl_minutes.saturating_mul(60))
    }
}
