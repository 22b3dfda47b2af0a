use std::sync::Arc;
use std::time::Duration;

use common::storage::FileStorage;
use common::storage::filesystem::LocalFileStorage;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::ideas::IdeasClient;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub storage: Arc<dyn FileStorage>,
    /// Set for the filesystem backend, whose signed links this server serves.
    pub local_files: Option<Arc<LocalFileStorage>>,
    pub ideas: Arc<dyn IdeasClient>,
}

impl AppState {
    /// Lifetime of generated file links.
    pub fn url_ttl(&self) -> Duration {
        self.config.storage.url_ttl()
    }
}
