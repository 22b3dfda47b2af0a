//! Client for the external page-ideas service.
//!
//! The service suggests page titles and descriptions for a website. It is
//! reached over HTTP with a bounded timeout; every failure (transport,
//! non-2xx status, malformed body) is reported as an [`IdeasError`] and never
//! retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::IdeasConfig;

#[derive(Debug, Error)]
pub enum IdeasError {
    #[error("ideas service is not configured")]
    Disabled,
    #[error("ideas request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("ideas service returned HTTP {0}")]
    Status(u16),
    #[error("ideas service returned an unreadable body: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct IdeasRequest {
    /// Website name the ideas are for.
    pub website: String,
    pub prompt: String,
    pub count: u32,
}

/// One suggested page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, utoipa::ToSchema)]
pub struct PageIdea {
    #[schema(example = "Meet the team")]
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize)]
struct IdeasResponse {
    ideas: Vec<PageIdea>,
}

#[async_trait]
pub trait IdeasClient: Send + Sync {
    async fn generate(&self, request: &IdeasRequest) -> Result<Vec<PageIdea>, IdeasError>;
}

pub struct HttpIdeasClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpIdeasClient {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, IdeasError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/ideas", base_url.trim_end_matches('/')),
            api_key,
        })
    }
}

#[async_trait]
impl IdeasClient for HttpIdeasClient {
    async fn generate(&self, request: &IdeasRequest) -> Result<Vec<PageIdea>, IdeasError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(IdeasError::Status(status.as_u16()));
        }

        let body: IdeasResponse = response
            .json()
            .await
            .map_err(|e| IdeasError::Decode(e.to_string()))?;
        Ok(body.ideas)
    }
}

/// Used when no `ideas.base_url` is configured.
pub struct DisabledIdeasClient;

#[async_trait]
impl IdeasClient for DisabledIdeasClient {
    async fn generate(&self, _request: &IdeasRequest) -> Result<Vec<PageIdea>, IdeasError> {
        Err(IdeasError::Disabled)
    }
}

/// Build the ideas client described by `config`.
pub fn build_client(config: &IdeasConfig) -> Result<Arc<dyn IdeasClient>, IdeasError> {
    match config.base_url.as_deref().filter(|u| !u.is_empty()) {
        Some(base_url) => Ok(Arc::new(HttpIdeasClient::new(
            base_url,
            config.api_key.clone(),
            Duration::from_secs(config.timeout_secs),
        )?)),
        None => Ok(Arc::new(DisabledIdeasClient)),
    }
}
