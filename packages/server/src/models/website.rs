use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::website;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateWebsiteRequest {
    #[schema(example = "Marketing site")]
    pub name: String,
    #[schema(example = "example.com")]
    pub domain: Option<String>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct WebsiteResponse {
    pub id: i32,
    pub name: String,
    pub domain: Option<String>,
    pub organisation_id: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<website::Model> for WebsiteResponse {
    fn from(m: website::Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            domain: m.domain,
            organisation_id: m.organisation_id,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct WebsiteListResponse {
    pub data: Vec<WebsiteResponse>,
}
