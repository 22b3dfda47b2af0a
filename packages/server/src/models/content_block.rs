use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::content::Content;
use crate::content::store::BlockScope;
use crate::entity::content_block;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContentBlockResponse {
    pub id: i32,
    pub content_block_type_id: i32,
    pub organisation_id: i32,
    /// `null` for organisation-wide blocks.
    pub website_id: Option<i32>,
    pub description: Option<String>,
    /// Field values keyed by slug. File fields carry a stored path plus a
    /// read-only `<slug>_url` companion.
    #[schema(value_type = Object)]
    pub content: Content,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentBlockResponse {
    pub fn new(block: content_block::Model, content: Content) -> Self {
        Self {
            id: block.id,
            content_block_type_id: block.content_block_type_id,
            organisation_id: block.organisation_id,
            website_id: block.website_id,
            description: block.description,
            content,
            created_at: block.created_at,
            updated_at: block.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContentBlockListResponse {
    pub data: Vec<ContentBlockResponse>,
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ContentBlockListQuery {
    /// Only blocks specific to this website.
    pub website_id: Option<i32>,
    pub scope: Option<BlockScope>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidateContentBlockResponse {
    /// Whether every required field has a value.
    pub valid: bool,
}
