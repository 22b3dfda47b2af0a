use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::shared::double_option;
use crate::content::render::RenderedBlock;
use crate::entity::{page, page_content_block};

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreatePageRequest {
    #[schema(example = "About us")]
    pub title: String,
    /// Derived from the title when omitted.
    pub slug: Option<String>,
    pub description: Option<String>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdatePageRequest {
    pub title: Option<String>,
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PageResponse {
    pub id: i32,
    pub website_id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<page::Model> for PageResponse {
    fn from(m: page::Model) -> Self {
        Self {
            id: m.id,
            website_id: m.website_id,
            title: m.title,
            slug: m.slug,
            description: m.description,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PageListResponse {
    pub data: Vec<PageResponse>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct AttachContentBlockRequest {
    /// Defaults to one past the page's current maximum.
    pub order: Option<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct PageContentBlockResponse {
    pub id: i32,
    pub page_id: i32,
    pub content_block_id: i32,
    pub order: i32,
    pub created_at: DateTime<Utc>,
}

impl From<page_content_block::Model> for PageContentBlockResponse {
    fn from(m: page_content_block::Model) -> Self {
        Self {
            id: m.id,
            page_id: m.page_id,
            content_block_id: m.content_block_id,
            order: m.position,
            created_at: m.created_at,
        }
    }
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct ReplaceGlobalBlocksRequest {
    /// The complete new set; an empty list clears it.
    pub content_block_ids: Vec<i32>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct GlobalBlocksResponse {
    pub content_blocks: Vec<RenderedBlock>,
}
