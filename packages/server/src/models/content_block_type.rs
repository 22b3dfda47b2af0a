use chrono::{DateTime, Utc};
use common::{FieldDefinition, FieldDraft};
use serde::{Deserialize, Serialize};

use crate::entity::content_block_type;

pub use crate::content::registry::ArrayFieldOption;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateContentBlockTypeRequest {
    #[schema(example = "Faq Section")]
    pub name: String,
    /// Field definitions. `type` is a core token or the id of another type
    /// owned by the same organisation.
    #[serde(default)]
    pub fields: Vec<FieldDraft>,
}

#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct UpdateContentBlockTypeRequest {
    pub name: Option<String>,
    /// When present, replaces every field; all are validated again.
    pub fields: Option<Vec<FieldDraft>>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContentBlockTypeResponse {
    pub id: i32,
    #[schema(example = "Faq Section")]
    pub name: String,
    #[schema(example = "faq-section")]
    pub slug: String,
    /// `null` for global default types.
    pub organisation_id: Option<i32>,
    pub fields: Vec<FieldDefinition>,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<content_block_type::Model> for ContentBlockTypeResponse {
    fn from(m: content_block_type::Model) -> Self {
        let fields = m.field_definitions();
        Self {
            id: m.id,
            name: m.name,
            slug: m.slug,
            organisation_id: m.organisation_id,
            fields,
            is_default: m.is_default,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContentBlockTypeListResponse {
    pub data: Vec<ContentBlockTypeResponse>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ArrayFieldOptionsResponse {
    pub data: Vec<ArrayFieldOption>,
}
