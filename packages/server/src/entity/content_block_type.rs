use common::FieldDefinition;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_block_type")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(unique_key = "content_block_type_slug")]
    pub slug: String,

    /// NULL for global default types shared by every organisation.
    #[sea_orm(unique_key = "content_block_type_slug")]
    pub organisation_id: Option<i32>,
    #[sea_orm(belongs_to, from = "organisation_id", to = "id", on_delete = "Cascade")]
    pub organisation: HasOne<super::organisation::Entity>,

    /// Ordered `FieldDefinition` list.
    #[sea_orm(column_type = "JsonBinary")]
    pub fields: serde_json::Value,

    #[sea_orm(default_value = false)]
    pub is_default: bool,

    #[sea_orm(has_many)]
    pub content_blocks: HasMany<super::content_block::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    /// Decode the stored field list. Rows that fail to decode yield no fields.
    pub fn field_definitions(&self) -> Vec<FieldDefinition> {
        serde_json::from_value(self.fields.clone()).unwrap_or_else(|e| {
            tracing::warn!(type_id = self.id, "Undecodable field list: {e}");
            Vec::new()
        })
    }
}

impl ActiveModelBehavior for ActiveModel {}
