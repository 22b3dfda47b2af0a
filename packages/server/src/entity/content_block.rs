use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "content_block")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub content_block_type_id: i32,
    #[sea_orm(belongs_to, from = "content_block_type_id", to = "id", on_delete = "Cascade")]
    pub content_block_type: HasOne<super::content_block_type::Entity>,

    /// Field values keyed by field slug. File fields hold stored paths.
    #[sea_orm(column_type = "JsonBinary")]
    pub content: serde_json::Value,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(indexed)]
    pub organisation_id: i32,
    #[sea_orm(belongs_to, from = "organisation_id", to = "id", on_delete = "Cascade")]
    pub organisation: HasOne<super::organisation::Entity>,

    /// NULL for organisation-wide blocks.
    pub website_id: Option<i32>,
    #[sea_orm(belongs_to, from = "website_id", to = "id", on_delete = "Cascade")]
    pub website: HasOne<super::website::Entity>,

    #[sea_orm(has_many)]
    pub page_links: HasMany<super::page_content_block::Entity>,

    #[sea_orm(has_many)]
    pub global_links: HasMany<super::global_content_block::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
