use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "page")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub title: String,
    #[sea_orm(unique_key = "page_website_slug")]
    pub slug: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(unique_key = "page_website_slug")]
    pub website_id: i32,
    #[sea_orm(belongs_to, from = "website_id", to = "id", on_delete = "Cascade")]
    pub website: HasOne<super::website::Entity>,

    #[sea_orm(has_many)]
    pub block_links: HasMany<super::page_content_block::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
