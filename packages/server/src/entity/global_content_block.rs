use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A content block rendered on every page of a website.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "global_content_block")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(indexed)]
    pub website_id: i32,
    #[sea_orm(belongs_to, from = "website_id", to = "id", on_delete = "Cascade")]
    pub website: HasOne<super::website::Entity>,

    #[sea_orm(indexed)]
    pub content_block_id: i32,
    #[sea_orm(belongs_to, from = "content_block_id", to = "id", on_delete = "Cascade")]
    pub content_block: HasOne<super::content_block::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
