use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Ordered attachment of a content block to a page.
///
/// The same (page, block) pair may appear more than once.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "page_content_block")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub page_id: i32,
    #[sea_orm(belongs_to, from = "page_id", to = "id", on_delete = "Cascade")]
    pub page: HasOne<super::page::Entity>,

    #[sea_orm(indexed)]
    pub content_block_id: i32,
    #[sea_orm(belongs_to, from = "content_block_id", to = "id", on_delete = "Cascade")]
    pub content_block: HasOne<super::content_block::Entity>,

    #[sea_orm(column_name = "order", default_value = 0)]
    pub position: i32,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
