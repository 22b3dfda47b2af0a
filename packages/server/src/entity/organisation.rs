use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Tenant owning websites, content block types and content blocks.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organisation")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    #[sea_orm(unique)]
    pub slug: String,

    #[sea_orm(has_many)]
    pub memberships: HasMany<super::membership::Entity>,

    #[sea_orm(has_many)]
    pub websites: HasMany<super::website::Entity>,

    #[sea_orm(has_many)]
    pub content_block_types: HasMany<super::content_block_type::Entity>,

    #[sea_orm(has_many)]
    pub content_blocks: HasMany<super::content_block::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
