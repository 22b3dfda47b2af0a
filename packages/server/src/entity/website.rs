use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "website")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub domain: Option<String>,

    #[sea_orm(indexed)]
    pub organisation_id: i32,
    #[sea_orm(belongs_to, from = "organisation_id", to = "id", on_delete = "Cascade")]
    pub organisation: HasOne<super::organisation::Entity>,

    #[sea_orm(has_many)]
    pub pages: HasMany<super::page::Entity>,

    #[sea_orm(has_many)]
    pub global_content_blocks: HasMany<super::global_content_block::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
