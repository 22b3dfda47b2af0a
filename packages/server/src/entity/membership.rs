use common::MembershipRole;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "membership")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub organisation_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(belongs_to, from = "organisation_id", to = "id", on_delete = "Cascade")]
    pub organisation: HasOne<super::organisation::Entity>,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,

    pub role: MembershipRole,
    /// Permission names granted to a `member`, e.g. `["page:view"]`.
    #[sea_orm(column_type = "JsonBinary")]
    pub permissions: serde_json::Value,

    pub created_at: DateTimeUtc,
}

impl Model {
    /// Granted permission names; malformed entries are ignored.
    pub fn permission_names(&self) -> Vec<String> {
        self.permissions
            .as_array()
            .map(|items| {
                items
                    .iter()
                    .filter_map(|p| p.as_str().map(str::to_string))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl ActiveModelBehavior for ActiveModel {}
