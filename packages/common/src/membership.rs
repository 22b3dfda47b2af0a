#[cfg(feature = "sea-orm")]
use sea_orm::prelude::StringLen;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role of a user within an organisation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[cfg_attr(
    feature = "sea-orm",
    derive(sea_orm::DeriveActiveEnum, sea_orm::EnumIter),
    sea_orm(rs_type = "String", db_type = "String(StringLen::None)")
)]
#[serde(rename_all = "lowercase")]
pub enum MembershipRole {
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "owner"))]
    Owner,
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "admin"))]
    Admin,
    /// Needs an explicit permission grant for every action.
    #[cfg_attr(feature = "sea-orm", sea_orm(string_value = "member"))]
    Member,
}

impl MembershipRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        }
    }

    /// Owners and admins bypass per-permission checks.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

impl fmt::Display for MembershipRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MembershipRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(format!("unknown membership role: {other}")),
        }
    }
}

/// Named permissions that can be granted to organisation members.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Permission {
    ContentBlockTypeView,
    ContentBlockTypeCreate,
    ContentBlockTypeUpdate,
    ContentBlockTypeDelete,
    ContentBlockView,
    ContentBlockCreate,
    ContentBlockUpdate,
    ContentBlockDelete,
    PageView,
    PageCreate,
    PageUpdate,
    PageDelete,
    WebsiteView,
    WebsiteCreate,
    WebsiteUpdate,
    IdeaGenerate,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ContentBlockTypeView => "content_block_type:view",
            Self::ContentBlockTypeCreate => "content_block_type:create",
            Self::ContentBlockTypeUpdate => "content_block_type:update",
            Self::ContentBlockTypeDelete => "content_block_type:delete",
            Self::ContentBlockView => "content_block:view",
            Self::ContentBlockCreate => "content_block:create",
            Self::ContentBlockUpdate => "content_block:update",
            Self::ContentBlockDelete => "content_block:delete",
            Self::PageView => "page:view",
            Self::PageCreate => "page:create",
            Self::PageUpdate => "page:update",
            Self::PageDelete => "page:delete",
            Self::WebsiteView => "website:view",
            Self::WebsiteCreate => "website:create",
            Self::WebsiteUpdate => "website:update",
            Self::IdeaGenerate => "idea:generate",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single authorization predicate shared by every resource.
///
/// Owners and admins are always authorized; members need `required` among
/// their granted permissions.
pub fn authorize(role: MembershipRole, granted: &[String], required: Permission) -> bool {
    role.is_privileged() || granted.iter().any(|p| p == required.as_str())
}
