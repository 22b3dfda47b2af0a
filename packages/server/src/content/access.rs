//! Membership-based authorization for organisation resources.
//!
//! Non-members are answered with `NOT_FOUND`, so the existence of other
//! organisations and their websites is never revealed.

use common::{Permission, authorize};
use sea_orm::{ConnectionTrait, EntityTrait};

use crate::entity::{membership, website};
use crate::error::AppError;

/// Membership of `user_id` in the organisation, if any.
pub async fn find_membership<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
    user_id: i32,
) -> Result<Option<membership::Model>, AppError> {
    Ok(membership::Entity::find_by_id((organisation_id, user_id))
        .one(db)
        .await?)
}

/// Require `permission` within an organisation.
pub async fn require_permission<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    organisation_id: i32,
    permission: Permission,
) -> Result<membership::Model, AppError> {
    let member = find_membership(db, organisation_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Organisation not found".into()))?;

    if authorize(member.role, &member.permission_names(), permission) {
        Ok(member)
    } else {
        Err(AppError::PermissionDenied)
    }
}

/// Require `permission` within the organisation owning a website.
pub async fn require_website_permission<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    website_id: i32,
    permission: Permission,
) -> Result<website::Model, AppError> {
    let site = website::Entity::find_by_id(website_id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Website not found".into()))?;

    match require_permission(db, user_id, site.organisation_id, permission).await {
        Ok(_) => Ok(site),
        Err(AppError::NotFound(_)) => Err(AppError::NotFound("Website not found".into())),
        Err(e) => Err(e),
    }
}
