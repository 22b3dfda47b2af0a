use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Permission;
use tracing::instrument;

use crate::content::access::{require_permission, require_website_permission};
use crate::content::composition::{self, NewWebsite};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::website::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/organisations/{org_id}/websites",
    tag = "Websites",
    operation_id = "createWebsite",
    summary = "Create a website",
    description = "Requires `website:create`.",
    params(("org_id" = i32, Path, description = "Organisation ID")),
    request_body = CreateWebsiteRequest,
    responses(
        (status = 201, description = "Website created", body = WebsiteResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organisation not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_website(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(org_id): Path<i32>,
    AppJson(payload): AppJson<CreateWebsiteRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_permission(&state.db, auth_user.user_id, org_id, Permission::WebsiteCreate).await?;

    let model = composition::create_website(
        &state.db,
        org_id,
        NewWebsite {
            name: payload.name,
            domain: payload.domain,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(WebsiteResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/organisations/{org_id}/websites",
    tag = "Websites",
    operation_id = "listWebsites",
    summary = "List websites",
    description = "Requires `website:view`.",
    params(("org_id" = i32, Path, description = "Organisation ID")),
    responses(
        (status = 200, description = "Websites", body = WebsiteListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organisation not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_websites(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(org_id): Path<i32>,
) -> Result<Json<WebsiteListResponse>, AppError> {
    require_permission(&state.db, auth_user.user_id, org_id, Permission::WebsiteView).await?;

    let sites = composition::list_websites(&state.db, org_id).await?;
    Ok(Json(WebsiteListResponse {
        data: sites.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    get,
    path = "/websites/{website_id}",
    tag = "Websites",
    operation_id = "getWebsite",
    summary = "Get a website",
    description = "Requires `website:view` in the owning organisation.",
    params(("website_id" = i32, Path, description = "Website ID")),
    responses(
        (status = 200, description = "Website", body = WebsiteResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Website not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_website(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(website_id): Path<i32>,
) -> Result<Json<WebsiteResponse>, AppError> {
    let site = require_website_permission(
        &state.db,
        auth_user.user_id,
        website_id,
        Permission::WebsiteView,
    )
    .await?;
    Ok(Json(site.into()))
}
