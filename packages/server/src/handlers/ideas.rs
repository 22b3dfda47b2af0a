use axum::Json;
use axum::extract::{Path, State};
use common::Permission;
use tracing::instrument;

use crate::content::access::require_website_permission;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::ideas::IdeasRequest;
use crate::models::ideas::*;
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/websites/{website_id}/ideas",
    tag = "Ideas",
    operation_id = "generatePageIdeas",
    summary = "Suggest page ideas",
    description = "Asks the external ideas service for page suggestions for the website. \
        Fails with `UPSTREAM_ERROR` when the service is not configured, errors, or does not \
        answer within the configured timeout. Requires `idea:generate`.",
    params(("website_id" = i32, Path, description = "Website ID")),
    request_body = GenerateIdeasRequest,
    responses(
        (status = 200, description = "Suggestions", body = IdeasResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Website not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Ideas service failed (UPSTREAM_ERROR)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn generate_ideas(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(website_id): Path<i32>,
    AppJson(payload): AppJson<GenerateIdeasRequest>,
) -> Result<Json<IdeasResponse>, AppError> {
    let site = require_website_permission(
        &state.db,
        auth_user.user_id,
        website_id,
        Permission::IdeaGenerate,
    )
    .await?;
    let (prompt, count) = payload.validated()?;

    let ideas = state
        .ideas
        .generate(&IdeasRequest {
            website: site.name,
            prompt,
            count,
        })
        .await?;

    Ok(Json(IdeasResponse { ideas }))
}
