use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Permission;
use tracing::instrument;

use crate::content::access::require_permission;
use crate::content::registry::{self, BlockTypeChanges, NewBlockType};
use crate::content::ContentError;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::content_block_type::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/organisations/{org_id}/content-block-types",
    tag = "Content Block Types",
    operation_id = "listContentBlockTypes",
    summary = "List content block types",
    description = "Returns the organisation's own types together with the global default types, \
        ordered by name. Requires `content_block_type:view`.",
    params(("org_id" = i32, Path, description = "Organisation ID")),
    responses(
        (status = 200, description = "Visible types", body = ContentBlockTypeListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organisation not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_content_block_types(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(org_id): Path<i32>,
) -> Result<Json<ContentBlockTypeListResponse>, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockTypeView,
    )
    .await?;

    let types = registry::organisation_types(&state.db, org_id).await?;
    Ok(Json(ContentBlockTypeListResponse {
        data: types.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/organisations/{org_id}/content-block-types",
    tag = "Content Block Types",
    operation_id = "createContentBlockType",
    summary = "Create a content block type",
    description = "Validates every field definition, derives the slug from the name and stores \
        the type. A field `type` that is not a core token must be the id of another type owned \
        by the same organisation; it becomes a `content_block_array` reference. The first \
        invalid field aborts the request. Requires `content_block_type:create`.",
    params(("org_id" = i32, Path, description = "Organisation ID")),
    request_body = CreateContentBlockTypeRequest,
    responses(
        (status = 201, description = "Type created", body = ContentBlockTypeResponse),
        (status = 400, description = "Invalid field schema (VALIDATION_ERROR, MISSING_LABEL, MISSING_TYPE, INVALID_FIELD_TYPE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organisation not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already used (DUPLICATE_SLUG)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_content_block_type(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(org_id): Path<i32>,
    AppJson(payload): AppJson<CreateContentBlockTypeRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockTypeCreate,
    )
    .await?;

    let model = registry::create(
        &state.db,
        org_id,
        NewBlockType {
            name: payload.name,
            fields: payload.fields,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(ContentBlockTypeResponse::from(model)),
    ))
}

#[utoipa::path(
    get,
    path = "/organisations/{org_id}/content-block-types/array-options",
    tag = "Content Block Types",
    operation_id = "listArrayFieldOptions",
    summary = "List nesting targets",
    description = "Returns `{label, id}` pairs for the organisation's own types, for pickers \
        that nest one type inside another. Global default types are not offered. \
        Requires `content_block_type:view`.",
    params(("org_id" = i32, Path, description = "Organisation ID")),
    responses(
        (status = 200, description = "Nesting targets", body = ArrayFieldOptionsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organisation not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_array_field_options(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(org_id): Path<i32>,
) -> Result<Json<ArrayFieldOptionsResponse>, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockTypeView,
    )
    .await?;

    let data = registry::array_field_options(&state.db, org_id).await?;
    Ok(Json(ArrayFieldOptionsResponse { data }))
}

#[utoipa::path(
    get,
    path = "/organisations/{org_id}/content-block-types/{id}",
    tag = "Content Block Types",
    operation_id = "getContentBlockType",
    summary = "Get a content block type",
    description = "Returns an organisation-owned or global default type. \
        Requires `content_block_type:view`.",
    params(
        ("org_id" = i32, Path, description = "Organisation ID"),
        ("id" = i32, Path, description = "Content block type ID"),
    ),
    responses(
        (status = 200, description = "Type", body = ContentBlockTypeResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Type not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_content_block_type(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<Json<ContentBlockTypeResponse>, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockTypeView,
    )
    .await?;

    let model = registry::find_visible(&state.db, org_id, id)
        .await
        .map_err(|e| match e {
            ContentError::UnresolvableType(_) => {
                AppError::NotFound("Content block type not found".into())
            }
            other => other.into(),
        })?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    patch,
    path = "/organisations/{org_id}/content-block-types/{id}",
    tag = "Content Block Types",
    operation_id = "updateContentBlockType",
    summary = "Update a content block type",
    description = "Renaming derives a new slug. Supplied fields replace the stored ones and are \
        all validated again against the organisation's current types. Global default types \
        cannot be edited. Requires `content_block_type:update`.",
    params(
        ("org_id" = i32, Path, description = "Organisation ID"),
        ("id" = i32, Path, description = "Content block type ID"),
    ),
    request_body = UpdateContentBlockTypeRequest,
    responses(
        (status = 200, description = "Type updated", body = ContentBlockTypeResponse),
        (status = 400, description = "Invalid field schema (VALIDATION_ERROR, MISSING_LABEL, MISSING_TYPE, INVALID_FIELD_TYPE)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Type not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already used (DUPLICATE_SLUG)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_content_block_type(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((org_id, id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdateContentBlockTypeRequest>,
) -> Result<Json<ContentBlockTypeResponse>, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockTypeUpdate,
    )
    .await?;

    let model = registry::update(
        &state.db,
        org_id,
        id,
        BlockTypeChanges {
            name: payload.name,
            fields: payload.fields,
        },
    )
    .await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/organisations/{org_id}/content-block-types/{id}",
    tag = "Content Block Types",
    operation_id = "deleteContentBlockType",
    summary = "Delete a content block type",
    description = "Deletes the type, its content blocks and their page and global attachments. \
        Files referenced by the deleted blocks are removed afterwards. \
        Requires `content_block_type:delete`.",
    params(
        ("org_id" = i32, Path, description = "Organisation ID"),
        ("id" = i32, Path, description = "Content block type ID"),
    ),
    responses(
        (status = 204, description = "Type deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Type not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_content_block_type(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockTypeDelete,
    )
    .await?;

    registry::delete(&state.db, &*state.storage, org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
