use axum::Json;
use axum::extract::multipart::MultipartError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Permission;
use common::storage::UploadedFile;
use serde_json::Value;
use tracing::instrument;

use crate::content::access::require_permission;
use crate::content::store::{self, BlockChanges, NewBlock, Uploads};
use crate::content::{Content, TypeArena};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::content_block::*;
use crate::state::AppState;
use crate::utils::filename::{upload_field_slug, validate_upload_filename};

/// Multipart overhead allowed on top of the per-file upload limit.
const FORM_OVERHEAD: usize = 1024 * 1024;

pub fn content_block_body_limit(max_upload_size: u64) -> DefaultBodyLimit {
    let files = usize::try_from(max_upload_size).unwrap_or(usize::MAX);
    DefaultBodyLimit::max(files.saturating_add(FORM_OVERHEAD))
}

/// Parts of a content block form. Text parts are `content` (a JSON object),
/// `description`, `website_id` and `content_block_type_id`; uploads are
/// named `files[<field slug>]`.
#[derive(Default)]
struct BlockForm {
    content: Option<Content>,
    description: Option<Option<String>>,
    website_id: Option<i32>,
    content_block_type_id: Option<i32>,
    uploads: Uploads,
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(e.body_text())
    } else {
        AppError::Validation(format!("Multipart error: {}", e.body_text()))
    }
}

fn parse_id(text: &str, name: &str) -> Result<i32, AppError> {
    text.trim()
        .parse()
        .map_err(|_| AppError::Validation(format!("'{name}' must be an integer")))
}

async fn read_block_form(mut multipart: Multipart) -> Result<BlockForm, AppError> {
    let mut form = BlockForm::default();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if let Some(slug) = upload_field_slug(&name) {
            let slug = slug.to_string();
            let filename = field
                .file_name()
                .ok_or_else(|| AppError::Validation(format!("Upload '{slug}' has no filename")))?;
            let filename = validate_upload_filename(filename)
                .map_err(|e| AppError::Validation(e.message().into()))?
                .to_string();
            let content_type = field.content_type().map(str::to_owned);
            let data = field.bytes().await.map_err(multipart_error)?;
            form.uploads.insert(
                slug,
                UploadedFile {
                    filename,
                    content_type,
                    data: data.to_vec(),
                },
            );
            continue;
        }

        let text = field.text().await.map_err(multipart_error)?;
        match name.as_str() {
            "content" => {
                let value: Value = serde_json::from_str(&text)
                    .map_err(|e| AppError::Validation(format!("Invalid content JSON: {e}")))?;
                let Value::Object(map) = value else {
                    return Err(AppError::Validation(
                        "Content must be a JSON object".into(),
                    ));
                };
                form.content = Some(map);
            }
            "description" => {
                let text = text.trim();
                form.description = Some((!text.is_empty()).then(|| text.to_string()));
            }
            "website_id" if !text.trim().is_empty() => {
                form.website_id = Some(parse_id(&text, "website_id")?);
            }
            "content_block_type_id" => {
                form.content_block_type_id = Some(parse_id(&text, "content_block_type_id")?);
            }
            _ => {} // Ignore unknown fields.
        }
    }

    Ok(form)
}

async fn respond_with_urls(
    state: &AppState,
    org_id: i32,
    block: crate::entity::content_block::Model,
) -> Result<ContentBlockResponse, AppError> {
    let arena = TypeArena::load(&state.db, org_id).await?;
    let content = store::read_with_urls(&arena, &*state.storage, state.url_ttl(), &block).await;
    Ok(ContentBlockResponse::new(block, content))
}

#[utoipa::path(
    get,
    path = "/organisations/{org_id}/content-blocks",
    tag = "Content Blocks",
    operation_id = "listContentBlocks",
    summary = "List content blocks",
    description = "Returns the organisation's blocks with signed `<slug>_url` links for file \
        fields. Filter by `website_id` or by `scope` (`organisation_wide`, `website_specific`). \
        Requires `content_block:view`.",
    params(
        ("org_id" = i32, Path, description = "Organisation ID"),
        ContentBlockListQuery,
    ),
    responses(
        (status = 200, description = "Blocks", body = ContentBlockListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organisation not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_content_blocks(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(org_id): Path<i32>,
    Query(query): Query<ContentBlockListQuery>,
) -> Result<Json<ContentBlockListResponse>, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockView,
    )
    .await?;

    let blocks = store::list(&state.db, org_id, query.website_id, query.scope).await?;
    let arena = TypeArena::load(&state.db, org_id).await?;

    let paths = blocks
        .iter()
        .flat_map(|b| arena.file_paths(b.content_block_type_id, &store::content_of(b)))
        .collect::<Vec<_>>();
    let urls = store::resolve_urls(&*state.storage, state.url_ttl(), paths).await;

    let data = blocks
        .into_iter()
        .map(|block| {
            let mut content = store::content_of(&block);
            arena.attach_urls(block.content_block_type_id, &mut content, &urls);
            ContentBlockResponse::new(block, content)
        })
        .collect();

    Ok(Json(ContentBlockListResponse { data }))
}

#[utoipa::path(
    post,
    path = "/organisations/{org_id}/content-blocks",
    tag = "Content Blocks",
    operation_id = "createContentBlock",
    summary = "Create a content block",
    description = "Multipart form with `content_block_type_id`, `content` (JSON object keyed by \
        field slug), optional `description` and `website_id`, and one `files[<slug>]` part per \
        file field. Uploaded files are stored and their paths written into the content. \
        Requires `content_block:create`.",
    params(("org_id" = i32, Path, description = "Organisation ID")),
    request_body(content_type = "multipart/form-data", description = "Block fields and uploads"),
    responses(
        (status = 201, description = "Block created", body = ContentBlockResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Organisation not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "Upload too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 422, description = "Unknown type or foreign website (UNRESOLVABLE_TYPE, CROSS_ORGANISATION_REFERENCE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn create_content_block(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(org_id): Path<i32>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockCreate,
    )
    .await?;

    let form = read_block_form(multipart).await?;
    let content_block_type_id = form
        .content_block_type_id
        .ok_or_else(|| AppError::Validation("Missing 'content_block_type_id' field".into()))?;

    let block = store::create(
        &state.db,
        &*state.storage,
        org_id,
        NewBlock {
            content_block_type_id,
            website_id: form.website_id,
            description: form.description.flatten(),
            content: form.content.unwrap_or_default(),
            uploads: form.uploads,
        },
    )
    .await?;

    let response = respond_with_urls(&state, org_id, block).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/organisations/{org_id}/content-blocks/{id}",
    tag = "Content Blocks",
    operation_id = "getContentBlock",
    summary = "Get a content block",
    description = "Returns the block with a signed `<slug>_url` next to every file field, \
        nested blocks included. Requires `content_block:view`.",
    params(
        ("org_id" = i32, Path, description = "Organisation ID"),
        ("id" = i32, Path, description = "Content block ID"),
    ),
    responses(
        (status = 200, description = "Block", body = ContentBlockResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Block not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_content_block(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<Json<ContentBlockResponse>, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockView,
    )
    .await?;

    let block = store::find_for_organisation(&state.db, org_id, id).await?;
    Ok(Json(respond_with_urls(&state, org_id, block).await?))
}

#[utoipa::path(
    patch,
    path = "/organisations/{org_id}/content-blocks/{id}",
    tag = "Content Blocks",
    operation_id = "updateContentBlock",
    summary = "Update a content block",
    description = "Multipart form as for creation; every part is optional. File fields left out \
        of `content` keep their stored file, `null` clears it, and a `files[<slug>]` part \
        replaces it. Replaced and cleared files are deleted. Requires `content_block:update`.",
    params(
        ("org_id" = i32, Path, description = "Organisation ID"),
        ("id" = i32, Path, description = "Content block ID"),
    ),
    request_body(content_type = "multipart/form-data", description = "Changed fields and uploads"),
    responses(
        (status = 200, description = "Block updated", body = ContentBlockResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Block not found (NOT_FOUND)", body = ErrorBody),
        (status = 413, description = "Upload too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
        (status = 422, description = "Block type no longer resolvable (UNRESOLVABLE_TYPE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart))]
pub async fn update_content_block(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((org_id, id)): Path<(i32, i32)>,
    multipart: Multipart,
) -> Result<Json<ContentBlockResponse>, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockUpdate,
    )
    .await?;

    let form = read_block_form(multipart).await?;
    if form.content_block_type_id.is_some() || form.website_id.is_some() {
        return Err(AppError::Validation(
            "A block's type and website cannot be changed".into(),
        ));
    }

    let block = store::update(
        &state.db,
        &*state.storage,
        org_id,
        id,
        BlockChanges {
            content: form.content,
            description: form.description,
            uploads: form.uploads,
        },
    )
    .await?;

    Ok(Json(respond_with_urls(&state, org_id, block).await?))
}

#[utoipa::path(
    delete,
    path = "/organisations/{org_id}/content-blocks/{id}",
    tag = "Content Blocks",
    operation_id = "deleteContentBlock",
    summary = "Delete a content block",
    description = "Deletes the block, detaches it from every page and website and removes its \
        files. Requires `content_block:delete`.",
    params(
        ("org_id" = i32, Path, description = "Organisation ID"),
        ("id" = i32, Path, description = "Content block ID"),
    ),
    responses(
        (status = 204, description = "Block deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Block not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_content_block(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockDelete,
    )
    .await?;

    store::delete(&state.db, &*state.storage, org_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/organisations/{org_id}/content-blocks/{id}/validate",
    tag = "Content Blocks",
    operation_id = "validateContentBlock",
    summary = "Check required fields",
    description = "Reports whether every required field of the block's type has a non-null \
        value. Blocks whose type cannot be resolved never validate. \
        Requires `content_block:view`.",
    params(
        ("org_id" = i32, Path, description = "Organisation ID"),
        ("id" = i32, Path, description = "Content block ID"),
    ),
    responses(
        (status = 200, description = "Validation result", body = ValidateContentBlockResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Block not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn validate_content_block(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((org_id, id)): Path<(i32, i32)>,
) -> Result<Json<ValidateContentBlockResponse>, AppError> {
    require_permission(
        &state.db,
        auth_user.user_id,
        org_id,
        Permission::ContentBlockView,
    )
    .await?;

    let block = store::find_for_organisation(&state.db, org_id, id).await?;
    let arena = TypeArena::load(&state.db, org_id).await?;
    Ok(Json(ValidateContentBlockResponse {
        valid: store::validate(&arena, &block),
    }))
}
