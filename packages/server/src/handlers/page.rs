use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use common::Permission;
use tracing::instrument;

use crate::content::access::require_website_permission;
use crate::content::composition::{self, NewPage, PageChanges};
use crate::content::render::{self, RenderedPage};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::{AppJson, OptionalJson};
use crate::models::page::*;
use crate::models::shared::validate_optional_order;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/websites/{website_id}/pages",
    tag = "Pages",
    operation_id = "listPages",
    summary = "List a website's pages",
    description = "Requires `page:view`.",
    params(("website_id" = i32, Path, description = "Website ID")),
    responses(
        (status = 200, description = "Pages", body = PageListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Website not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_pages(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(website_id): Path<i32>,
) -> Result<Json<PageListResponse>, AppError> {
    require_website_permission(&state.db, auth_user.user_id, website_id, Permission::PageView)
        .await?;

    let pages = composition::list_pages(&state.db, website_id).await?;
    Ok(Json(PageListResponse {
        data: pages.into_iter().map(Into::into).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/websites/{website_id}/pages",
    tag = "Pages",
    operation_id = "createPage",
    summary = "Create a page",
    description = "The slug defaults to the slugified title and must be unique within the \
        website. Requires `page:create`.",
    params(("website_id" = i32, Path, description = "Website ID")),
    request_body = CreatePageRequest,
    responses(
        (status = 201, description = "Page created", body = PageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Website not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already used (DUPLICATE_SLUG)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(title = %payload.title))]
pub async fn create_page(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(website_id): Path<i32>,
    AppJson(payload): AppJson<CreatePageRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_website_permission(
        &state.db,
        auth_user.user_id,
        website_id,
        Permission::PageCreate,
    )
    .await?;

    let model = composition::create_page(
        &state.db,
        website_id,
        NewPage {
            title: payload.title,
            slug: payload.slug,
            description: payload.description,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(PageResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/websites/{website_id}/pages/{page_id}",
    tag = "Pages",
    operation_id = "getPage",
    summary = "Render a page",
    description = "Returns the page with its attached blocks in display order. Each block is \
        `{id, type, content}` with signed file links. Requires `page:view`.",
    params(
        ("website_id" = i32, Path, description = "Website ID"),
        ("page_id" = i32, Path, description = "Page ID"),
    ),
    responses(
        (status = 200, description = "Rendered page", body = RenderedPage),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Page not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn get_page(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((website_id, page_id)): Path<(i32, i32)>,
) -> Result<Json<RenderedPage>, AppError> {
    let site = require_website_permission(
        &state.db,
        auth_user.user_id,
        website_id,
        Permission::PageView,
    )
    .await?;

    let page = composition::find_page(&state.db, website_id, page_id).await?;
    let rendered =
        render::render_page(&state.db, &*state.storage, state.url_ttl(), &site, page).await?;
    Ok(Json(rendered))
}

#[utoipa::path(
    patch,
    path = "/websites/{website_id}/pages/{page_id}",
    tag = "Pages",
    operation_id = "updatePage",
    summary = "Update a page",
    description = "A new title derives a new slug unless one is given. Requires `page:update`.",
    params(
        ("website_id" = i32, Path, description = "Website ID"),
        ("page_id" = i32, Path, description = "Page ID"),
    ),
    request_body = UpdatePageRequest,
    responses(
        (status = 200, description = "Page updated", body = PageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Page not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Slug already used (DUPLICATE_SLUG)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn update_page(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((website_id, page_id)): Path<(i32, i32)>,
    AppJson(payload): AppJson<UpdatePageRequest>,
) -> Result<Json<PageResponse>, AppError> {
    require_website_permission(
        &state.db,
        auth_user.user_id,
        website_id,
        Permission::PageUpdate,
    )
    .await?;

    let model = composition::update_page(
        &state.db,
        website_id,
        page_id,
        PageChanges {
            title: payload.title,
            slug: payload.slug,
            description: payload.description,
        },
    )
    .await?;

    Ok(Json(model.into()))
}

#[utoipa::path(
    delete,
    path = "/websites/{website_id}/pages/{page_id}",
    tag = "Pages",
    operation_id = "deletePage",
    summary = "Delete a page",
    description = "Deletes the page and its block attachments; the blocks themselves remain. \
        Requires `page:delete`.",
    params(
        ("website_id" = i32, Path, description = "Website ID"),
        ("page_id" = i32, Path, description = "Page ID"),
    ),
    responses(
        (status = 204, description = "Page deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Page not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn delete_page(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((website_id, page_id)): Path<(i32, i32)>,
) -> Result<StatusCode, AppError> {
    require_website_permission(
        &state.db,
        auth_user.user_id,
        website_id,
        Permission::PageDelete,
    )
    .await?;

    composition::delete_page(&state.db, website_id, page_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    post,
    path = "/websites/{website_id}/pages/{page_id}/content-blocks/{block_id}",
    tag = "Pages",
    operation_id = "attachContentBlock",
    summary = "Attach a content block to a page",
    description = "Without an `order` the block goes after the page's last block. Attaching the \
        same block twice creates two attachments. The block must belong to the website's \
        organisation and, if website-specific, to this website. Requires `page:update`.",
    params(
        ("website_id" = i32, Path, description = "Website ID"),
        ("page_id" = i32, Path, description = "Page ID"),
        ("block_id" = i32, Path, description = "Content block ID"),
    ),
    request_body = AttachContentBlockRequest,
    responses(
        (status = 201, description = "Block attached", body = PageContentBlockResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Page or block not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Block of another organisation (CROSS_ORGANISATION_REFERENCE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload))]
pub async fn attach_content_block(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((website_id, page_id, block_id)): Path<(i32, i32, i32)>,
    OptionalJson(payload): OptionalJson<AttachContentBlockRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_website_permission(
        &state.db,
        auth_user.user_id,
        website_id,
        Permission::PageUpdate,
    )
    .await?;

    let order = payload.order;
    validate_optional_order(order)?;

    let link =
        composition::attach_content_block(&state.db, website_id, page_id, block_id, order)
            .await?;
    Ok((
        StatusCode::CREATED,
        Json(PageContentBlockResponse::from(link)),
    ))
}

#[utoipa::path(
    delete,
    path = "/websites/{website_id}/pages/{page_id}/content-blocks/{block_id}",
    tag = "Pages",
    operation_id = "detachContentBlock",
    summary = "Detach a content block from a page",
    description = "Removes every attachment of the block to the page. Requires `page:update`.",
    params(
        ("website_id" = i32, Path, description = "Website ID"),
        ("page_id" = i32, Path, description = "Page ID"),
        ("block_id" = i32, Path, description = "Content block ID"),
    ),
    responses(
        (status = 204, description = "Block detached"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Page or attachment not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn detach_content_block(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path((website_id, page_id, block_id)): Path<(i32, i32, i32)>,
) -> Result<StatusCode, AppError> {
    require_website_permission(
        &state.db,
        auth_user.user_id,
        website_id,
        Permission::PageUpdate,
    )
    .await?;

    composition::detach_content_block(&state.db, website_id, page_id, block_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/websites/{website_id}/global-content-blocks",
    tag = "Pages",
    operation_id = "listGlobalContentBlocks",
    summary = "List a website's global blocks",
    description = "Global blocks are shown on every page of the website (headers, footers). \
        Returned rendered as `{id, type, content}`. Requires `page:view`.",
    params(("website_id" = i32, Path, description = "Website ID")),
    responses(
        (status = 200, description = "Global blocks", body = GlobalBlocksResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Website not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_global_blocks(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(website_id): Path<i32>,
) -> Result<Json<GlobalBlocksResponse>, AppError> {
    let site = require_website_permission(
        &state.db,
        auth_user.user_id,
        website_id,
        Permission::PageView,
    )
    .await?;

    let blocks = composition::global_blocks(&state.db, website_id).await?;
    let arena = crate::content::TypeArena::load(&state.db, site.organisation_id).await?;
    let content_blocks =
        render::render_blocks(&arena, &*state.storage, state.url_ttl(), &blocks).await;
    Ok(Json(GlobalBlocksResponse { content_blocks }))
}

#[utoipa::path(
    put,
    path = "/websites/{website_id}/global-content-blocks",
    tag = "Pages",
    operation_id = "replaceGlobalContentBlocks",
    summary = "Replace a website's global blocks",
    description = "Replaces the whole set in one transaction. If any block belongs to another \
        organisation nothing changes. Requires `website:update`.",
    params(("website_id" = i32, Path, description = "Website ID")),
    request_body = ReplaceGlobalBlocksRequest,
    responses(
        (status = 200, description = "New global blocks", body = GlobalBlocksResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Website or block not found (NOT_FOUND)", body = ErrorBody),
        (status = 422, description = "Block of another organisation (CROSS_ORGANISATION_REFERENCE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(count = payload.content_block_ids.len()))]
pub async fn replace_global_blocks(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(website_id): Path<i32>,
    AppJson(payload): AppJson<ReplaceGlobalBlocksRequest>,
) -> Result<Json<GlobalBlocksResponse>, AppError> {
    let site = require_website_permission(
        &state.db,
        auth_user.user_id,
        website_id,
        Permission::WebsiteUpdate,
    )
    .await?;

    composition::replace_global_blocks(&state.db, website_id, &payload.content_block_ids).await?;

    let blocks = composition::global_blocks(&state.db, website_id).await?;
    let arena = crate::content::TypeArena::load(&state.db, site.organisation_id).await?;
    let content_blocks =
        render::render_blocks(&arena, &*state.storage, state.url_ttl(), &blocks).await;
    Ok(Json(GlobalBlocksResponse { content_blocks }))
}
