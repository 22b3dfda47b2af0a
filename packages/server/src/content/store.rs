//! Content block store: field values, uploads and signed file URLs.
//!
//! Content is a JSON object keyed by field slug. A `file` field holds the
//! opaque path returned by [`FileStorage::upload`]; URLs are derived on read
//! and never written back. Every save diffs incoming file values against the
//! stored ones before persisting:
//!
//! | incoming value for a file field | result                         |
//! |---------------------------------|--------------------------------|
//! | new upload                      | replaced, old file deleted     |
//! | key absent                      | stored path kept               |
//! | `null`                          | cleared, file deleted          |
//! | the stored path                 | kept                           |
//! | any other value                 | ignored, stored path kept      |

use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Duration;

use common::FieldDefinition;
use common::storage::{FileStorage, UploadedFile};
use sea_orm::sea_query::LockType;
use sea_orm::*;
use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use super::ContentError;
use super::arena::{Content, TypeArena, UPLOAD_ROOT, has_required_fields};
use crate::entity::{content_block, global_content_block, page_content_block, website};

/// Raw uploads keyed by the slug of the file field they fill.
pub type Uploads = HashMap<String, UploadedFile>;

pub struct NewBlock {
    pub content_block_type_id: i32,
    /// `None` makes the block organisation-wide.
    pub website_id: Option<i32>,
    pub description: Option<String>,
    pub content: Content,
    pub uploads: Uploads,
}

#[derive(Default)]
pub struct BlockChanges {
    /// `None` keeps the stored content (uploads still apply).
    pub content: Option<Content>,
    pub description: Option<Option<String>>,
    pub uploads: Uploads,
}

/// Coarse visibility filter for block listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum BlockScope {
    OrganisationWide,
    WebsiteSpecific,
}

/// Query-time visibility filters over content blocks.
pub trait ContentBlockScopes: QueryFilter + Sized {
    fn for_organisation(self, organisation_id: i32) -> Self {
        self.filter(content_block::Column::OrganisationId.eq(organisation_id))
    }

    fn for_website(self, website_id: i32) -> Self {
        self.filter(content_block::Column::WebsiteId.eq(website_id))
    }

    fn organisation_wide(self) -> Self {
        self.filter(content_block::Column::WebsiteId.is_null())
    }

    fn website_specific(self) -> Self {
        self.filter(content_block::Column::WebsiteId.is_not_null())
    }
}

impl ContentBlockScopes for Select<content_block::Entity> {}

/// Storage directory for uploads of a given type.
pub fn upload_directory(type_id: i32) -> String {
    format!("{UPLOAD_ROOT}/{type_id}")
}

/// The block's content as a map. Non-object payloads read as empty.
pub fn content_of(block: &content_block::Model) -> Content {
    match &block.content {
        Value::Object(map) => map.clone(),
        _ => Content::new(),
    }
}

pub async fn find_for_organisation<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
    block_id: i32,
) -> Result<content_block::Model, ContentError> {
    content_block::Entity::find_by_id(block_id)
        .for_organisation(organisation_id)
        .one(db)
        .await?
        .ok_or(ContentError::NotFound("Content block"))
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
    website_id: Option<i32>,
    scope: Option<BlockScope>,
) -> Result<Vec<content_block::Model>, DbErr> {
    let mut query = content_block::Entity::find().for_organisation(organisation_id);
    if let Some(website_id) = website_id {
        query = query.for_website(website_id);
    }
    query = match scope {
        Some(BlockScope::OrganisationWide) => query.organisation_wide(),
        Some(BlockScope::WebsiteSpecific) => query.website_specific(),
        None => query,
    };
    query
        .order_by_asc(content_block::Column::Id)
        .all(db)
        .await
}

fn file_fields(fields: &[FieldDefinition]) -> impl Iterator<Item = &FieldDefinition> {
    fields.iter().filter(|f| f.field_type.is_file())
}

fn check_upload_slugs(fields: &[FieldDefinition], uploads: &Uploads) -> Result<(), ContentError> {
    let file_slugs: HashSet<&str> = file_fields(fields).map(|f| f.slug.as_str()).collect();
    match uploads.keys().find(|slug| !file_slugs.contains(slug.as_str())) {
        Some(slug) => Err(ContentError::Validation(format!(
            "'{slug}' is not a file field of this content block type"
        ))),
        None => Ok(()),
    }
}

async fn ensure_website_in_organisation<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
    website_id: i32,
) -> Result<(), ContentError> {
    let site = website::Entity::find_by_id(website_id)
        .one(db)
        .await?
        .ok_or(ContentError::NotFound("Website"))?;
    if site.organisation_id != organisation_id {
        return Err(ContentError::CrossOrganisationReference(format!(
            "Website {website_id}"
        )));
    }
    Ok(())
}

async fn persist_uploads(
    storage: &dyn FileStorage,
    type_id: i32,
    uploads: Uploads,
) -> Result<HashMap<String, String>, ContentError> {
    let directory = upload_directory(type_id);
    let mut stored = HashMap::with_capacity(uploads.len());
    for (slug, file) in uploads {
        match storage.upload(&file, &directory).await {
            Ok(path) => {
                stored.insert(slug, path);
            }
            Err(e) => {
                discard_files(storage, stored.values()).await;
                return Err(e.into());
            }
        }
    }
    Ok(stored)
}

/// Best-effort removal; failures are logged and swallowed.
pub(crate) async fn discard_files<'a>(
    storage: &dyn FileStorage,
    paths: impl IntoIterator<Item = &'a String>,
) {
    for path in paths {
        if let Err(e) = storage.delete(path).await {
            warn!(path = %path, "Failed to delete stored file: {e}");
        }
    }
}

/// Merge client content with the stored content of an existing block.
///
/// `incoming == None` keeps the stored content as-is.
pub fn merge_incoming(
    arena: &TypeArena,
    type_id: i32,
    stored: &Content,
    incoming: Option<Content>,
) -> Content {
    let Some(mut content) = incoming else {
        return stored.clone();
    };
    let Some(ty) = arena.get(type_id) else {
        return content;
    };

    let known: HashSet<String> = arena.file_paths(type_id, stored).into_iter().collect();
    arena.sanitize(type_id, &mut content, &known);

    for field in file_fields(&ty.fields) {
        let previous = stored.get(&field.slug);
        let next = match content.get(&field.slug) {
            None => previous.cloned(),
            Some(Value::Null) => None,
            Some(value) if previous == Some(value) => Some(value.clone()),
            Some(_) => previous.cloned(),
        };
        match next {
            Some(value) => content.insert(field.slug.clone(), value),
            None => content.remove(&field.slug),
        };
    }
    content
}

/// Create a block of a type visible to the organisation.
pub async fn create(
    db: &DatabaseConnection,
    storage: &dyn FileStorage,
    organisation_id: i32,
    input: NewBlock,
) -> Result<content_block::Model, ContentError> {
    let type_id = input.content_block_type_id;
    let arena = TypeArena::load(db, organisation_id).await?;
    let ty = arena
        .get(type_id)
        .ok_or(ContentError::UnresolvableType(type_id))?;
    if let Some(website_id) = input.website_id {
        ensure_website_in_organisation(db, organisation_id, website_id).await?;
    }
    check_upload_slugs(&ty.fields, &input.uploads)?;

    // A new block owns no files yet, so no client-supplied path is trusted.
    let mut content = input.content;
    arena.sanitize(type_id, &mut content, &HashSet::new());
    for field in file_fields(&ty.fields) {
        content.remove(&field.slug);
    }

    let uploaded = persist_uploads(storage, type_id, input.uploads).await?;
    for (slug, path) in &uploaded {
        content.insert(slug.clone(), Value::String(path.clone()));
    }

    let now = chrono::Utc::now();
    let result = content_block::ActiveModel {
        content_block_type_id: Set(type_id),
        content: Set(Value::Object(content)),
        description: Set(input.description),
        organisation_id: Set(organisation_id),
        website_id: Set(input.website_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await;

    match result {
        Ok(model) => {
            info!(block_id = model.id, type_id, "Created content block");
            Ok(model)
        }
        Err(e) => {
            discard_files(storage, uploaded.values()).await;
            Err(e.into())
        }
    }
}

/// Update a block, diffing file fields against the stored content.
///
/// Uploads are stored first; the merge and write then happen against the
/// block row locked in one transaction. Files the block no longer references
/// are deleted after commit.
pub async fn update(
    db: &DatabaseConnection,
    storage: &dyn FileStorage,
    organisation_id: i32,
    block_id: i32,
    changes: BlockChanges,
) -> Result<content_block::Model, ContentError> {
    let arena = TypeArena::load(db, organisation_id).await?;
    let block = find_for_organisation(db, organisation_id, block_id).await?;
    let type_id = block.content_block_type_id;
    let ty = arena
        .get(type_id)
        .ok_or(ContentError::UnresolvableType(type_id))?;
    check_upload_slugs(&ty.fields, &changes.uploads)?;

    let uploaded = persist_uploads(storage, type_id, changes.uploads).await?;
    let saved = write_locked(
        db,
        &arena,
        organisation_id,
        block_id,
        changes.content,
        changes.description,
        &uploaded,
    )
    .await;

    match saved {
        Ok((model, stale)) => {
            discard_files(storage, &stale).await;
            Ok(model)
        }
        Err(e) => {
            discard_files(storage, uploaded.values()).await;
            Err(e)
        }
    }
}

/// Merge and persist under `SELECT ... FOR UPDATE`. Returns the saved block
/// and the stored paths it stopped referencing.
async fn write_locked(
    db: &DatabaseConnection,
    arena: &TypeArena,
    organisation_id: i32,
    block_id: i32,
    incoming: Option<Content>,
    description: Option<Option<String>>,
    uploaded: &HashMap<String, String>,
) -> Result<(content_block::Model, BTreeSet<String>), ContentError> {
    let txn = db.begin().await?;
    let block = content_block::Entity::find_by_id(block_id)
        .for_organisation(organisation_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(ContentError::NotFound("Content block"))?;
    let type_id = block.content_block_type_id;

    let stored = content_of(&block);
    let old_paths = arena.file_paths(type_id, &stored);
    let mut content = merge_incoming(arena, type_id, &stored, incoming);
    for (slug, path) in uploaded {
        content.insert(slug.clone(), Value::String(path.clone()));
    }
    let new_paths = arena.file_paths(type_id, &content);

    let mut active: content_block::ActiveModel = block.into();
    active.content = Set(Value::Object(content));
    if let Some(description) = description {
        active.description = Set(description);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    let stale = old_paths.difference(&new_paths).cloned().collect();
    Ok((model, stale))
}

/// Delete a block and its page/global attachments.
pub async fn delete(
    db: &DatabaseConnection,
    storage: &dyn FileStorage,
    organisation_id: i32,
    block_id: i32,
) -> Result<(), ContentError> {
    let arena = TypeArena::load(db, organisation_id).await?;

    let txn = db.begin().await?;
    let block = content_block::Entity::find_by_id(block_id)
        .for_organisation(organisation_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(ContentError::NotFound("Content block"))?;

    page_content_block::Entity::delete_many()
        .filter(page_content_block::Column::ContentBlockId.eq(block_id))
        .exec(&txn)
        .await?;
    global_content_block::Entity::delete_many()
        .filter(global_content_block::Column::ContentBlockId.eq(block_id))
        .exec(&txn)
        .await?;
    content_block::Entity::delete_by_id(block_id)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    let paths = arena.file_paths(block.content_block_type_id, &content_of(&block));
    discard_files(storage, &paths).await;
    Ok(())
}

/// Sign each distinct path once. Signing failures yield `None`.
pub async fn resolve_urls(
    storage: &dyn FileStorage,
    ttl: Duration,
    paths: impl IntoIterator<Item = String>,
) -> HashMap<String, Option<String>> {
    let mut urls = HashMap::new();
    for path in paths {
        if urls.contains_key(&path) {
            continue;
        }
        let url = match storage.temporary_url(&path, ttl).await {
            Ok(url) => url,
            Err(e) => {
                warn!(path = %path, "Could not sign file URL: {e}");
                None
            }
        };
        urls.insert(path, url);
    }
    urls
}

/// The block's content with a `<slug>_url` added for every file field.
///
/// Blocks whose type is not in `arena` are returned unmodified.
pub async fn read_with_urls(
    arena: &TypeArena,
    storage: &dyn FileStorage,
    ttl: Duration,
    block: &content_block::Model,
) -> Content {
    let type_id = block.content_block_type_id;
    let mut content = content_of(block);
    if !arena.contains(type_id) {
        return content;
    }
    let urls = resolve_urls(storage, ttl, arena.file_paths(type_id, &content)).await;
    arena.attach_urls(type_id, &mut content, &urls);
    content
}

/// Whether every required field of the block's type is filled.
///
/// Unresolvable types never validate.
pub fn validate(arena: &TypeArena, block: &content_block::Model) -> bool {
    match arena.get(block.content_block_type_id) {
        Some(ty) => has_required_fields(&ty.fields, &content_of(block)),
        None => false,
    }
}
