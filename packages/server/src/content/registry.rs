//! Content block type registry: per-organisation field schemas.

use std::collections::HashSet;

use common::storage::FileStorage;
use common::{FieldDefinition, FieldDraft, slugify};
use sea_orm::sea_query::{Condition, LockType};
use sea_orm::*;
use serde::Serialize;
use tracing::{info, warn};

use super::ContentError;
use super::arena::{Content, TypeArena};
use crate::entity::{content_block, content_block_type, global_content_block, page_content_block};

const MAX_NAME_CHARS: usize = 255;

pub struct NewBlockType {
    pub name: String,
    pub fields: Vec<FieldDraft>,
}

#[derive(Default)]
pub struct BlockTypeChanges {
    pub name: Option<String>,
    pub fields: Option<Vec<FieldDraft>>,
}

/// Picker entry for fields nesting another type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct ArrayFieldOption {
    #[schema(example = "Nested Faq blocks")]
    pub label: String,
    pub id: i32,
}

/// Filter selecting the types an organisation can see.
fn visible_to(organisation_id: i32) -> Condition {
    Condition::any()
        .add(content_block_type::Column::OrganisationId.eq(organisation_id))
        .add(
            Condition::all()
                .add(content_block_type::Column::OrganisationId.is_null())
                .add(content_block_type::Column::IsDefault.eq(true)),
        )
}

fn normalize_name(name: &str) -> Result<(String, String), ContentError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_CHARS {
        return Err(ContentError::Validation(format!(
            "Name must be 1-{MAX_NAME_CHARS} characters"
        )));
    }
    let slug = slugify(name);
    if slug.is_empty() {
        return Err(ContentError::Validation(
            "Name must contain at least one letter or digit".into(),
        ));
    }
    Ok((name.to_string(), slug))
}

/// Ids of the types owned by the organisation; the legal nesting targets.
pub async fn type_catalog<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
) -> Result<HashSet<i32>, DbErr> {
    let ids = content_block_type::Entity::find()
        .filter(content_block_type::Column::OrganisationId.eq(organisation_id))
        .select_only()
        .column(content_block_type::Column::Id)
        .into_tuple::<i32>()
        .all(db)
        .await?;
    Ok(ids.into_iter().collect())
}

fn validate_drafts(
    drafts: &[FieldDraft],
    catalog: &HashSet<i32>,
) -> Result<serde_json::Value, ContentError> {
    let fields: Vec<FieldDefinition> = common::field::validate_fields(drafts, catalog)?;
    serde_json::to_value(fields).map_err(|e| ContentError::Validation(e.to_string()))
}

async fn ensure_slug_free<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
    slug: &str,
    exclude_id: Option<i32>,
) -> Result<(), ContentError> {
    let mut query = content_block_type::Entity::find()
        .filter(content_block_type::Column::OrganisationId.eq(organisation_id))
        .filter(content_block_type::Column::Slug.eq(slug));
    if let Some(id) = exclude_id {
        query = query.filter(content_block_type::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(ContentError::DuplicateSlug {
            kind: "Content block type",
            slug: slug.to_string(),
        });
    }
    Ok(())
}

/// Create a type owned by `organisation_id`.
///
/// Every field is validated before anything is written; the first invalid
/// field aborts the whole operation.
pub async fn create(
    db: &DatabaseConnection,
    organisation_id: i32,
    input: NewBlockType,
) -> Result<content_block_type::Model, ContentError> {
    let (name, slug) = normalize_name(&input.name)?;

    let txn = db.begin().await?;
    let catalog = type_catalog(&txn, organisation_id).await?;
    let fields = validate_drafts(&input.fields, &catalog)?;
    ensure_slug_free(&txn, organisation_id, &slug, None).await?;

    let now = chrono::Utc::now();
    let model = content_block_type::ActiveModel {
        name: Set(name),
        slug: Set(slug.clone()),
        organisation_id: Set(Some(organisation_id)),
        fields: Set(fields),
        is_default: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| ContentError::from_slug_write(e, "Content block type", &slug))?;

    txn.commit().await?;
    info!(type_id = model.id, organisation_id, "Created content block type");
    Ok(model)
}

/// Update a type owned by `organisation_id`.
///
/// Supplied fields are all validated again against the current catalog,
/// so references to types created since the last save become legal and
/// references to deleted types fail.
pub async fn update(
    db: &DatabaseConnection,
    organisation_id: i32,
    type_id: i32,
    changes: BlockTypeChanges,
) -> Result<content_block_type::Model, ContentError> {
    let txn = db.begin().await?;
    let existing = content_block_type::Entity::find_by_id(type_id)
        .filter(content_block_type::Column::OrganisationId.eq(organisation_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(ContentError::NotFound("Content block type"))?;

    let current_slug = existing.slug.clone();
    let mut slug = if current_slug.is_empty() {
        slugify(&existing.name)
    } else {
        current_slug.clone()
    };
    let mut active: content_block_type::ActiveModel = existing.into();

    if let Some(ref name) = changes.name {
        let (name, new_slug) = normalize_name(name)?;
        slug = new_slug;
        active.name = Set(name);
    }
    if slug != current_slug {
        ensure_slug_free(&txn, organisation_id, &slug, Some(type_id)).await?;
        active.slug = Set(slug.clone());
    }

    if let Some(ref drafts) = changes.fields {
        let catalog = type_catalog(&txn, organisation_id).await?;
        active.fields = Set(validate_drafts(drafts, &catalog)?);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active
        .update(&txn)
        .await
        .map_err(|e| ContentError::from_slug_write(e, "Content block type", &slug))?;
    txn.commit().await?;
    Ok(model)
}

/// The organisation's own types together with the global defaults,
/// ordered by name.
pub async fn organisation_types<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
) -> Result<Vec<content_block_type::Model>, DbErr> {
    content_block_type::Entity::find()
        .filter(visible_to(organisation_id))
        .order_by_asc(content_block_type::Column::Name)
        .order_by_asc(content_block_type::Column::Id)
        .all(db)
        .await
}

/// Nesting targets for a field picker. Global default types are not offered.
pub async fn array_field_options<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
) -> Result<Vec<ArrayFieldOption>, DbErr> {
    let types = content_block_type::Entity::find()
        .filter(content_block_type::Column::OrganisationId.eq(organisation_id))
        .order_by_asc(content_block_type::Column::Name)
        .order_by_asc(content_block_type::Column::Id)
        .all(db)
        .await?;

    Ok(types
        .into_iter()
        .map(|t| ArrayFieldOption {
            label: format!("Nested {} blocks", t.name),
            id: t.id,
        })
        .collect())
}

pub async fn find_visible<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
    type_id: i32,
) -> Result<content_block_type::Model, ContentError> {
    content_block_type::Entity::find_by_id(type_id)
        .filter(visible_to(organisation_id))
        .one(db)
        .await?
        .ok_or(ContentError::UnresolvableType(type_id))
}

/// Delete a type owned by the organisation together with its blocks and
/// their attachments. Files of the deleted blocks are removed afterwards.
pub async fn delete(
    db: &DatabaseConnection,
    storage: &dyn FileStorage,
    organisation_id: i32,
    type_id: i32,
) -> Result<(), ContentError> {
    let arena = TypeArena::load(db, organisation_id).await?;

    let txn = db.begin().await?;
    content_block_type::Entity::find_by_id(type_id)
        .filter(content_block_type::Column::OrganisationId.eq(organisation_id))
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(ContentError::NotFound("Content block type"))?;

    let blocks = content_block::Entity::find()
        .filter(content_block::Column::ContentBlockTypeId.eq(type_id))
        .all(&txn)
        .await?;
    let block_ids: Vec<i32> = blocks.iter().map(|b| b.id).collect();

    if !block_ids.is_empty() {
        page_content_block::Entity::delete_many()
            .filter(page_content_block::Column::ContentBlockId.is_in(block_ids.clone()))
            .exec(&txn)
            .await?;
        global_content_block::Entity::delete_many()
            .filter(global_content_block::Column::ContentBlockId.is_in(block_ids.clone()))
            .exec(&txn)
            .await?;
        content_block::Entity::delete_many()
            .filter(content_block::Column::Id.is_in(block_ids))
            .exec(&txn)
            .await?;
    }
    content_block_type::Entity::delete_by_id(type_id)
        .exec(&txn)
        .await?;
    txn.commit().await?;

    info!(
        type_id,
        organisation_id,
        blocks = blocks.len(),
        "Deleted content block type"
    );

    for block in &blocks {
        let content: Content = match &block.content {
            serde_json::Value::Object(map) => map.clone(),
            _ => continue,
        };
        for path in arena.file_paths(block.content_block_type_id, &content) {
            if let Err(e) = storage.delete(&path).await {
                warn!(block_id = block.id, path, "Failed to delete block file: {e}");
            }
        }
    }

    Ok(())
}
