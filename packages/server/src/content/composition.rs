//! Pages, ordered page attachments and per-website global blocks.

use std::collections::HashSet;

use common::slugify;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::info;

use super::ContentError;
use crate::entity::{content_block, global_content_block, page, page_content_block, website};

const MAX_TITLE_CHARS: usize = 255;

pub struct NewPage {
    pub title: String,
    /// Explicit slug; derived from the title when absent.
    pub slug: Option<String>,
    pub description: Option<String>,
}

pub struct NewWebsite {
    pub name: String,
    pub domain: Option<String>,
}

#[derive(Default)]
pub struct PageChanges {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<Option<String>>,
}

fn normalize_title(title: &str) -> Result<String, ContentError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return Err(ContentError::Validation(format!(
            "Title must be 1-{MAX_TITLE_CHARS} characters"
        )));
    }
    Ok(title.to_string())
}

fn derive_slug(source: &str) -> Result<String, ContentError> {
    let slug = slugify(source);
    if slug.is_empty() {
        return Err(ContentError::Validation(
            "Slug must contain at least one letter or digit".into(),
        ));
    }
    Ok(slug)
}

async fn ensure_page_slug_free<C: ConnectionTrait>(
    db: &C,
    website_id: i32,
    slug: &str,
    exclude_id: Option<i32>,
) -> Result<(), ContentError> {
    let mut query = page::Entity::find()
        .filter(page::Column::WebsiteId.eq(website_id))
        .filter(page::Column::Slug.eq(slug));
    if let Some(id) = exclude_id {
        query = query.filter(page::Column::Id.ne(id));
    }
    if query.count(db).await? > 0 {
        return Err(ContentError::DuplicateSlug {
            kind: "Page",
            slug: slug.to_string(),
        });
    }
    Ok(())
}

pub async fn create_website<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
    input: NewWebsite,
) -> Result<website::Model, ContentError> {
    let name = input.name.trim();
    if name.is_empty() || name.chars().count() > MAX_TITLE_CHARS {
        return Err(ContentError::Validation(format!(
            "Name must be 1-{MAX_TITLE_CHARS} characters"
        )));
    }
    let domain = input
        .domain
        .map(|d| d.trim().to_lowercase())
        .filter(|d| !d.is_empty());

    let now = chrono::Utc::now();
    let model = website::ActiveModel {
        name: Set(name.to_string()),
        domain: Set(domain),
        organisation_id: Set(organisation_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    info!(website_id = model.id, organisation_id, "Created website");
    Ok(model)
}

pub async fn list_websites<C: ConnectionTrait>(
    db: &C,
    organisation_id: i32,
) -> Result<Vec<website::Model>, DbErr> {
    website::Entity::find()
        .filter(website::Column::OrganisationId.eq(organisation_id))
        .order_by_asc(website::Column::Name)
        .order_by_asc(website::Column::Id)
        .all(db)
        .await
}

pub async fn find_page<C: ConnectionTrait>(
    db: &C,
    website_id: i32,
    page_id: i32,
) -> Result<page::Model, ContentError> {
    page::Entity::find_by_id(page_id)
        .filter(page::Column::WebsiteId.eq(website_id))
        .one(db)
        .await?
        .ok_or(ContentError::NotFound("Page"))
}

async fn find_page_for_update(
    txn: &DatabaseTransaction,
    website_id: i32,
    page_id: i32,
) -> Result<page::Model, ContentError> {
    page::Entity::find_by_id(page_id)
        .filter(page::Column::WebsiteId.eq(website_id))
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or(ContentError::NotFound("Page"))
}

pub async fn list_pages<C: ConnectionTrait>(
    db: &C,
    website_id: i32,
) -> Result<Vec<page::Model>, DbErr> {
    page::Entity::find()
        .filter(page::Column::WebsiteId.eq(website_id))
        .order_by_asc(page::Column::Title)
        .order_by_asc(page::Column::Id)
        .all(db)
        .await
}

pub async fn create_page(
    db: &DatabaseConnection,
    website_id: i32,
    input: NewPage,
) -> Result<page::Model, ContentError> {
    let title = normalize_title(&input.title)?;
    let slug = derive_slug(input.slug.as_deref().unwrap_or(&title))?;

    let txn = db.begin().await?;
    ensure_page_slug_free(&txn, website_id, &slug, None).await?;

    let now = chrono::Utc::now();
    let model = page::ActiveModel {
        title: Set(title),
        slug: Set(slug.clone()),
        description: Set(input.description),
        website_id: Set(website_id),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await
    .map_err(|e| ContentError::from_slug_write(e, "Page", &slug))?;
    txn.commit().await?;

    Ok(model)
}

/// Update a page. The slug follows the title unless one is given.
pub async fn update_page(
    db: &DatabaseConnection,
    website_id: i32,
    page_id: i32,
    changes: PageChanges,
) -> Result<page::Model, ContentError> {
    let txn = db.begin().await?;
    let existing = find_page_for_update(&txn, website_id, page_id).await?;

    let mut slug = existing.slug.clone();
    let title_changed = changes
        .title
        .as_deref()
        .is_some_and(|t| t.trim() != existing.title);
    let mut active: page::ActiveModel = existing.clone().into();

    if let Some(ref title) = changes.title {
        let title = normalize_title(title)?;
        if title_changed || slug.is_empty() {
            slug = derive_slug(&title)?;
        }
        active.title = Set(title);
    } else if slug.is_empty() {
        slug = derive_slug(&existing.title)?;
    }
    if let Some(ref explicit) = changes.slug {
        slug = derive_slug(explicit)?;
    }
    if slug != existing.slug {
        ensure_page_slug_free(&txn, website_id, &slug, Some(page_id)).await?;
        active.slug = Set(slug.clone());
    }
    if let Some(description) = changes.description {
        active.description = Set(description);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active
        .update(&txn)
        .await
        .map_err(|e| ContentError::from_slug_write(e, "Page", &slug))?;
    txn.commit().await?;
    Ok(model)
}

pub async fn delete_page(
    db: &DatabaseConnection,
    website_id: i32,
    page_id: i32,
) -> Result<(), ContentError> {
    let txn = db.begin().await?;
    find_page_for_update(&txn, website_id, page_id).await?;

    page_content_block::Entity::delete_many()
        .filter(page_content_block::Column::PageId.eq(page_id))
        .exec(&txn)
        .await?;
    page::Entity::delete_by_id(page_id).exec(&txn).await?;
    txn.commit().await?;
    Ok(())
}

/// Check that a block may appear on the given website.
fn ensure_attachable(
    site: &website::Model,
    block: &content_block::Model,
) -> Result<(), ContentError> {
    if block.organisation_id != site.organisation_id {
        return Err(ContentError::CrossOrganisationReference(format!(
            "Content block {}",
            block.id
        )));
    }
    if let Some(owner) = block.website_id
        && owner != site.id
    {
        return Err(ContentError::Validation(format!(
            "Content block {} is specific to another website",
            block.id
        )));
    }
    Ok(())
}

/// Position after the page's last block, or 1 for an empty page.
async fn next_position<C: ConnectionTrait>(db: &C, page_id: i32) -> Result<i32, ContentError> {
    let max_pos: Option<i32> = page_content_block::Entity::find()
        .filter(page_content_block::Column::PageId.eq(page_id))
        .select_only()
        .column_as(page_content_block::Column::Position.max(), "max_pos")
        .into_tuple::<Option<i32>>()
        .one(db)
        .await?
        .flatten();
    max_pos
        .unwrap_or(0)
        .checked_add(1)
        .ok_or_else(|| ContentError::Validation("Position overflow".into()))
}

/// Attach a block to a page at `order`, or after the last block.
///
/// Attaching the same block twice creates two attachments.
pub async fn attach_content_block(
    db: &DatabaseConnection,
    website_id: i32,
    page_id: i32,
    block_id: i32,
    order: Option<i32>,
) -> Result<page_content_block::Model, ContentError> {
    let txn = db.begin().await?;
    find_page_for_update(&txn, website_id, page_id).await?;

    let site = website::Entity::find_by_id(website_id)
        .one(&txn)
        .await?
        .ok_or(ContentError::NotFound("Website"))?;
    let block = content_block::Entity::find_by_id(block_id)
        .one(&txn)
        .await?
        .ok_or(ContentError::NotFound("Content block"))?;
    ensure_attachable(&site, &block)?;

    let position = match order {
        Some(order) => order,
        None => next_position(&txn, page_id).await?,
    };

    let link = page_content_block::ActiveModel {
        page_id: Set(page_id),
        content_block_id: Set(block_id),
        position: Set(position),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    txn.commit().await?;

    info!(page_id, block_id, position, "Attached content block");
    Ok(link)
}

/// Remove every attachment of the block from the page.
pub async fn detach_content_block(
    db: &DatabaseConnection,
    website_id: i32,
    page_id: i32,
    block_id: i32,
) -> Result<u64, ContentError> {
    find_page(db, website_id, page_id).await?;
    let result = page_content_block::Entity::delete_many()
        .filter(page_content_block::Column::PageId.eq(page_id))
        .filter(page_content_block::Column::ContentBlockId.eq(block_id))
        .exec(db)
        .await?;
    if result.rows_affected == 0 {
        return Err(ContentError::NotFound("Content block attachment"));
    }
    Ok(result.rows_affected)
}

/// A page's blocks in display order.
pub async fn page_blocks<C: ConnectionTrait>(
    db: &C,
    page_id: i32,
) -> Result<Vec<(page_content_block::Model, content_block::Model)>, DbErr> {
    let rows = page_content_block::Entity::find()
        .filter(page_content_block::Column::PageId.eq(page_id))
        .find_also_related(content_block::Entity)
        .order_by_asc(page_content_block::Column::Position)
        .order_by_asc(page_content_block::Column::CreatedAt)
        .order_by_asc(page_content_block::Column::Id)
        .all(db)
        .await?;
    Ok(rows
        .into_iter()
        .filter_map(|(link, block)| block.map(|b| (link, b)))
        .collect())
}

/// A website's global blocks, in the order they were last supplied.
pub async fn global_blocks<C: ConnectionTrait>(
    db: &C,
    website_id: i32,
) -> Result<Vec<content_block::Model>, DbErr> {
    let rows = global_content_block::Entity::find()
        .filter(global_content_block::Column::WebsiteId.eq(website_id))
        .find_also_related(content_block::Entity)
        .order_by_asc(global_content_block::Column::Id)
        .all(db)
        .await?;
    Ok(rows.into_iter().filter_map(|(_, block)| block).collect())
}

/// Replace the website's global blocks with `block_ids`, all or nothing.
pub async fn replace_global_blocks(
    db: &DatabaseConnection,
    website_id: i32,
    block_ids: &[i32],
) -> Result<Vec<global_content_block::Model>, ContentError> {
    let mut seen = HashSet::with_capacity(block_ids.len());
    if let Some(dup) = block_ids.iter().find(|id| !seen.insert(**id)) {
        return Err(ContentError::Validation(format!(
            "Content block {dup} is listed more than once"
        )));
    }

    let txn = db.begin().await?;
    let site = website::Entity::find_by_id(website_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or(ContentError::NotFound("Website"))?;

    global_content_block::Entity::delete_many()
        .filter(global_content_block::Column::WebsiteId.eq(website_id))
        .exec(&txn)
        .await?;

    let mut created = Vec::with_capacity(block_ids.len());
    for &block_id in block_ids {
        let block = content_block::Entity::find_by_id(block_id)
            .one(&txn)
            .await?
            .ok_or(ContentError::NotFound("Content block"))?;
        ensure_attachable(&site, &block)?;

        let row = global_content_block::ActiveModel {
            website_id: Set(website_id),
            content_block_id: Set(block_id),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        created.push(row);
    }
    txn.commit().await?;

    info!(website_id, count = created.len(), "Replaced global content blocks");
    Ok(created)
}
