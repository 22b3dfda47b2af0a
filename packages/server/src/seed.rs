use std::collections::HashSet;

use common::{FieldDraft, slugify};
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use sea_orm::*;
use tracing::info;

use crate::entity::{content_block, page_content_block};

/// Global default types offered to every organisation: (name, fields).
fn default_block_types() -> Vec<(&'static str, Vec<FieldDraft>)> {
    vec![
        (
            "Hero",
            vec![
                FieldDraft::new("Title", "text").required(),
                FieldDraft::new("Subtitle", "textarea"),
                FieldDraft::new("Image", "file"),
                FieldDraft::new("Button Label", "text"),
                FieldDraft::new("Button Url", "url"),
            ],
        ),
        (
            "Rich Text",
            vec![FieldDraft::new("Body", "richtext").required()],
        ),
        (
            "Image",
            vec![
                FieldDraft::new("Image", "file").required(),
                FieldDraft::new("Alt Text", "text"),
                FieldDraft::new("Caption", "text"),
            ],
        ),
        (
            "Contact",
            vec![
                FieldDraft::new("Heading", "text"),
                FieldDraft::new("Email", "email"),
                FieldDraft::new("Phone", "tel"),
            ],
        ),
    ]
}

/// Seed the global default content block types.
///
/// Defaults have no organisation, and NULLs never collide in the unique
/// key, so existence is checked by slug instead of relying on a conflict.
pub async fn seed_default_block_types(db: &DatabaseConnection) -> Result<(), DbErr> {
    use crate::entity::content_block_type::{ActiveModel, Column, Entity};

    let no_types = HashSet::<i32>::new();
    let mut inserted = 0u32;

    for (name, drafts) in default_block_types() {
        let slug = slugify(name);
        let exists = Entity::find()
            .filter(Column::OrganisationId.is_null())
            .filter(Column::Slug.eq(&slug))
            .count(db)
            .await?
            > 0;
        if exists {
            continue;
        }

        let fields = common::field::validate_fields(&drafts, &no_types)
            .map_err(|e| DbErr::Custom(format!("Invalid default type '{name}': {e}")))?;
        let fields = serde_json::to_value(fields)
            .map_err(|e| DbErr::Custom(format!("Invalid default type '{name}': {e}")))?;

        let now = chrono::Utc::now();
        ActiveModel {
            name: Set(name.to_string()),
            slug: Set(slug),
            organisation_id: Set(None),
            fields: Set(fields),
            is_default: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await?;
        inserted += 1;
    }

    if inserted > 0 {
        info!("Seeded {} default content block types", inserted);
    }
    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite non-unique indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Page rendering:
    // SELECT ... FROM page_content_block WHERE page_id = ? ORDER BY "order", created_at, id
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_page_content_block_page_order")
        .table(page_content_block::Entity)
        .col(page_content_block::Column::PageId)
        .col(page_content_block::Column::Position)
        .col(page_content_block::Column::CreatedAt)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_page_content_block_page_order exists");
        }
        Err(e) => {
            tracing::warn!(
                "Failed to create index idx_page_content_block_page_order: {}",
                e
            );
        }
    }

    // Block listings filtered by organisation and scope.
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_content_block_org_website")
        .table(content_block::Entity)
        .col(content_block::Column::OrganisationId)
        .col(content_block::Column::WebsiteId)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_content_block_org_website exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_content_block_org_website: {}", e);
        }
    }

    Ok(())
}
