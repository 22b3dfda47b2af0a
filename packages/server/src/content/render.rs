//! JSON shapes consumed by the presentation layer.

use std::time::Duration;

use common::storage::FileStorage;
use sea_orm::ConnectionTrait;
use serde::Serialize;

use super::arena::{Content, TypeArena};
use super::{ContentError, composition, store};
use crate::entity::{content_block, page, website};

/// One block as rendered: `{id, type, content}`.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RenderedBlock {
    pub id: i32,
    /// Name of the block's content block type.
    #[serde(rename = "type")]
    #[schema(example = "Hero")]
    pub block_type: String,
    /// Field values, with `<slug>_url` added for file fields.
    #[schema(value_type = Object)]
    pub content: Content,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct RenderedPage {
    pub id: i32,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub content_blocks: Vec<RenderedBlock>,
}

/// Render blocks in the given order, signing each distinct file once.
pub async fn render_blocks(
    arena: &TypeArena,
    storage: &dyn FileStorage,
    ttl: Duration,
    blocks: &[content_block::Model],
) -> Vec<RenderedBlock> {
    let paths = blocks.iter().flat_map(|b| {
        arena.file_paths(b.content_block_type_id, &store::content_of(b))
    });
    let urls = store::resolve_urls(storage, ttl, paths.collect::<Vec<_>>()).await;

    blocks
        .iter()
        .map(|block| {
            let type_id = block.content_block_type_id;
            let mut content = store::content_of(block);
            arena.attach_urls(type_id, &mut content, &urls);
            RenderedBlock {
                id: block.id,
                block_type: arena.get(type_id).map(|t| t.name.clone()).unwrap_or_default(),
                content,
            }
        })
        .collect()
}

/// Render a page with its attached blocks in display order.
pub async fn render_page<C: ConnectionTrait>(
    db: &C,
    storage: &dyn FileStorage,
    ttl: Duration,
    site: &website::Model,
    page: page::Model,
) -> Result<RenderedPage, ContentError> {
    let arena = TypeArena::load(db, site.organisation_id).await?;
    let blocks: Vec<content_block::Model> = composition::page_blocks(db, page.id)
        .await?
        .into_iter()
        .map(|(_, block)| block)
        .collect();

    Ok(RenderedPage {
        id: page.id,
        title: page.title,
        slug: page.slug,
        description: page.description,
        content_blocks: render_blocks(&arena, storage, ttl, &blocks).await,
    })
}
