use axum::routing::get;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(content_block_type_routes())
        .merge(content_block_routes(config))
        .merge(website_routes())
        .merge(page_routes())
        .route("/files/{*path}", get(handlers::files::download_file))
}

fn content_block_type_routes() -> OpenApiRouter<AppState> {
    use handlers::content_block_type::*;

    OpenApiRouter::new()
        .routes(routes!(list_content_block_types, create_content_block_type))
        .routes(routes!(list_array_field_options))
        .routes(routes!(
            get_content_block_type,
            update_content_block_type,
            delete_content_block_type
        ))
}

fn content_block_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    use handlers::content_block::*;

    OpenApiRouter::new()
        .routes(routes!(list_content_blocks, create_content_block))
        .routes(routes!(
            get_content_block,
            update_content_block,
            delete_content_block
        ))
        .routes(routes!(validate_content_block))
        .layer(content_block_body_limit(config.storage.max_upload_size))
}

fn website_routes() -> OpenApiRouter<AppState> {
    use handlers::ideas::generate_ideas;
    use handlers::website::*;

    OpenApiRouter::new()
        .routes(routes!(create_website, list_websites))
        .routes(routes!(get_website))
        .routes(routes!(generate_ideas))
}

fn page_routes() -> OpenApiRouter<AppState> {
    use handlers::page::*;

    OpenApiRouter::new()
        .routes(routes!(list_pages, create_page))
        .routes(routes!(get_page, update_page, delete_page))
        .routes(routes!(attach_content_block, detach_content_block))
        .routes(routes!(list_global_blocks, replace_global_blocks))
}
