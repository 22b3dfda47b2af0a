pub mod content_block;
pub mod content_block_type;
pub mod global_content_block;
pub mod membership;
pub mod organisation;
pub mod page;
pub mod page_content_block;
pub mod user;
pub mod website;
