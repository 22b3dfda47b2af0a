pub mod content_block;
pub mod content_block_type;
pub mod files;
pub mod ideas;
pub mod page;
pub mod shared;
pub mod website;
