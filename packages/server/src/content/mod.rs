//! The content engine: type registry, block store and page composition.

pub mod access;
pub mod arena;
pub mod composition;
mod error;
pub mod registry;
pub mod render;
pub mod store;

pub use arena::{Content, TypeArena};
pub use error::ContentError;
