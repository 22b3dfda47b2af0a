use common::FieldSchemaError;
use common::storage::StorageError;
use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Errors raised by the content engine.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error(transparent)]
    FieldSchema(#[from] FieldSchemaError),

    #[error("{kind} slug '{slug}' is already taken")]
    DuplicateSlug { kind: &'static str, slug: String },

    #[error("Content block type {0} does not exist or is not visible to this organisation")]
    UnresolvableType(i32),

    /// The named entity (e.g. "Content block 7") lives in another organisation.
    #[error("{0} belongs to a different organisation")]
    CrossOrganisationReference(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl ContentError {
    /// Map a unique-key violation on a slug column to `DuplicateSlug`.
    ///
    /// The pre-insert slug check can race with a concurrent save; the
    /// database constraint settles it.
    pub fn from_slug_write(err: DbErr, kind: &'static str, slug: &str) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::DuplicateSlug {
                kind,
                slug: slug.to_string(),
            },
            _ => err.into(),
        }
    }
}
