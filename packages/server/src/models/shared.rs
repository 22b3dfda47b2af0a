use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

/// Validate an optional order field (must be >= 0 when present).
pub fn validate_optional_order(order: Option<i32>) -> Result<(), AppError> {
    if let Some(order) = order
        && order < 0
    {
        return Err(AppError::Validation("Order must be >= 0".into()));
    }
    Ok(())
}
