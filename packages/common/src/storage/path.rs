use std::path::{Component, Path};

use uuid::Uuid;

use super::error::StorageError;

/// Build a fresh, collision-free object path inside `directory`.
///
/// The original filename is kept as a readable suffix after sanitizing it
/// down to `[A-Za-z0-9._-]`.
pub fn object_path(directory: &str, filename: &str) -> String {
    let directory = directory.trim_matches('/');
    let name = sanitize_filename(filename);
    format!("{directory}/{}-{name}", Uuid::now_v7())
}

fn sanitize_filename(filename: &str) -> String {
    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '-'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(['.', '-']);
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Reject stored paths that are absolute or walk out of the storage root.
pub fn validate_relative(path: &str) -> Result<&str, StorageError> {
    if path.is_empty() || path.contains('\0') || path.contains('\\') {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    let all_normal = Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if !all_normal {
        return Err(StorageError::InvalidPath(path.to_string()));
    }
    Ok(path)
}
