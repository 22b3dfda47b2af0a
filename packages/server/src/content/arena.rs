//! In-memory index of the content block types visible to one organisation.
//!
//! Fields reference other types by id only, so a type graph may cycle
//! (a `Section` nesting `Section`s). The arena never inlines one type into
//! another: walks over content follow the *data*, looking up the referenced
//! type of each nested array as it is reached. Content is finite, so every
//! walk terminates regardless of the shape of the type graph.

use std::collections::{BTreeSet, HashMap, HashSet};

use common::storage::validate_relative;
use common::{FieldDefinition, FieldType};
use sea_orm::{ConnectionTrait, DbErr};
use serde_json::{Map, Value};

use super::registry;
use crate::entity::content_block_type;

/// A content block's field values, keyed by field slug.
pub type Content = Map<String, Value>;

/// Suffix of the read-only URL companion of a file field.
pub const URL_SUFFIX: &str = "_url";

/// Top-level storage directory of content block uploads.
pub const UPLOAD_ROOT: &str = "content-blocks";

#[derive(Debug, Clone)]
pub struct ArenaType {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone, Default)]
pub struct TypeArena {
    types: HashMap<i32, ArenaType>,
}

impl TypeArena {
    pub fn from_models(models: impl IntoIterator<Item = content_block_type::Model>) -> Self {
        let types = models
            .into_iter()
            .map(|m| {
                let fields = m.field_definitions();
                (m.id, ArenaType { name: m.name, fields })
            })
            .collect();
        Self { types }
    }

    /// Load the organisation's own types plus the global defaults.
    pub async fn load<C: ConnectionTrait>(db: &C, organisation_id: i32) -> Result<Self, DbErr> {
        Ok(Self::from_models(
            registry::organisation_types(db, organisation_id).await?,
        ))
    }

    pub fn get(&self, type_id: i32) -> Option<&ArenaType> {
        self.types.get(&type_id)
    }

    pub fn contains(&self, type_id: i32) -> bool {
        self.types.contains_key(&type_id)
    }

    /// Whether `path` is an upload made for one of the arena's types,
    /// i.e. `content-blocks/{type_id}/<name>`.
    ///
    /// Any other string found in a file field is inert: it is never signed
    /// and never deleted from storage.
    pub fn is_upload_path(&self, path: &str) -> bool {
        if validate_relative(path).is_err() {
            return false;
        }
        let Some(rest) = path
            .strip_prefix(UPLOAD_ROOT)
            .and_then(|r| r.strip_prefix('/'))
        else {
            return false;
        };
        match rest.split_once('/') {
            Some((dir, name)) if !name.is_empty() => {
                dir.parse::<i32>().is_ok_and(|id| self.contains(id))
            }
            _ => false,
        }
    }

    /// Every stored file path referenced by `content`, nested arrays included.
    pub fn file_paths(&self, type_id: i32, content: &Content) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.collect_paths(type_id, content, &mut out);
        out
    }

    fn collect_paths(&self, type_id: i32, content: &Content, out: &mut BTreeSet<String>) {
        let Some(ty) = self.get(type_id) else {
            return;
        };
        for field in &ty.fields {
            match (field.field_type, content.get(&field.slug)) {
                (FieldType::File, Some(Value::String(path))) if self.is_upload_path(path) => {
                    out.insert(path.clone());
                }
                (FieldType::ContentBlockArray, Some(Value::Array(items))) => {
                    let Some(nested) = field.reference_block_type_id else {
                        continue;
                    };
                    for item in items {
                        if let Value::Object(item) = item {
                            self.collect_paths(nested, item, out);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Add `<slug>_url` next to every file field present in `content`.
    ///
    /// `urls` maps stored paths to their signed URL; a path missing from it
    /// or mapped to `None` gets a `null` URL.
    pub fn attach_urls(
        &self,
        type_id: i32,
        content: &mut Content,
        urls: &HashMap<String, Option<String>>,
    ) {
        let Some(ty) = self.get(type_id) else {
            return;
        };
        for field in &ty.fields {
            match field.field_type {
                FieldType::File => {
                    let url = match content.get(&field.slug) {
                        Some(Value::String(path)) if self.is_upload_path(path) => {
                            urls.get(path).cloned().flatten()
                        }
                        _ => continue,
                    };
                    content.insert(
                        format!("{}{URL_SUFFIX}", field.slug),
                        url.map_or(Value::Null, Value::String),
                    );
                }
                FieldType::ContentBlockArray => {
                    let Some(nested) = field.reference_block_type_id else {
                        continue;
                    };
                    if let Some(Value::Array(items)) = content.get_mut(&field.slug) {
                        for item in items.iter_mut() {
                            if let Value::Object(item) = item {
                                self.attach_urls(nested, item, urls);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Prepare client-supplied content for persistence.
    ///
    /// Removes `<slug>_url` keys shadowing file fields, and file values in
    /// nested items that are not among `known_paths`.
    pub fn sanitize(&self, type_id: i32, content: &mut Content, known_paths: &HashSet<String>) {
        let Some(ty) = self.get(type_id) else {
            return;
        };
        for field in &ty.fields {
            match field.field_type {
                FieldType::File => {
                    content.remove(&format!("{}{URL_SUFFIX}", field.slug));
                }
                FieldType::ContentBlockArray => {
                    let Some(nested) = field.reference_block_type_id else {
                        continue;
                    };
                    let Some(Value::Array(items)) = content.get_mut(&field.slug) else {
                        continue;
                    };
                    for item in items.iter_mut() {
                        if let Value::Object(item) = item {
                            self.sanitize(nested, item, known_paths);
                            self.drop_unknown_files(nested, item, known_paths);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn drop_unknown_files(&self, type_id: i32, item: &mut Content, known_paths: &HashSet<String>) {
        let Some(ty) = self.get(type_id) else {
            return;
        };
        for field in ty.fields.iter().filter(|f| f.field_type.is_file()) {
            let keep = match item.get(&field.slug) {
                Some(Value::String(path)) => known_paths.contains(path),
                _ => true,
            };
            if !keep {
                item.remove(&field.slug);
            }
        }
    }
}

/// Whether every required field has a non-null value in `content`.
///
/// Fields are looked up by slug, the same key content is stored under.
pub fn has_required_fields(fields: &[FieldDefinition], content: &Content) -> bool {
    fields
        .iter()
        .filter(|f| f.required)
        .all(|f| content.get(&f.slug).is_some_and(|v| !v.is_null()))
}
