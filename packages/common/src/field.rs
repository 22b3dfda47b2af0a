//! Field schema definitions for content block types and their validator.
//!
//! A content block type is an ordered list of [`FieldDefinition`]s. Clients
//! submit loosely-shaped [`FieldDraft`]s which are normalized here: labels
//! are checked, slugs derived, and type tokens resolved either to a core
//! primitive or to a reference to another type of the same organisation.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::field_type::FieldType;
use crate::slug::slugify;

/// A normalized field of a content block type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct FieldDefinition {
    #[schema(example = "Profile Image")]
    pub label: String,
    /// Derived from the label. Content values are keyed by this slug.
    #[schema(example = "profile-image")]
    pub slug: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    /// Present only for `content_block_array` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_block_type_id: Option<i32>,
    /// Choices for `select` and `radio` fields.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
}

/// A field as submitted by a client, before validation.
///
/// `label` and `type` are kept as raw JSON so that wrong shapes surface as
/// field schema errors instead of request deserialization failures.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, utoipa::ToSchema)]
pub struct FieldDraft {
    #[serde(default)]
    pub label: Option<Value>,
    /// A core type token, or the id of another content block type.
    #[serde(default, rename = "type")]
    pub field_type: Option<Value>,
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub reference_block_type_id: Option<Value>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
}

impl FieldDraft {
    pub fn new(label: impl Into<String>, field_type: impl Into<Value>) -> Self {
        Self {
            label: Some(Value::String(label.into())),
            field_type: Some(field_type.into()),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }
}

impl From<&FieldDefinition> for FieldDraft {
    fn from(def: &FieldDefinition) -> Self {
        Self {
            label: Some(Value::String(def.label.clone())),
            field_type: Some(Value::String(def.field_type.as_str().to_string())),
            required: Some(def.required),
            reference_block_type_id: def.reference_block_type_id.map(Value::from),
            options: def.options.clone(),
        }
    }
}

/// The set of content block type ids a field may reference.
pub trait TypeCatalog {
    fn contains_type(&self, type_id: i32) -> bool;
}

impl TypeCatalog for HashSet<i32> {
    fn contains_type(&self, type_id: i32) -> bool {
        self.contains(&type_id)
    }
}

impl TypeCatalog for BTreeSet<i32> {
    fn contains_type(&self, type_id: i32) -> bool {
        self.contains(&type_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldSchemaError {
    #[error("Field #{}: label is required and must be a non-empty string", .index + 1)]
    MissingLabel { index: usize },

    #[error("Field '{label}': type is required")]
    MissingType { index: usize, label: String },

    #[error(
        "Field '{label}': invalid type '{token}'. Valid types are: {valid}, \
         or the id of a content block type in this organisation",
        valid = FieldType::core_token_list()
    )]
    InvalidFieldType {
        index: usize,
        label: String,
        token: String,
    },
}

impl FieldSchemaError {
    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingLabel { .. } => "MISSING_LABEL",
            Self::MissingType { .. } => "MISSING_TYPE",
            Self::InvalidFieldType { .. } => "INVALID_FIELD_TYPE",
        }
    }

    /// Zero-based position of the offending field.
    pub fn index(&self) -> usize {
        match self {
            Self::MissingLabel { index }
            | Self::MissingType { index, .. }
            | Self::InvalidFieldType { index, .. } => *index,
        }
    }
}

/// Parse a type id given either as a JSON number or a numeric string.
pub fn parse_type_id(value: &Value) -> Option<i32> {
    match value {
        Value::Number(n) => n.as_i64().and_then(|v| i32::try_from(v).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn token_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate and normalize one field definition.
///
/// `catalog` holds the ids of the owning organisation's content block types.
/// Tokens that are neither a core primitive nor in the catalog are rejected.
pub fn validate_field(
    index: usize,
    draft: &FieldDraft,
    catalog: &impl TypeCatalog,
) -> Result<FieldDefinition, FieldSchemaError> {
    let label = match &draft.label {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        _ => return Err(FieldSchemaError::MissingLabel { index }),
    };
    let slug = slugify(&label);
    let required = draft.required.unwrap_or(false);

    let token = match &draft.field_type {
        None => return Err(FieldSchemaError::MissingType { index, label }),
        Some(Value::String(s)) if s.trim().is_empty() => {
            return Err(FieldSchemaError::MissingType { index, label });
        }
        Some(token) => token,
    };

    let invalid = |label: String| FieldSchemaError::InvalidFieldType {
        index,
        label,
        token: token_display(token),
    };

    if let Value::String(s) = token {
        let s = s.trim();
        if let Some(field_type) = FieldType::from_core_token(s) {
            let options = if field_type.has_options() {
                draft.options.clone()
            } else {
                None
            };
            return Ok(FieldDefinition {
                label,
                slug,
                field_type,
                required,
                reference_block_type_id: None,
                options,
            });
        }

        // Definitions read back from the API carry the synthetic kind; the
        // reference is re-checked like a fresh token.
        if s == FieldType::ContentBlockArray.as_str() {
            return match draft.reference_block_type_id.as_ref().and_then(parse_type_id) {
                Some(id) if catalog.contains_type(id) => Ok(nested(label, slug, required, id)),
                _ => Err(invalid(label)),
            };
        }
    }

    match parse_type_id(token) {
        Some(id) if catalog.contains_type(id) => Ok(nested(label, slug, required, id)),
        _ => Err(invalid(label)),
    }
}

fn nested(label: String, slug: String, required: bool, type_id: i32) -> FieldDefinition {
    FieldDefinition {
        label,
        slug,
        field_type: FieldType::ContentBlockArray,
        required,
        reference_block_type_id: Some(type_id),
        options: None,
    }
}

/// Validate every field in order, stopping at the first failure.
pub fn validate_fields(
    drafts: &[FieldDraft],
    catalog: &impl TypeCatalog,
) -> Result<Vec<FieldDefinition>, FieldSchemaError> {
    drafts
        .iter()
        .enumerate()
        .map(|(index, draft)| validate_field(index, draft, catalog))
        .collect()
}
