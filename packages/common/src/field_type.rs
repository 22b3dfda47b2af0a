use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a field inside a content block type schema.
///
/// The fifteen core primitives are the persisted wire vocabulary. The
/// synthetic `content_block_array` kind is produced when a field's type token
/// names another content block type instead of a primitive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Select,
    Checkbox,
    Radio,
    Switch,
    Date,
    Time,
    File,
    Email,
    Password,
    Url,
    Tel,
    Richtext,
    /// Repeatable collection of another content block type's instances.
    ContentBlockArray,
}

impl FieldType {
    /// All core primitive kinds, in their canonical order.
    pub const CORE: &'static [FieldType] = &[
        Self::Text,
        Self::Textarea,
        Self::Number,
        Self::Select,
        Self::Checkbox,
        Self::Radio,
        Self::Switch,
        Self::Date,
        Self::Time,
        Self::File,
        Self::Email,
        Self::Password,
        Self::Url,
        Self::Tel,
        Self::Richtext,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Textarea => "textarea",
            Self::Number => "number",
            Self::Select => "select",
            Self::Checkbox => "checkbox",
            Self::Radio => "radio",
            Self::Switch => "switch",
            Self::Date => "date",
            Self::Time => "time",
            Self::File => "file",
            Self::Email => "email",
            Self::Password => "password",
            Self::Url => "url",
            Self::Tel => "tel",
            Self::Richtext => "richtext",
            Self::ContentBlockArray => "content_block_array",
        }
    }

    /// Resolve a token against the core primitives only.
    pub fn from_core_token(token: &str) -> Option<Self> {
        Self::CORE.iter().copied().find(|t| t.as_str() == token)
    }

    pub fn is_core(&self) -> bool {
        !matches!(self, Self::ContentBlockArray)
    }

    /// Whether values of this kind are opaque storage paths.
    pub fn is_file(&self) -> bool {
        matches!(self, Self::File)
    }

    /// Whether the field may carry an `options` list.
    pub fn has_options(&self) -> bool {
        matches!(self, Self::Select | Self::Radio)
    }

    /// Comma-separated list of core tokens, used in error messages.
    pub fn core_token_list() -> String {
        Self::CORE
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "content_block_array" {
            return Ok(Self::ContentBlockArray);
        }
        Self::from_core_token(s).ok_or_else(|| format!("unknown field type: {s}"))
    }
}
