pub mod config;
pub mod field;
pub mod field_type;
pub mod membership;
pub mod slug;
pub mod storage;

pub use field::{FieldDefinition, FieldDraft, FieldSchemaError, TypeCatalog};
pub use field_type::FieldType;
pub use membership::{MembershipRole, Permission, authorize};
pub use slug::slugify;
