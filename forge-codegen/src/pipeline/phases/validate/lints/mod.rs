//! Built-in lints for schema validation.

mod duplicate_table;
mod empty_table;
mod nullable_foreign_key;
mod primary_key;
mod reserved_word;
mod unknown_reference;

pub use duplicate_table::DuplicateTableLint;
pub use empty_table::EmptyTableLint;
pub use nullable_foreign_key::NullableForeignKeyLint;
pub use primary_key::{CompositeKeyLint, MissingPrimaryKeyLint};
pub use reserved_word::ReservedWordLint;
pub use unknown_reference::UnknownReferenceLint;
