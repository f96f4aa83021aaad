//! Core utilities and types for crudforge.
//!
//! This crate provides the file-writing rules, naming helpers and
//! English inflection shared by every generator crate.

mod file;
mod inflect;
mod utils;
mod version;

// File operations
pub use file::{
    File, FileRules, GENERATED_MARKER, GeneratedFile, Overwrite, STUB_MARKER, WriteResult,
};
// Inflection
pub use inflect::{is_plural, pluralize, singularize};
// String utilities
pub use utils::{
    split_words, to_camel_case, to_kebab_case, to_pascal_case, to_screaming_snake_case,
    to_snake_case,
};
pub use version::Version;
