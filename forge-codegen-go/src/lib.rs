//! Go target for crudforge.
//!
//! [`Generator`] emits a `database/sql` service laid out the usual Go way:
//! `cmd/server` for the entry point and `internal/` packages for models,
//! repositories, services and HTTP handlers. The router flavor (Gin or Chi)
//! follows the configured target; everything below the handlers is shared.

mod generator;
mod go_file;
mod project;
mod type_mapper;

pub mod files;

pub use crudforge_codegen::{GenerateResult, LanguageCodegen, PreviewFile};
pub use generator::Generator;
pub use go_file::{GoFile, GoFunc, GoStruct, quote, render_imports};
pub use project::{Flavor, GoProject, go_name};
pub use type_mapper::GoTypeMapper;
