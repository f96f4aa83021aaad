//! Rust (Axum + sqlx) target for crudforge.
//!
//! [`Generator`] turns a [`DomainModel`](crudforge_ir::DomainModel) into a
//! complete service: models, repositories, service stubs, handlers and
//! integration tests, plus the optional auth, rate limiting and upload
//! modules.

mod generator;
mod project;
mod render;
mod type_mapper;

pub mod ast;
pub mod files;

pub use ast::{Field, Fn, Param, Struct};
pub use crudforge_codegen::{GenerateResult, LanguageCodegen, PreviewFile};
pub use generator::Generator;
pub use project::RustProject;
pub use render::{RustFile, render_imports};
pub use type_mapper::RustTypeMapper;
