//! TypeScript (NestJS + TypeORM) target for crudforge.
//!
//! [`Generator`] emits one NestJS module per entity (TypeORM entity, DTOs,
//! mapper, repository, controller and a service stub), the bootstrap and
//! configuration files, jest e2e suites, and the optional auth, rate
//! limiting and upload modules.

mod code_file;
mod generator;
mod project;
mod type_mapper;

pub mod ast;
pub mod files;

pub use code_file::{CodeFile, render_imports};
pub use crudforge_codegen::{GenerateResult, LanguageCodegen, PreviewFile};
pub use generator::Generator;
pub use project::TsProject;
pub use type_mapper::TypeScriptTypeMapper;
