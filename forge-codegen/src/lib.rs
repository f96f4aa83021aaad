//! Shared code generation utilities for crudforge.
//!
//! This crate provides the target-agnostic half of generation, used by the
//! per-framework crates (e.g., `crudforge-codegen-rust`).
//!
//! # Module Organization
//!
//! - [`builder`] - Code generation building blocks (CodeBuilder, CodeFragment, etc.)
//! - [`language`] - Target abstractions (LanguageCodegen, TypeMapper, NamingConvention)
//! - [`generation`] - Output management (FileRegistry, ImportCollector, orphan scanning)
//! - [`pipeline`] - Validate, lower and analyze phases over a parsed schema
//! - [`schema`] - Analysis results and model display
//! - [`testing`] - Fixtures for generator tests (feature-gated)

pub mod builder;
pub mod generation;
pub mod language;
pub mod pipeline;
pub mod schema;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use builder::{CodeBuilder, CodeFragment, Indent, Renderable};
pub use generation::{
    DependencyCollector, DependencyKind, DependencySpec, FileCategory, FileEntry, FileRegistry,
    ImportCollector, Orphan, WriteStats, find_orphans,
};
pub use language::{
    Bind, CleanResult, CrudSql, GO_NAMING, GenerateResult, JAVA_NAMING, LanguageCodegen,
    NamingConvention, PYTHON_NAMING, PreviewFile, RUST_NAMING, RelationSql, SqlDialect,
    Statement, TYPESCRIPT_NAMING, TypeMapper,
};
pub use pipeline::{CompilationContext, Diagnostic, Pipeline, Severity};
pub use schema::{ComputedData, CredentialStore, DisplayStyle, EntityTreeDisplay};
