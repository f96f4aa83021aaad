//! Schema and project configuration parsing for crudforge.
//!
//! - [`parse_sql`] reads `CREATE TABLE` DDL.
//! - [`parse_openapi`] reads OpenAPI component schemas (JSON or YAML).
//! - [`ProjectConfig`] / [`ForgeToml`] read `forge.toml`.
//!
//! Errors are [`miette`] diagnostics that point into the offending source.

// Miette's derive macro generates code that triggers these warnings
#![allow(unused_assignments)]

mod config;
mod error;
mod openapi;
mod source;
mod sql;

pub use config::{
    ForgeToml, GenerateSection, ProjectConfig, ProjectSection, SchemaSection, Target,
};
pub use crudforge_ir::{ParsedSchema, SchemaFormat, SqlColumn, SqlTable};
pub use error::{Error, Result, SourceContext};
pub use openapi::parse_openapi;
pub use source::{load_schema, parse_schema};
pub use sql::parse_sql;
