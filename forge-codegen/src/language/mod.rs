//! Target-specific abstractions.
//!
//! - [`LanguageCodegen`] - Main trait for target generators
//! - [`TypeMapper`] - Maps column types to target types
//! - [`NamingConvention`] - Identifier rules and reserved words per language
//! - [`SqlDialect`] - Placeholders and quoting for hand-written SQL
//! - [`CrudSql`] - Repository statements built on a dialect

mod crud;
mod naming;
mod sql;
mod traits;

pub use crud::{Bind, CrudSql, RelationSql, Statement};
pub use naming::{
    GO_NAMING, JAVA_NAMING, NamingConvention, PYTHON_NAMING, RUST_NAMING, TYPESCRIPT_NAMING,
};
pub use sql::SqlDialect;
pub use traits::{CleanResult, GenerateResult, LanguageCodegen, PreviewFile, TypeMapper};
