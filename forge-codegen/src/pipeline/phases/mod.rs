//! Built-in pipeline phases.
//!
//! - [`ValidatePhase`] - runs lints over the parsed schema
//! - [`LowerPhase`] - folds junctions and resolves relations into a domain model
//! - [`AnalyzePhase`] - computes shared data from the model

mod analyze;
mod lower;
mod validate;

pub use analyze::AnalyzePhase;
pub use lower::{LowerPhase, lower_schema};
pub use validate::{
    CompositeKeyLint, DuplicateTableLint, EmptyTableLint, Lint, MissingPrimaryKeyLint,
    NullableForeignKeyLint, ReservedWordLint, UnknownReferenceLint, ValidatePhase,
};
