//! Lint trait for schema validation.

use crudforge_ir::ParsedSchema;

use crate::pipeline::Diagnostic;

/// A check over the parsed schema.
///
/// Lints tag their diagnostics with their own name.
pub trait Lint: Send + Sync {
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn check(&self, schema: &ParsedSchema, diagnostics: &mut Vec<Diagnostic>);
}
