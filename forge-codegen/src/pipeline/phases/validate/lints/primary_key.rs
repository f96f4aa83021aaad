//! Lints for primary key shape.

use crudforge_ir::ParsedSchema;

use super::super::Lint;
use crate::pipeline::Diagnostic;

/// Errors on entity tables without a primary key.
///
/// Tables that lower to many-to-many links are exempt; they are addressed
/// through their link columns.
pub struct MissingPrimaryKeyLint;

impl Lint for MissingPrimaryKeyLint {
    fn name(&self) -> &'static str {
        "missing-primary-key"
    }

    fn description(&self) -> &'static str {
        "Entity tables need a primary key for get/update/delete by id"
    }

    fn check(&self, schema: &ParsedSchema, diagnostics: &mut Vec<Diagnostic>) {
        for table in &schema.tables {
            if table.primary_key.is_empty()
                && !table.columns.is_empty()
                && !schema.links_entities(table)
            {
                diagnostics.push(
                    Diagnostic::error(
                        self.name(),
                        format!("table '{}' has no primary key", table.name),
                    )
                    .at(&table.name),
                );
            }
        }
    }
}

/// Warns on entity tables keyed by more than one column.
pub struct CompositeKeyLint;

impl Lint for CompositeKeyLint {
    fn name(&self) -> &'static str {
        "composite-key"
    }

    fn description(&self) -> &'static str {
        "Composite keys are addressed by their first column only"
    }

    fn check(&self, schema: &ParsedSchema, diagnostics: &mut Vec<Diagnostic>) {
        for table in &schema.tables {
            if table.primary_key.len() > 1 && !schema.links_entities(table) {
                diagnostics.push(
                    Diagnostic::warning(
                        self.name(),
                        format!(
                            "table '{}' has a composite primary key ({}); routes use '{}' as the id",
                            table.name,
                            table.primary_key.join(", "),
                            table.primary_key[0]
                        ),
                    )
                    .at(&table.name),
                );
            }
        }
    }
}
