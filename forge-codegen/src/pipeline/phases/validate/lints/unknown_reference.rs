//! Lint for foreign keys that point nowhere.

use crudforge_ir::{ForeignKey, ParsedSchema, SqlTable};

use super::super::Lint;
use crate::pipeline::Diagnostic;

/// Errors on foreign keys to missing tables or columns.
pub struct UnknownReferenceLint;

impl UnknownReferenceLint {
    fn check_fk(
        &self,
        schema: &ParsedSchema,
        table: &SqlTable,
        fk: &ForeignKey,
        diagnostics: &mut Vec<Diagnostic>,
    ) {
        let location = format!("{}.{}", table.name, fk.columns.join(","));
        let mut error = |message: String| {
            diagnostics.push(Diagnostic::error(self.name(), message).at(&location));
        };

        for column in &fk.columns {
            if table.column(column).is_none() {
                error(format!(
                    "foreign key column '{}' does not exist in table '{}'",
                    column, table.name
                ));
            }
        }

        let Some(target) = schema.table(&fk.ref_table) else {
            error(format!(
                "foreign key '{}' references unknown table '{}'",
                location, fk.ref_table
            ));
            return;
        };

        if fk.ref_columns.is_empty() {
            if target.primary_key.is_empty() {
                error(format!(
                    "foreign key '{}' references table '{}', which has no primary key",
                    location, target.name
                ));
            }
            return;
        }

        for column in &fk.ref_columns {
            if target.column(column).is_none() {
                error(format!(
                    "foreign key '{}' references unknown column '{}.{}'",
                    location, target.name, column
                ));
            }
        }
    }
}

impl Lint for UnknownReferenceLint {
    fn name(&self) -> &'static str {
        "unknown-reference"
    }

    fn description(&self) -> &'static str {
        "Foreign keys must reference existing tables and columns"
    }

    fn check(&self, schema: &ParsedSchema, diagnostics: &mut Vec<Diagnostic>) {
        for table in &schema.tables {
            for fk in &table.foreign_keys {
                self.check_fk(schema, table, fk, diagnostics);
            }
        }
    }
}
