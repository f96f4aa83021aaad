use crudforge_ir::ParsedSchema;

use super::super::Lint;
use crate::pipeline::Diagnostic;

/// Errors on tables without columns.
pub struct EmptyTableLint;

impl Lint for EmptyTableLint {
    fn name(&self) -> &'static str {
        "empty-table"
    }

    fn description(&self) -> &'static str {
        "Tables must declare at least one column"
    }

    fn check(&self, schema: &ParsedSchema, diagnostics: &mut Vec<Diagnostic>) {
        for table in schema.tables.iter().filter(|t| t.columns.is_empty()) {
            diagnostics.push(
                Diagnostic::error(self.name(), format!("table '{}' has no columns", table.name))
                    .at(&table.name),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use crudforge_ir::{SqlTable, TableOrigin};

    use super::*;

    #[test]
    fn test_empty_table() {
        let mut schema = ParsedSchema::new("api.yaml", crudforge_ir::SchemaFormat::OpenApi);
        schema.tables.push(SqlTable::new(
            "audits",
            TableOrigin::OpenApi {
                schema: "Audit".into(),
            },
        ));

        let mut diagnostics = Vec::new();
        EmptyTableLint.check(&schema, &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].message, "table 'audits' has no columns");
    }
}
