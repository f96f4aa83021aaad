use crudforge_ir::ParsedSchema;

use super::super::Lint;
use crate::pipeline::Diagnostic;

/// Notes foreign keys on nullable columns; their relations are optional.
pub struct NullableForeignKeyLint;

impl Lint for NullableForeignKeyLint {
    fn name(&self) -> &'static str {
        "nullable-foreign-key"
    }

    fn description(&self) -> &'static str {
        "Report optional relations"
    }

    fn check(&self, schema: &ParsedSchema, diagnostics: &mut Vec<Diagnostic>) {
        for table in schema.tables.iter().filter(|t| !schema.links_entities(t)) {
            for fk in table.foreign_keys.iter().filter(|fk| fk.columns.len() == 1) {
                let column = &fk.columns[0];
                if table.column(column).is_some_and(|c| c.nullable) {
                    diagnostics.push(
                        Diagnostic::info(
                            self.name(),
                            format!(
                                "'{}.{}' is nullable; the relation to '{}' is optional",
                                table.name, column, fk.ref_table
                            ),
                        )
                        .at(format!("{}.{}", table.name, column)),
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crudforge_schema::parse_sql;

    use super::*;

    #[test]
    fn test_nullable_fk_reported() {
        let schema = parse_sql(
            "CREATE TABLE users (id INT PRIMARY KEY);
             CREATE TABLE posts (
                id INT PRIMARY KEY,
                author_id INT NOT NULL REFERENCES users(id),
                editor_id INT REFERENCES users(id)
             );",
            "schema.sql",
        )
        .unwrap();

        let mut diagnostics = Vec::new();
        NullableForeignKeyLint.check(&schema, &mut diagnostics);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "'posts.editor_id' is nullable; the relation to 'users' is optional"
        );
        assert!(!diagnostics[0].severity.is_warning());
    }
}
