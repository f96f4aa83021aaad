//! Lint for duplicate table and column names.

use std::collections::HashMap;

use crudforge_ir::ParsedSchema;

use super::super::Lint;
use crate::pipeline::Diagnostic;

/// Errors on tables (or columns within a table) whose names collide
/// case-insensitively.
pub struct DuplicateTableLint;

impl Lint for DuplicateTableLint {
    fn name(&self) -> &'static str {
        "duplicate-table"
    }

    fn description(&self) -> &'static str {
        "Detect duplicate table and column names"
    }

    fn check(&self, schema: &ParsedSchema, diagnostics: &mut Vec<Diagnostic>) {
        let mut tables: HashMap<String, &str> = HashMap::new();

        for table in &schema.tables {
            let normalized = table.name.to_lowercase();
            if let Some(first) = tables.get(&normalized) {
                diagnostics.push(
                    Diagnostic::error(
                        self.name(),
                        format!("duplicate table '{}' (conflicts with '{}')", table.name, first),
                    )
                    .at(&table.name),
                );
            } else {
                tables.insert(normalized, &table.name);
            }

            let mut columns: HashMap<String, &str> = HashMap::new();
            for column in &table.columns {
                let normalized = column.name.to_lowercase();
                if columns.insert(normalized, &column.name).is_some() {
                    diagnostics.push(
                        Diagnostic::error(
                            self.name(),
                            format!(
                                "duplicate column '{}' in table '{}'",
                                column.name, table.name
                            ),
                        )
                        .at(format!("{}.{}", table.name, column.name)),
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

    fn check(sql: &str) -> Vec<Diagnostic> {
        let schema = parse_sql(sql, "schema.sql").unwrap();
        let mut diagnostics = Vec::new();
        DuplicateTableLint.check(&schema, &mut diagnostics);
        diagnostics
    }

    #[test]
    fn test_no_duplicates() {
        assert!(check("CREATE TABLE a (id INT); CREATE TABLE b (id INT);").is_empty());
    }

    #[test]
    fn test_case_insensitive_tables() {
        let diagnostics = check(r#"CREATE TABLE "Posts" (id INT); CREATE TABLE posts (id INT);"#);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(
            diagnostics[0].message,
            "duplicate table 'posts' (conflicts with 'Posts')"
        );
    }

    #[test]
    fn test_duplicate_columns() {
        let diagnostics = check(r#"CREATE TABLE posts (id INT, "Title" TEXT, title TEXT);"#);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].location.as_deref(), Some("posts.title"));
    }
}
