//! Lint for identifiers reserved in the target language.

use crudforge_ir::ParsedSchema;

use super::super::Lint;
use crate::{language::NamingConvention, pipeline::Diagnostic};

/// Warns when a table or column name becomes a reserved word once converted
/// to the target's identifier style. Generated code escapes such names.
pub struct ReservedWordLint {
    naming: &'static NamingConvention,
}

impl ReservedWordLint {
    pub fn new(naming: &'static NamingConvention) -> Self {
        Self { naming }
    }
}

impl Lint for ReservedWordLint {
    fn name(&self) -> &'static str {
        "reserved-word"
    }

    fn description(&self) -> &'static str {
        "Names that collide with target language keywords"
    }

    fn check(&self, schema: &ParsedSchema, diagnostics: &mut Vec<Diagnostic>) {
        let naming = self.naming;
        for table in &schema.tables {
            let type_name = (naming.to_type)(&table.name);
            if naming.is_reserved(&type_name) {
                diagnostics.push(
                    Diagnostic::warning(
                        self.name(),
                        format!(
                            "table '{}' maps to '{}', a reserved word in {}",
                            table.name, type_name, naming.language
                        ),
                    )
                    .at(&table.name),
                );
            }

            for column in &table.columns {
                if naming.field_is_reserved(&column.name) {
                    diagnostics.push(
                        Diagnostic::warning(
                            self.name(),
                            format!(
                                "column '{}' is a reserved word in {}; it is emitted as '{}'",
                                column.name,
                                naming.language,
                                naming.field_name(&column.name)
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
    use crate::language::{JAVA_NAMING, RUST_NAMING};

    fn check(naming: &'static NamingConvention) -> Vec<String> {
        let schema = parse_sql(
            "CREATE TABLE posts (id INT PRIMARY KEY, type TEXT, \"default\" BOOLEAN);",
            "schema.sql",
        )
        .unwrap();
        let mut diagnostics = Vec::new();
        ReservedWordLint::new(naming).check(&schema, &mut diagnostics);
        diagnostics.into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_rust_reserved_columns() {
        assert_eq!(
            check(&RUST_NAMING),
            ["column 'type' is a reserved word in Rust; it is emitted as 'r#type'"]
        );
    }

    #[test]
    fn test_java_reserved_columns() {
        assert_eq!(
            check(&JAVA_NAMING),
            ["column 'default' is a reserved word in Java; it is emitted as 'default_'"]
        );
    }
}
