//! Parsed schema model: tables and columns as the source declares them.

use serde::Serialize;

use crate::{ColumnType, SchemaFormat};

/// Column names treated as bookkeeping rather than payload.
const TIMESTAMP_COLUMNS: &[&str] = &["created_at", "updated_at", "inserted_at"];

/// All tables parsed from one schema source.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedSchema {
    /// Source path or display name.
    pub source: String,
    pub format: SchemaFormat,
    pub tables: Vec<SqlTable>,
}

impl ParsedSchema {
    pub fn new(source: impl Into<String>, format: SchemaFormat) -> Self {
        Self {
            source: source.into(),
            format,
            tables: Vec::new(),
        }
    }

    /// Look up a table by name (case-insensitive).
    pub fn table(&self, name: &str) -> Option<&SqlTable> {
        self.tables
            .iter()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    pub fn table_mut(&mut self, name: &str) -> Option<&mut SqlTable> {
        self.tables
            .iter_mut()
            .find(|t| t.name.eq_ignore_ascii_case(name))
    }

    /// Whether `table` lowers to a many-to-many link rather than an entity.
    ///
    /// It must be junction-shaped and both sides must reference declared
    /// tables that are not junction-shaped themselves.
    pub fn links_entities(&self, table: &SqlTable) -> bool {
        table.junction_sides().is_some_and(|(left, right)| {
            [left, right].iter().all(|fk| {
                self.table(&fk.ref_table)
                    .is_some_and(|target| !target.is_junction())
            })
        })
    }
}

/// Where a table definition came from, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableOrigin {
    /// Byte range of the `CREATE TABLE` statement.
    Ddl { offset: usize, len: usize },
    /// Name of the OpenAPI component schema.
    OpenApi { schema: String },
    /// Synthesized from cross-references (OpenAPI array of `$ref`).
    Synthesized,
}

/// A database table.
#[derive(Debug, Clone, Serialize)]
pub struct SqlTable {
    pub name: String,
    pub columns: Vec<SqlColumn>,
    /// Primary key columns, in key order.
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub unique_constraints: Vec<Vec<String>>,
    pub comment: Option<String>,
    pub origin: TableOrigin,
}

impl SqlTable {
    pub fn new(name: impl Into<String>, origin: TableOrigin) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
            unique_constraints: Vec::new(),
            comment: None,
            origin,
        }
    }

    pub fn column(&self, name: &str) -> Option<&SqlColumn> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut SqlColumn> {
        self.columns
            .iter_mut()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Mark columns as the primary key, keeping column flags in sync.
    pub fn set_primary_key(&mut self, columns: Vec<String>) {
        for col in &mut self.columns {
            let is_key = columns.iter().any(|k| k.eq_ignore_ascii_case(&col.name));
            col.primary_key = is_key;
            if is_key {
                col.nullable = false;
            }
        }
        self.primary_key = columns;
    }

    /// Foreign key whose single column is `column`.
    pub fn foreign_key_for(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys
            .iter()
            .find(|fk| fk.columns.len() == 1 && fk.columns[0].eq_ignore_ascii_case(column))
    }

    /// Returns the two link sides when this table only joins two others.
    ///
    /// A junction has exactly two single-column foreign keys. Any other column
    /// must be a surrogate key or a bookkeeping timestamp, and the primary key
    /// is empty, the surrogate, or the pair of link columns.
    pub fn junction_sides(&self) -> Option<(&ForeignKey, &ForeignKey)> {
        let [left, right] = self.foreign_keys.as_slice() else {
            return None;
        };
        if left.columns.len() != 1 || right.columns.len() != 1 {
            return None;
        }
        let link = [left.columns[0].as_str(), right.columns[0].as_str()];
        if link[0].eq_ignore_ascii_case(link[1]) {
            return None;
        }

        let is_link = |name: &str| link.iter().any(|l| l.eq_ignore_ascii_case(name));
        let mut surrogate: Option<&str> = None;
        for col in &self.columns {
            if is_link(&col.name) {
                continue;
            }
            let lower = col.name.to_ascii_lowercase();
            if TIMESTAMP_COLUMNS.contains(&lower.as_str()) {
                continue;
            }
            if surrogate.is_none() && (lower == "id" || col.auto_increment) {
                surrogate = Some(&col.name);
                continue;
            }
            return None;
        }

        let key_ok = match self.primary_key.as_slice() {
            [] => true,
            [single] => surrogate.is_some_and(|s| s.eq_ignore_ascii_case(single)),
            [a, b] => is_link(a) && is_link(b),
            _ => false,
        };
        key_ok.then_some((left, right))
    }

    pub fn is_junction(&self) -> bool {
        self.junction_sides().is_some()
    }
}

/// A table column.
#[derive(Debug, Clone, Serialize)]
pub struct SqlColumn {
    pub name: String,
    pub ty: ColumnType,
    /// Type as written in the source.
    pub raw_type: String,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub auto_increment: bool,
    /// Default expression as written.
    pub default: Option<String>,
    pub comment: Option<String>,
    /// Value managed by the server (OpenAPI `readOnly`).
    pub read_only: bool,
}

impl SqlColumn {
    pub fn new(name: impl Into<String>, ty: ColumnType) -> Self {
        let ty_raw = ty.to_string();
        Self {
            name: name.into(),
            ty,
            raw_type: ty_raw,
            nullable: true,
            primary_key: false,
            unique: false,
            auto_increment: false,
            default: None,
            comment: None,
            read_only: false,
        }
    }

    /// Whether the database supplies the value on insert.
    pub fn is_database_generated(&self) -> bool {
        if self.auto_increment || self.read_only {
            return true;
        }
        let Some(default) = &self.default else {
            return false;
        };
        let lower = default.to_ascii_lowercase();
        [
            "now()",
            "current_timestamp",
            "current_date",
            "gen_random_uuid()",
            "uuid_generate_v4()",
            "uuid()",
        ]
        .iter()
        .any(|f| lower.starts_with(f))
    }
}

/// A foreign key constraint.
#[derive(Debug, Clone, Serialize)]
pub struct ForeignKey {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub ref_table: String,
    /// Referenced columns. Empty means the referenced table's primary key.
    pub ref_columns: Vec<String>,
    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

impl ForeignKey {
    pub fn new(columns: Vec<String>, ref_table: impl Into<String>, ref_columns: Vec<String>) -> Self {
        Self {
            name: None,
            columns,
            ref_table: ref_table.into(),
            ref_columns,
            on_delete: None,
            on_update: None,
        }
    }
}

/// Action taken on referencing rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    SetDefault,
    Restrict,
    NoAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link_table(extra: &[&str], pk: &[&str]) -> SqlTable {
        let mut table = SqlTable::new("post_tags", TableOrigin::Synthesized);
        for name in extra {
            table.columns.push(SqlColumn::new(*name, ColumnType::BigInt));
        }
        table.columns.push(SqlColumn::new("post_id", ColumnType::BigInt));
        table.columns.push(SqlColumn::new("tag_id", ColumnType::BigInt));
        table.foreign_keys.push(ForeignKey::new(
            vec!["post_id".into()],
            "posts",
            vec!["id".into()],
        ));
        table.foreign_keys.push(ForeignKey::new(
            vec!["tag_id".into()],
            "tags",
            vec!["id".into()],
        ));
        table.set_primary_key(pk.iter().map(|s| s.to_string()).collect());
        table
    }

    fn keyed(name: &str) -> SqlTable {
        let mut table = SqlTable::new(name, TableOrigin::Synthesized);
        table.columns.push(SqlColumn::new("id", ColumnType::BigInt));
        table.set_primary_key(vec!["id".into()]);
        table
    }

    #[test]
    fn test_junction_with_composite_key() {
        let table = link_table(&[], &["post_id", "tag_id"]);
        let (left, right) = table.junction_sides().unwrap();
        assert_eq!(left.ref_table, "posts");
        assert_eq!(right.ref_table, "tags");
    }

    #[test]
    fn test_junction_with_surrogate_and_timestamps() {
        let table = link_table(&["id", "created_at"], &["id"]);
        assert!(table.is_junction());
    }

    #[test]
    fn test_payload_column_disqualifies_junction() {
        let table = link_table(&["quantity"], &["post_id", "tag_id"]);
        assert!(!table.is_junction());
    }

    #[test]
    fn test_single_foreign_key_is_not_junction() {
        let mut table = link_table(&[], &[]);
        table.foreign_keys.pop();
        assert!(!table.is_junction());
    }

    #[test]
    fn test_set_primary_key_clears_nullable() {
        let table = link_table(&[], &["post_id", "tag_id"]);
        assert!(table.columns.iter().all(|c| c.primary_key && !c.nullable));
    }

    #[test]
    fn test_database_generated_defaults() {
        let mut col = SqlColumn::new("created_at", ColumnType::TimestampTz);
        assert!(!col.is_database_generated());
        col.default = Some("CURRENT_TIMESTAMP".into());
        assert!(col.is_database_generated());
        col.default = Some("'draft'".into());
        assert!(!col.is_database_generated());
    }

    #[test]
    fn test_origin_serializes_with_kind_tag() {
        let ddl = serde_json::to_value(TableOrigin::Ddl { offset: 12, len: 40 }).unwrap();
        assert_eq!(ddl, serde_json::json!({ "kind": "ddl", "offset": 12, "len": 40 }));

        let table = SqlTable::new(
            "pets",
            TableOrigin::OpenApi {
                schema: "Pet".into(),
            },
        );
        let value = serde_json::to_value(&table).unwrap();
        assert_eq!(value["origin"], serde_json::json!({ "kind": "open_api", "schema": "Pet" }));
        assert_eq!(
            serde_json::to_value(TableOrigin::Synthesized).unwrap(),
            serde_json::json!({ "kind": "synthesized" })
        );
    }

    #[test]
    fn test_links_entities_requires_entity_sides() {
        let mut schema = ParsedSchema::new("schema.sql", SchemaFormat::Sql);
        schema.tables.push(keyed("posts"));
        schema.tables.push(keyed("tags"));
        schema.tables.push(link_table(&[], &["post_id", "tag_id"]));

        let mut nested = SqlTable::new("post_tag_votes", TableOrigin::Synthesized);
        for (column, target) in [("post_tag_id", "post_tags"), ("tag_id", "tags")] {
            nested.columns.push(SqlColumn::new(column, ColumnType::BigInt));
            nested.foreign_keys.push(ForeignKey::new(
                vec![column.into()],
                target,
                vec!["id".into()],
            ));
        }
        schema.tables.push(nested);

        let links: Vec<_> = schema
            .tables
            .iter()
            .map(|t| (t.name.as_str(), schema.links_entities(t)))
            .collect();
        assert_eq!(
            links,
            [
                ("posts", false),
                ("tags", false),
                ("post_tags", true),
                ("post_tag_votes", false),
            ]
        );
    }
}
