//! TypeScript type mapper implementation.

use crudforge_codegen::TypeMapper;
use crudforge_ir::{ColumnType, DatabaseKind, Field};

/// Maps column types to the property types of TypeORM entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeScriptTypeMapper;

impl TypeMapper for TypeScriptTypeMapper {
    fn map_type(&self, ty: &ColumnType) -> String {
        match ty {
            ColumnType::SmallInt
            | ColumnType::Integer
            | ColumnType::BigInt
            | ColumnType::Decimal { .. }
            | ColumnType::Real
            | ColumnType::Double => "number".into(),
            ColumnType::Boolean => "boolean".into(),
            ColumnType::Char(_)
            | ColumnType::Varchar(_)
            | ColumnType::Text
            | ColumnType::Uuid
            | ColumnType::Date
            | ColumnType::Time
            | ColumnType::Other(_) => "string".into(),
            ColumnType::Timestamp | ColumnType::TimestampTz => "Date".into(),
            ColumnType::Json => "Record<string, unknown>".into(),
            ColumnType::Binary => "Buffer".into(),
            ColumnType::Enum(values) if !values.is_empty() => values
                .iter()
                .map(|v| format!("'{}'", v.replace('\'', "\\'")))
                .collect::<Vec<_>>()
                .join(" | "),
            ColumnType::Enum(_) => "string".into(),
        }
    }

    fn map_optional(&self, ty: &ColumnType) -> String {
        format!("{} | null", self.map_type(ty))
    }
}

impl TypeScriptTypeMapper {
    /// Type accepted in request bodies, where dates arrive as ISO strings
    /// and bytes as number arrays.
    pub fn dto_type(&self, ty: &ColumnType) -> String {
        match ty {
            ColumnType::Timestamp | ColumnType::TimestampTz => "string".into(),
            ColumnType::Binary => "number[]".into(),
            other => self.map_type(other),
        }
    }

    /// Whether values need converting between request body and entity.
    pub fn needs_conversion(&self, ty: &ColumnType) -> bool {
        matches!(
            ty,
            ColumnType::Timestamp | ColumnType::TimestampTz | ColumnType::Binary
        )
    }

    /// Convert a request value expression to its entity value.
    pub fn convert(&self, ty: &ColumnType, expr: &str) -> String {
        match ty {
            ColumnType::Timestamp | ColumnType::TimestampTz => format!("new Date({expr})"),
            ColumnType::Binary => format!("Buffer.from({expr})"),
            _ => expr.to_string(),
        }
    }

    /// TypeORM `@Column` type and the options it implies.
    pub fn column_options(&self, field: &Field, database: DatabaseKind) -> Vec<String> {
        let sqlite = database == DatabaseKind::Sqlite;
        let mysql = database == DatabaseKind::Mysql;
        let mut options = Vec::new();
        let ty = |s: &str| format!("type: '{}'", s);
        match &field.ty {
            ColumnType::SmallInt => options.push(ty("smallint")),
            ColumnType::Integer => options.push(ty(if sqlite { "integer" } else { "int" })),
            ColumnType::BigInt => options.push(ty(if sqlite { "integer" } else { "bigint" })),
            ColumnType::Decimal { precision, scale } => {
                options.push(ty("decimal"));
                if let Some(p) = precision {
                    options.push(format!("precision: {p}"));
                }
                if let Some(s) = scale {
                    options.push(format!("scale: {s}"));
                }
                options.push("transformer: decimalTransformer".into());
            }
            ColumnType::Real => options.push(ty(if mysql { "float" } else { "real" })),
            ColumnType::Double => options.push(ty(if mysql || sqlite {
                "double"
            } else {
                "double precision"
            })),
            ColumnType::Boolean => options.push(ty("boolean")),
            ColumnType::Char(len) => {
                options.push(ty("char"));
                if let Some(len) = len {
                    options.push(format!("length: {len}"));
                }
            }
            ColumnType::Varchar(len) => {
                options.push(ty("varchar"));
                if let Some(len) = len {
                    options.push(format!("length: {len}"));
                }
            }
            ColumnType::Text | ColumnType::Other(_) => options.push(ty("text")),
            ColumnType::Uuid => {
                if database == DatabaseKind::Postgres {
                    options.push(ty("uuid"));
                } else {
                    options.push(ty("varchar"));
                    options.push("length: 36".into());
                }
            }
            ColumnType::Date => options.push(ty("date")),
            ColumnType::Time => options.push(ty("time")),
            ColumnType::Timestamp => options.push(ty(if database == DatabaseKind::Postgres {
                "timestamp"
            } else {
                "datetime"
            })),
            ColumnType::TimestampTz => options.push(ty(match database {
                DatabaseKind::Postgres => "timestamptz",
                DatabaseKind::Mysql => "timestamp",
                DatabaseKind::Sqlite => "datetime",
            })),
            ColumnType::Json => options.push(ty(match database {
                DatabaseKind::Postgres => "jsonb",
                DatabaseKind::Mysql => "json",
                DatabaseKind::Sqlite => "simple-json",
            })),
            ColumnType::Binary => options.push(ty(if database == DatabaseKind::Postgres {
                "bytea"
            } else {
                "blob"
            })),
            ColumnType::Enum(values) => {
                options.push(ty(if sqlite { "simple-enum" } else { "enum" }));
                let values: Vec<String> = values.iter().map(|v| format!("'{}'", v)).collect();
                options.push(format!("enum: [{}]", values.join(", ")));
            }
        }
        options
    }
}
