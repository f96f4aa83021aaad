//! Java type mapper implementation.

use crudforge_codegen::TypeMapper;
use crudforge_ir::ColumnType;

/// Maps column types to boxed Java types, so every field can hold `null`.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaTypeMapper;

impl TypeMapper for JavaTypeMapper {
    fn map_type(&self, ty: &ColumnType) -> String {
        match ty {
            ColumnType::SmallInt => "Short",
            ColumnType::Integer => "Integer",
            ColumnType::BigInt => "Long",
            ColumnType::Decimal { .. } => "BigDecimal",
            ColumnType::Real => "Float",
            ColumnType::Double => "Double",
            ColumnType::Boolean => "Boolean",
            ColumnType::Char(_)
            | ColumnType::Varchar(_)
            | ColumnType::Text
            | ColumnType::Enum(_)
            | ColumnType::Other(_) => "String",
            ColumnType::Uuid => "UUID",
            ColumnType::Date => "LocalDate",
            ColumnType::Time => "LocalTime",
            ColumnType::Timestamp => "LocalDateTime",
            ColumnType::TimestampTz => "OffsetDateTime",
            ColumnType::Json => "JsonNode",
            ColumnType::Binary => "byte[]",
        }
        .to_string()
    }

    /// Boxed types are already nullable.
    fn map_optional(&self, ty: &ColumnType) -> String {
        self.map_type(ty)
    }
}

impl JavaTypeMapper {
    /// Fully qualified class a mapped type needs imported.
    pub fn import_for(&self, ty: &ColumnType) -> Option<&'static str> {
        match ty {
            ColumnType::Decimal { .. } => Some("java.math.BigDecimal"),
            ColumnType::Uuid => Some("java.util.UUID"),
            ColumnType::Date => Some("java.time.LocalDate"),
            ColumnType::Time => Some("java.time.LocalTime"),
            ColumnType::Timestamp => Some("java.time.LocalDateTime"),
            ColumnType::TimestampTz => Some("java.time.OffsetDateTime"),
            ColumnType::Json => Some("com.fasterxml.jackson.databind.JsonNode"),
            _ => None,
        }
    }

    /// Extra `@Column` attributes describing the column's size.
    pub fn column_attributes(&self, ty: &ColumnType) -> Vec<String> {
        match ty {
            ColumnType::Char(Some(n)) | ColumnType::Varchar(Some(n)) => {
                vec![format!("length = {n}")]
            }
            ColumnType::Decimal { precision, scale } => {
                let mut attrs = Vec::new();
                if let Some(p) = precision {
                    attrs.push(format!("precision = {p}"));
                }
                if let Some(s) = scale {
                    attrs.push(format!("scale = {s}"));
                }
                attrs
            }
            _ => Vec::new(),
        }
    }
}
