//! Rust type mapper implementation.

use crudforge_codegen::TypeMapper;
use crudforge_ir::ColumnType;

/// Maps column types to the Rust types sqlx decodes them into.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustTypeMapper;

impl TypeMapper for RustTypeMapper {
    fn map_type(&self, ty: &ColumnType) -> String {
        match ty {
            ColumnType::SmallInt => "i16",
            ColumnType::Integer => "i32",
            ColumnType::BigInt => "i64",
            ColumnType::Decimal { .. } => "rust_decimal::Decimal",
            ColumnType::Real => "f32",
            ColumnType::Double => "f64",
            ColumnType::Boolean => "bool",
            ColumnType::Char(_)
            | ColumnType::Varchar(_)
            | ColumnType::Text
            | ColumnType::Enum(_)
            | ColumnType::Other(_) => "String",
            ColumnType::Uuid => "uuid::Uuid",
            ColumnType::Date => "chrono::NaiveDate",
            ColumnType::Time => "chrono::NaiveTime",
            ColumnType::Timestamp => "chrono::NaiveDateTime",
            ColumnType::TimestampTz => "chrono::DateTime<chrono::Utc>",
            ColumnType::Json => "serde_json::Value",
            ColumnType::Binary => "Vec<u8>",
        }
        .to_string()
    }

    fn map_optional(&self, ty: &ColumnType) -> String {
        format!("Option<{}>", self.map_type(ty))
    }
}

impl RustTypeMapper {
    /// Whether values of this type are `Copy` and can be bound without cloning.
    pub fn is_copy(&self, ty: &ColumnType) -> bool {
        ty.is_integer()
            || ty.is_temporal()
            || matches!(
                ty,
                ColumnType::Decimal { .. }
                    | ColumnType::Real
                    | ColumnType::Double
                    | ColumnType::Boolean
                    | ColumnType::Uuid
            )
    }
}

#[cfg(test)]
mod tests {
    use crudforge_ir::Field;

    use super::*;

    #[test]
    fn test_map_type() {
        let mapper = RustTypeMapper;
        assert_eq!(mapper.map_type(&ColumnType::BigInt), "i64");
        assert_eq!(
            mapper.map_type(&ColumnType::TimestampTz),
            "chrono::DateTime<chrono::Utc>"
        );
        assert_eq!(mapper.map_type(&ColumnType::Varchar(Some(20))), "String");
        assert_eq!(mapper.map_optional(&ColumnType::Uuid), "Option<uuid::Uuid>");
    }

    #[test]
    fn test_map_field_respects_nullability() {
        let field = Field {
            name: "bio".into(),
            ty: ColumnType::Text,
            nullable: true,
            primary_key: false,
            unique: false,
            generated: false,
            default: None,
            references: None,
            description: None,
        };
        assert_eq!(RustTypeMapper.map_field(&field), "Option<String>");
    }

    #[test]
    fn test_is_copy() {
        assert!(RustTypeMapper.is_copy(&ColumnType::Uuid));
        assert!(!RustTypeMapper.is_copy(&ColumnType::Text));
    }
}
