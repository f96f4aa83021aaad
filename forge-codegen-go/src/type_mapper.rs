//! Go type mapper implementation.

use crudforge_codegen::TypeMapper;
use crudforge_ir::ColumnType;

/// Maps column types to Go field types.
///
/// Timestamps with a zone become `time.Time`. Dates, times of day and naive
/// timestamps travel as strings, since `encoding/json` only reads RFC 3339
/// with an offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoTypeMapper;

impl TypeMapper for GoTypeMapper {
    fn map_type(&self, ty: &ColumnType) -> String {
        match ty {
            ColumnType::SmallInt => "int16".into(),
            ColumnType::Integer => "int32".into(),
            ColumnType::BigInt => "int64".into(),
            ColumnType::Decimal { .. } | ColumnType::Double => "float64".into(),
            ColumnType::Real => "float32".into(),
            ColumnType::Boolean => "bool".into(),
            ColumnType::TimestampTz => "time.Time".into(),
            ColumnType::Json => "json.RawMessage".into(),
            ColumnType::Binary => "[]byte".into(),
            ColumnType::Char(_)
            | ColumnType::Varchar(_)
            | ColumnType::Text
            | ColumnType::Uuid
            | ColumnType::Date
            | ColumnType::Time
            | ColumnType::Timestamp
            | ColumnType::Enum(_)
            | ColumnType::Other(_) => "string".into(),
        }
    }

    /// Slices are already nilable; everything else becomes a pointer.
    fn map_optional(&self, ty: &ColumnType) -> String {
        if self.is_nilable(ty) {
            self.map_type(ty)
        } else {
            format!("*{}", self.map_type(ty))
        }
    }
}

impl GoTypeMapper {
    pub fn is_nilable(&self, ty: &ColumnType) -> bool {
        matches!(ty, ColumnType::Json | ColumnType::Binary)
    }

    /// Type of an input field that may be absent from the request body.
    pub fn input_type(&self, ty: &ColumnType) -> String {
        self.map_optional(ty)
    }

    /// Standard library package a mapped type needs.
    pub fn import_for(&self, ty: &ColumnType) -> Option<&'static str> {
        match ty {
            ColumnType::TimestampTz => Some("time"),
            ColumnType::Json => Some("encoding/json"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_types() {
        let mapper = GoTypeMapper;
        assert_eq!(mapper.map_type(&ColumnType::BigInt), "int64");
        assert_eq!(mapper.map_type(&ColumnType::Decimal { precision: Some(10), scale: Some(2) }), "float64");
        assert_eq!(mapper.map_type(&ColumnType::Uuid), "string");
        assert_eq!(mapper.map_type(&ColumnType::TimestampTz), "time.Time");
    }

    #[test]
    fn test_optional_types() {
        let mapper = GoTypeMapper;
        assert_eq!(mapper.map_optional(&ColumnType::Varchar(Some(100))), "*string");
        assert_eq!(mapper.map_optional(&ColumnType::Json), "json.RawMessage");
        assert_eq!(mapper.import_for(&ColumnType::Json), Some("encoding/json"));
        assert_eq!(mapper.import_for(&ColumnType::Date), None);
    }
}
