//! JSON Schema `type`/`format` to column type mapping.

use crudforge_ir::ColumnType;
use serde_json::Value;

/// Primary type name and whether `null` is allowed by the type itself
/// (OpenAPI 3.1 `type: [string, "null"]`).
fn type_name(schema: &Value) -> (Option<&str>, bool) {
    match schema.get("type") {
        Some(Value::String(s)) => (Some(s.as_str()), false),
        Some(Value::Array(list)) => {
            let names: Vec<&str> = list.iter().filter_map(Value::as_str).collect();
            let nullable = names.contains(&"null");
            (names.into_iter().find(|n| *n != "null"), nullable)
        }
        _ => (None, false),
    }
}

/// Map a property schema to a column type.
pub(crate) fn map_type(schema: &Value) -> (ColumnType, bool) {
    let (name, nullable) = type_name(schema);
    let format = schema.get("format").and_then(Value::as_str);
    let max_length = schema
        .get("maxLength")
        .and_then(Value::as_u64)
        .and_then(|n| u32::try_from(n).ok());

    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        let values = values
            .iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect();
        return (ColumnType::Enum(values), nullable);
    }

    let ty = match (name, format) {
        (Some("integer"), Some("int64")) => ColumnType::BigInt,
        (Some("integer"), Some("int16")) => ColumnType::SmallInt,
        (Some("integer"), _) => ColumnType::Integer,
        (Some("number"), Some("float")) => ColumnType::Real,
        (Some("number"), Some("decimal")) => ColumnType::Decimal {
            precision: None,
            scale: None,
        },
        (Some("number"), _) => ColumnType::Double,
        (Some("boolean"), _) => ColumnType::Boolean,
        (Some("string"), Some("date")) => ColumnType::Date,
        (Some("string"), Some("date-time")) => ColumnType::TimestampTz,
        (Some("string"), Some("time")) => ColumnType::Time,
        (Some("string"), Some("uuid")) => ColumnType::Uuid,
        (Some("string"), Some("binary" | "byte")) => ColumnType::Binary,
        (Some("string"), _) => match max_length {
            Some(n) => ColumnType::Varchar(Some(n)),
            None => ColumnType::Text,
        },
        (Some("object" | "array"), _) | (None, _) => ColumnType::Json,
        (Some(other), _) => ColumnType::Other(other.to_string()),
    };
    (ty, nullable)
}

/// Human-readable type label kept as the column's raw type.
pub(crate) fn describe(schema: &Value) -> String {
    let (name, _) = type_name(schema);
    let name = name.unwrap_or("object");
    match schema.get("format").and_then(Value::as_str) {
        Some(format) => format!("{}({})", name, format),
        None => name.to_string(),
    }
}

/// Render a JSON default as an SQL-style literal.
pub(crate) fn default_literal(value: &Value) -> String {
    match value {
        Value::String(s) => format!("'{}'", s.replace('\'', "''")),
        Value::Null => "NULL".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_map_formats() {
        assert_eq!(
            map_type(&json!({"type": "integer", "format": "int64"})).0,
            ColumnType::BigInt
        );
        assert_eq!(
            map_type(&json!({"type": "string", "format": "date-time"})).0,
            ColumnType::TimestampTz
        );
        assert_eq!(
            map_type(&json!({"type": "string", "maxLength": 32})).0,
            ColumnType::Varchar(Some(32))
        );
        assert_eq!(
            map_type(&json!({"type": "object"})).0,
            ColumnType::Json
        );
    }

    #[test]
    fn test_nullable_type_list() {
        let (ty, nullable) = map_type(&json!({"type": ["string", "null"]}));
        assert_eq!(ty, ColumnType::Text);
        assert!(nullable);
    }

    #[test]
    fn test_default_literal() {
        assert_eq!(default_literal(&json!("it's")), "'it''s'");
        assert_eq!(default_literal(&json!(3)), "3");
        assert_eq!(default_literal(&json!(true)), "true");
    }

    #[test]
    fn test_describe() {
        assert_eq!(
            describe(&json!({"type": "string", "format": "uuid"})),
            "string(uuid)"
        );
    }
}
