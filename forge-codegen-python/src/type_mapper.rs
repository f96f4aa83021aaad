//! Python type mapper implementation.

use crudforge_codegen::TypeMapper;
use crudforge_ir::ColumnType;

use crate::py_file::quote;

/// What a generated module must import to use a mapped type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PyImport {
    /// `import module`
    Module(&'static str),
    /// `from module import symbol`
    From(&'static str, &'static str),
}

/// Maps column types to Python annotations and SQLAlchemy column types.
///
/// Annotations are shared by the ORM models and the pydantic schemas, so
/// `datetime.datetime` and `uuid.UUID` are spelled with their module.
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonTypeMapper;

impl TypeMapper for PythonTypeMapper {
    fn map_type(&self, ty: &ColumnType) -> String {
        match ty {
            ColumnType::SmallInt | ColumnType::Integer | ColumnType::BigInt => "int".into(),
            ColumnType::Decimal { .. } => "Decimal".into(),
            ColumnType::Real | ColumnType::Double => "float".into(),
            ColumnType::Boolean => "bool".into(),
            ColumnType::Char(_)
            | ColumnType::Varchar(_)
            | ColumnType::Text
            | ColumnType::Enum(_)
            | ColumnType::Other(_) => "str".into(),
            ColumnType::Uuid => "uuid.UUID".into(),
            ColumnType::Date => "datetime.date".into(),
            ColumnType::Time => "datetime.time".into(),
            ColumnType::Timestamp | ColumnType::TimestampTz => "datetime.datetime".into(),
            ColumnType::Json => "Any".into(),
            ColumnType::Binary => "bytes".into(),
        }
    }

    fn map_optional(&self, ty: &ColumnType) -> String {
        format!("{} | None", self.map_type(ty))
    }
}

impl PythonTypeMapper {
    /// Annotation used in request and response schemas. Enums narrow to a
    /// `Literal` of their values.
    pub fn schema_type(&self, ty: &ColumnType) -> String {
        match ty {
            ColumnType::Enum(values) if !values.is_empty() => format!(
                "Literal[{}]",
                values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(", ")
            ),
            other => self.map_type(other),
        }
    }

    pub fn import_for(&self, ty: &ColumnType) -> Option<PyImport> {
        match ty {
            ColumnType::Decimal { .. } => Some(PyImport::From("decimal", "Decimal")),
            ColumnType::Uuid => Some(PyImport::Module("uuid")),
            ColumnType::Date | ColumnType::Time | ColumnType::Timestamp | ColumnType::TimestampTz => {
                Some(PyImport::Module("datetime"))
            }
            ColumnType::Json => Some(PyImport::From("typing", "Any")),
            _ => None,
        }
    }

    /// SQLAlchemy column type expression and the symbol it needs from
    /// `sqlalchemy`.
    pub fn column_type(&self, ty: &ColumnType) -> (String, &'static str) {
        match ty {
            ColumnType::SmallInt => ("SmallInteger".into(), "SmallInteger"),
            ColumnType::Integer => ("Integer".into(), "Integer"),
            ColumnType::BigInt => ("BigInteger".into(), "BigInteger"),
            ColumnType::Decimal { precision, scale } => {
                let expr = match (precision, scale) {
                    (Some(p), Some(s)) => format!("Numeric({}, {})", p, s),
                    (Some(p), None) => format!("Numeric({})", p),
                    _ => "Numeric".into(),
                };
                (expr, "Numeric")
            }
            ColumnType::Real => ("Float".into(), "Float"),
            ColumnType::Double => ("Double".into(), "Double"),
            ColumnType::Boolean => ("Boolean".into(), "Boolean"),
            ColumnType::Char(Some(n)) => (format!("CHAR({})", n), "CHAR"),
            ColumnType::Char(None) => ("CHAR(1)".into(), "CHAR"),
            ColumnType::Varchar(Some(n)) => (format!("String({})", n), "String"),
            ColumnType::Varchar(None) => ("String".into(), "String"),
            ColumnType::Text | ColumnType::Other(_) => ("Text".into(), "Text"),
            ColumnType::Uuid => ("Uuid".into(), "Uuid"),
            ColumnType::Date => ("Date".into(), "Date"),
            ColumnType::Time => ("Time".into(), "Time"),
            ColumnType::Timestamp => ("DateTime".into(), "DateTime"),
            ColumnType::TimestampTz => ("DateTime(timezone=True)".into(), "DateTime"),
            ColumnType::Json => ("JSON".into(), "JSON"),
            ColumnType::Binary => ("LargeBinary".into(), "LargeBinary"),
            ColumnType::Enum(values) => {
                let longest = values.iter().map(|v| v.chars().count()).max().unwrap_or(1);
                (format!("String({})", longest), "String")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_annotations() {
        let mapper = PythonTypeMapper;
        assert_eq!(mapper.map_type(&ColumnType::BigInt), "int");
        assert_eq!(mapper.map_type(&ColumnType::Uuid), "uuid.UUID");
        assert_eq!(mapper.map_optional(&ColumnType::Text), "str | None");
        assert_eq!(
            mapper.schema_type(&ColumnType::Enum(vec!["draft".into(), "live".into()])),
            "Literal[\"draft\", \"live\"]"
        );
    }

    #[test]
    fn test_column_types() {
        let mapper = PythonTypeMapper;
        assert_eq!(
            mapper.column_type(&ColumnType::Decimal { precision: Some(10), scale: Some(2) }),
            ("Numeric(10, 2)".to_string(), "Numeric")
        );
        assert_eq!(
            mapper.column_type(&ColumnType::TimestampTz).0,
            "DateTime(timezone=True)"
        );
        assert_eq!(
            mapper.column_type(&ColumnType::Enum(vec!["a".into(), "abc".into()])).0,
            "String(3)"
        );
    }

    #[test]
    fn test_imports() {
        let mapper = PythonTypeMapper;
        assert_eq!(mapper.import_for(&ColumnType::Date), Some(PyImport::Module("datetime")));
        assert_eq!(mapper.import_for(&ColumnType::Boolean), None);
    }
}
