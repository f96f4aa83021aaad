//! SQL type name normalization across Postgres, MySQL and SQLite dialects.

use crudforge_ir::ColumnType;

/// Arguments written in parentheses after a type name.
#[derive(Debug, Default)]
pub(crate) struct TypeArgs {
    pub numbers: Vec<u32>,
    pub strings: Vec<String>,
}

/// A resolved column type plus whether the type implies auto-increment.
#[derive(Debug)]
pub(crate) struct ResolvedType {
    pub ty: ColumnType,
    pub auto_increment: bool,
}

impl ResolvedType {
    fn plain(ty: ColumnType) -> Self {
        Self {
            ty,
            auto_increment: false,
        }
    }

    fn serial(ty: ColumnType) -> Self {
        Self {
            ty,
            auto_increment: true,
        }
    }
}

/// Map a (lowercased, possibly multi-word) type name to a column type.
pub(crate) fn resolve(name: &str, args: &TypeArgs, raw: &str) -> ResolvedType {
    let first = args.numbers.first().copied();
    let second = args.numbers.get(1).copied();

    let ty = match name {
        "smallserial" | "serial2" => return ResolvedType::serial(ColumnType::SmallInt),
        "serial" | "serial4" => return ResolvedType::serial(ColumnType::Integer),
        "bigserial" | "serial8" => return ResolvedType::serial(ColumnType::BigInt),

        "tinyint" if first == Some(1) => ColumnType::Boolean,
        "tinyint" | "smallint" | "int2" => ColumnType::SmallInt,
        "mediumint" | "int" | "integer" | "int4" => ColumnType::Integer,
        "bigint" | "int8" => ColumnType::BigInt,

        "decimal" | "numeric" | "dec" | "money" => ColumnType::Decimal {
            precision: first,
            scale: second,
        },
        "real" | "float4" => ColumnType::Real,
        "float" if first.is_some_and(|p| p <= 24) => ColumnType::Real,
        "double" | "double precision" | "float8" | "float" => ColumnType::Double,

        "bool" | "boolean" => ColumnType::Boolean,
        "bit" if first.is_none_or(|n| n == 1) => ColumnType::Boolean,

        "char" | "character" | "nchar" | "bpchar" => ColumnType::Char(first),
        "varchar" | "nvarchar" | "varchar2" | "character varying" => ColumnType::Varchar(first),
        "text" | "tinytext" | "mediumtext" | "longtext" | "clob" | "citext" | "string"
        | "ntext" => ColumnType::Text,

        "uuid" | "uniqueidentifier" => ColumnType::Uuid,
        "date" => ColumnType::Date,
        "time" | "time without time zone" | "time with time zone" | "timetz" => ColumnType::Time,
        "timestamp" | "timestamp without time zone" | "datetime" | "datetime2"
        | "smalldatetime" => ColumnType::Timestamp,
        "timestamptz" | "timestamp with time zone" | "datetimeoffset" => ColumnType::TimestampTz,

        "json" | "jsonb" => ColumnType::Json,
        "bytea" | "blob" | "tinyblob" | "mediumblob" | "longblob" | "binary" | "varbinary"
        | "image" => ColumnType::Binary,
        "enum" => ColumnType::Enum(args.strings.clone()),

        _ => ColumnType::Other(raw.to_string()),
    };
    ResolvedType::plain(ty)
}
