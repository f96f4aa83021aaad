//! Schema loading by format.

use std::path::Path;

use crudforge_ir::{ParsedSchema, SchemaFormat};

use crate::{Error, Result, openapi::parse_openapi, sql::parse_sql};

/// Read and parse a schema file.
///
/// The format is taken from `format` when given, otherwise inferred from
/// the file extension.
pub fn load_schema(path: &Path, format: Option<SchemaFormat>) -> Result<ParsedSchema> {
    let format = match format {
        Some(format) => format,
        None => path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(SchemaFormat::from_extension)
            .ok_or_else(|| {
                Box::new(Error::UnknownFormat {
                    path: path.to_path_buf(),
                })
            })?,
    };
    let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let filename = path.display().to_string();
    tracing::info!(path = %filename, ?format, "loading schema");
    parse_schema(&content, &filename, format)
}

/// Parse schema text in the given format.
pub fn parse_schema(content: &str, filename: &str, format: SchemaFormat) -> Result<ParsedSchema> {
    match format {
        SchemaFormat::Sql => parse_sql(content, filename),
        SchemaFormat::OpenApi => parse_openapi(content, filename),
    }
}
