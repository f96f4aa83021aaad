use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Result type for schema operations (boxed to reduce size on stack)
pub type Result<T> = std::result::Result<T, Box<Error>>;

/// Source context for error reporting.
///
/// Holds the source text and its display name so error factories do not
/// need both passed around.
///
/// # Example
///
/// ```ignore
/// let ctx = SourceContext::new(sql, "schema.sql");
/// return Err(ctx.sql_error("expected column type", span, None));
/// ```
#[derive(Debug, Clone)]
pub struct SourceContext {
    src: String,
    filename: String,
}

impl SourceContext {
    /// Create a new source context.
    pub fn new(src: impl Into<String>, filename: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            filename: filename.into(),
        }
    }

    /// Get the source content.
    pub fn src(&self) -> &str {
        &self.src
    }

    /// Get the filename.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Create a NamedSource for miette error reporting.
    pub fn named_source(&self) -> NamedSource<String> {
        NamedSource::new(&self.filename, self.src.clone())
    }

    /// Create a config parse error from a toml error.
    pub fn config_error(&self, source: toml::de::Error) -> Box<Error> {
        let span = source.span().map(SourceSpan::from);
        Box::new(Error::Config {
            src: self.named_source(),
            span,
            source,
        })
    }

    /// Create a SQL syntax error.
    pub fn sql_error(
        &self,
        message: impl Into<String>,
        span: impl Into<SourceSpan>,
        help: Option<String>,
    ) -> Box<Error> {
        Box::new(Error::Sql {
            src: self.named_source(),
            span: span.into(),
            message: message.into(),
            help,
        })
    }

    /// Create a document syntax error from a 1-based line/column position.
    pub fn document_error(
        &self,
        message: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Box<Error> {
        let span = (line > 0).then(|| SourceSpan::from((self.offset_of(line, column), 1)));
        Box::new(Error::Document {
            src: self.named_source(),
            span,
            message: message.into(),
        })
    }

    /// Create a validation error without a span.
    pub fn validation_error(&self, message: impl Into<String>) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span: None,
            message: message.into(),
        })
    }

    /// Create a validation error with a span.
    pub fn validation_error_at(
        &self,
        message: impl Into<String>,
        span: impl Into<SourceSpan>,
    ) -> Box<Error> {
        Box::new(Error::Validation {
            src: self.named_source(),
            span: Some(span.into()),
            message: message.into(),
        })
    }

    /// Locate the first occurrence of `needle` for labeling.
    pub fn find_span(&self, needle: &str) -> Option<SourceSpan> {
        self.src
            .find(needle)
            .map(|offset| SourceSpan::from((offset, needle.len())))
    }

    fn offset_of(&self, line: usize, column: usize) -> usize {
        let line_start: usize = self
            .src
            .split_inclusive('\n')
            .take(line.saturating_sub(1))
            .map(str::len)
            .sum();
        (line_start + column.saturating_sub(1)).min(self.src.len().saturating_sub(1))
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read '{path}'")]
    #[diagnostic(help("run 'forge init' to create a new project"))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse forge.toml")]
    #[diagnostic(code(forge::config_error))]
    Config {
        #[source_code]
        src: NamedSource<String>,
        #[label("parse error here")]
        span: Option<SourceSpan>,
        #[source]
        source: toml::de::Error,
    },

    #[error("{message}")]
    #[diagnostic(code(forge::sql_syntax))]
    Sql {
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error("invalid schema document: {message}")]
    #[diagnostic(code(forge::document_syntax))]
    Document {
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("{message}")]
    #[diagnostic(code(forge::openapi))]
    OpenApi {
        message: String,
        #[help]
        pointer: Option<String>,
    },

    #[error("unresolved reference '{reference}' at {pointer}")]
    #[diagnostic(
        code(forge::unresolved_ref),
        help("only local references of the form '#/components/schemas/<Name>' are supported")
    )]
    UnresolvedRef { reference: String, pointer: String },

    #[error("{message}")]
    #[diagnostic(code(forge::validation_error))]
    Validation {
        #[source_code]
        src: NamedSource<String>,
        #[label("{message}")]
        span: Option<SourceSpan>,
        message: String,
    },

    #[error("target '{name}' is not supported")]
    #[diagnostic(code(forge::unsupported_target), help("{help}"))]
    UnsupportedTarget { name: String, help: String },

    #[error("cannot tell the schema format of '{path}'")]
    #[diagnostic(help(
        "use a .sql, .json, .yaml or .yml extension, or set [schema] format = \"sql\" | \"openapi\""
    ))]
    UnknownFormat { path: PathBuf },
}

impl Error {
    /// Create an I/O error for a path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Box<Self> {
        Box::new(Error::Io {
            path: path.into(),
            source,
        })
    }

    /// Create an OpenAPI structure error at a JSON pointer
    pub fn openapi(message: impl Into<String>, pointer: impl Into<String>) -> Box<Self> {
        let pointer = pointer.into();
        Box::new(Error::OpenApi {
            message: message.into(),
            pointer: (!pointer.is_empty()).then(|| format!("at {}", pointer)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_of_line_column() {
        let ctx = SourceContext::new("a: 1\nbb: 2\n", "doc.yaml");
        assert_eq!(ctx.offset_of(1, 1), 0);
        assert_eq!(ctx.offset_of(2, 2), 6);
    }

    #[test]
    fn test_find_span() {
        let ctx = SourceContext::new("CREATE TABLE posts ();", "schema.sql");
        let span = ctx.find_span("posts").unwrap();
        assert_eq!(span.offset(), 13);
        assert_eq!(span.len(), 5);
    }

    #[test]
    fn test_openapi_error_pointer() {
        let err = Error::openapi("schema has no properties", "/components/schemas/Post");
        match *err {
            Error::OpenApi { pointer, .. } => {
                assert_eq!(pointer.as_deref(), Some("at /components/schemas/Post"))
            }
            _ => panic!("expected OpenApi error"),
        }
    }
}
