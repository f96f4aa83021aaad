//! Project configuration (`forge.toml`).

mod file;
mod target;

use std::path::PathBuf;

use crudforge_core::{Version, to_snake_case};
use crudforge_ir::{DatabaseKind, Features, ProjectMeta, SchemaFormat};
use miette::SourceSpan;
use serde::Deserialize;

pub use file::ForgeToml;
pub use target::Target;

use crate::{Result, error::SourceContext};

/// Root of forge.toml
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    pub project: ProjectSection,
    pub schema: SchemaSection,
    pub generate: GenerateSection,
    #[serde(default)]
    pub features: Features,
}

/// `[project]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectSection {
    pub name: String,
    /// Dotted namespace for JVM targets. Defaults to `com.example.<name>`.
    pub package: Option<String>,
    #[serde(default)]
    pub version: Version,
    pub description: Option<String>,
}

/// `[schema]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaSection {
    /// Path to the schema, relative to forge.toml.
    pub path: PathBuf,
    /// Inferred from the extension when absent.
    pub format: Option<SchemaFormat>,
}

/// `[generate]`
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateSection {
    pub target: Target,
    /// Output directory, relative to forge.toml.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub database: DatabaseKind,
}

fn default_output() -> PathBuf {
    PathBuf::from(".")
}

impl ProjectConfig {
    /// Build a configuration from command-line values alone.
    pub fn new(name: impl Into<String>, schema: impl Into<PathBuf>, target: Target) -> Self {
        Self {
            project: ProjectSection {
                name: name.into(),
                package: None,
                version: Version::default(),
                description: None,
            },
            schema: SchemaSection {
                path: schema.into(),
                format: None,
            },
            generate: GenerateSection {
                target,
                output: default_output(),
                database: DatabaseKind::default(),
            },
            features: Features::default(),
        }
    }

    /// Parse forge.toml content (uses "forge.toml" as filename)
    pub fn parse_str(content: &str) -> Result<Self> {
        Self::from_str_with_filename(content, "forge.toml")
    }

    /// Parse forge.toml content with a filename for error reporting
    pub fn from_str_with_filename(content: &str, filename: &str) -> Result<Self> {
        let ctx = SourceContext::new(content, filename);
        let config: Self = toml::from_str(content).map_err(|e| ctx.config_error(e))?;
        config.validate(&ctx)?;
        Ok(config)
    }

    fn validate(&self, ctx: &SourceContext) -> Result<()> {
        let name = &self.project.name;
        if let Some(reason) = validate_project_name(name) {
            return Err(self.invalid(ctx, name, format!("invalid project name '{}': {}", name, reason)));
        }
        if let Some(package) = &self.project.package {
            if let Some(reason) = validate_package(package) {
                return Err(self.invalid(
                    ctx,
                    package,
                    format!("invalid package '{}': {}", package, reason),
                ));
            }
        }
        if self.schema.path.as_os_str().is_empty() {
            return Err(ctx.validation_error("[schema] path must not be empty"));
        }
        Ok(())
    }

    fn invalid(&self, ctx: &SourceContext, value: &str, message: String) -> Box<crate::Error> {
        match find_value_span(ctx.src(), value) {
            Some(span) => ctx.validation_error_at(message, span),
            None => ctx.validation_error(message),
        }
    }

    /// Package namespace, defaulting to `com.example.<name>`.
    pub fn package(&self) -> String {
        self.project
            .package
            .clone()
            .unwrap_or_else(|| format!("com.example.{}", to_snake_case(&self.project.name)))
    }

    /// Schema format, explicit or inferred from the file extension.
    pub fn schema_format(&self) -> Option<SchemaFormat> {
        self.schema.format.or_else(|| {
            self.schema
                .path
                .extension()
                .and_then(|e| e.to_str())
                .and_then(SchemaFormat::from_extension)
        })
    }

    /// Project metadata handed to the domain model.
    pub fn meta(&self) -> ProjectMeta {
        ProjectMeta {
            name: self.project.name.clone(),
            package: self.package(),
            version: self.project.version.to_string(),
            description: self.project.description.clone(),
            database: self.generate.database,
            features: self.features,
        }
    }
}

/// Span of a quoted string value in TOML source.
fn find_value_span(src: &str, value: &str) -> Option<SourceSpan> {
    for quote in ['"', '\''] {
        let needle = format!("{quote}{value}{quote}");
        if let Some(pos) = src.find(&needle) {
            return Some(SourceSpan::from((pos + 1, value.len())));
        }
    }
    None
}

/// Returns a reason when the name cannot be used as a package/crate name.
fn validate_project_name(name: &str) -> Option<&'static str> {
    let mut chars = name.chars();
    match chars.next() {
        None => return Some("name must not be empty"),
        Some(c) if !c.is_ascii_alphabetic() => return Some("name must start with a letter"),
        _ => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Some("use only letters, digits, '-' and '_'");
    }
    None
}

/// Returns a reason when the package is not a dotted identifier path.
fn validate_package(package: &str) -> Option<&'static str> {
    for segment in package.split('.') {
        let mut chars = segment.chars();
        match chars.next() {
            None => return Some("package segments must not be empty"),
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Some("each segment must start with a letter");
            }
            _ => {}
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Some("segments may contain only letters, digits and '_'");
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[project]
name = "blog-api"
package = "io.acme.blog"
version = "1.2.0"
description = "Blog backend"

[schema]
path = "db/schema.sql"

[generate]
target = "java-spring"
output = "out"
database = "mysql"

[features]
auth = true
rate_limit = true
"#;

    #[test]
    fn test_parse_full_config() {
        let config = ProjectConfig::parse_str(FULL).unwrap();
        assert_eq!(config.project.name, "blog-api");
        assert_eq!(config.package(), "io.acme.blog");
        assert_eq!(config.generate.target, Target::JavaSpring);
        assert_eq!(config.generate.output, PathBuf::from("out"));
        assert_eq!(config.generate.database, DatabaseKind::Mysql);
        assert!(config.features.auth && config.features.rate_limit);
        assert!(!config.features.file_storage);
        assert!(config.features.tests);
        assert_eq!(config.schema_format(), Some(SchemaFormat::Sql));
    }

    #[test]
    fn test_defaults() {
        let config = ProjectConfig::parse_str(
            r#"
[project]
name = "shop"
[schema]
path = "api.yaml"
[generate]
target = "fastapi"
"#,
        )
        .unwrap();
        assert_eq!(config.package(), "com.example.shop");
        assert_eq!(config.project.version.to_string(), "0.1.0");
        assert_eq!(config.generate.output, PathBuf::from("."));
        assert_eq!(config.generate.database, DatabaseKind::Postgres);
        assert_eq!(config.schema_format(), Some(SchemaFormat::OpenApi));
        assert_eq!(config.meta().version, "0.1.0");
    }

    #[test]
    fn test_unsupported_target_is_config_error() {
        let err = ProjectConfig::parse_str(
            r#"
[project]
name = "shop"
[schema]
path = "schema.sql"
[generate]
target = "php-laravel"
"#,
        )
        .unwrap_err();
        assert!(matches!(*err, crate::Error::Config { span: Some(_), .. }));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = ProjectConfig::parse_str(
            r#"
[project]
name = "shop"
colour = "blue"
[schema]
path = "schema.sql"
[generate]
target = "rust"
"#,
        )
        .unwrap_err();
        assert!(matches!(*err, crate::Error::Config { .. }));
    }

    #[test]
    fn test_invalid_project_name() {
        let err = ProjectConfig::parse_str(
            r#"
[project]
name = "9lives"
[schema]
path = "schema.sql"
[generate]
target = "rust"
"#,
        )
        .unwrap_err();
        match *err {
            crate::Error::Validation { span, message, .. } => {
                assert_eq!(
                    message,
                    "invalid project name '9lives': name must start with a letter"
                );
                assert!(span.is_some());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_validate_package() {
        assert!(validate_package("com.example.blog").is_none());
        assert!(validate_package("com..blog").is_some());
        assert!(validate_package("com.1st").is_some());
        assert!(validate_package("com.my-app").is_some());
    }
}
