//! Resolving the project a command works on.
//!
//! Values come from forge.toml, with command-line flags taking precedence.
//! `generate` can also run without a forge.toml when both `--schema` and
//! `--target` are given.

use std::path::{Path, PathBuf};

use crudforge_ir::ParsedSchema;
use crudforge_schema::{Error, ForgeToml, ProjectConfig, Result, Target, load_schema};

/// Command-line values that replace forge.toml settings.
#[derive(Debug, Default)]
pub struct Overrides {
    pub schema: Option<PathBuf>,
    pub target: Option<Target>,
    pub output: Option<PathBuf>,
}

/// A configuration together with its parsed schema.
pub struct Project {
    pub config: ProjectConfig,
    pub schema: ParsedSchema,
    /// The forge.toml that was read, if any.
    pub config_path: Option<PathBuf>,
    pub output_dir: PathBuf,
}

impl Project {
    /// Open `config_path` and load the schema it points at.
    pub fn open(config_path: &Path) -> Result<Self> {
        Self::load(config_path, Overrides::default())
    }

    pub fn load(config_path: &Path, overrides: Overrides) -> Result<Self> {
        let standalone = match (&overrides.schema, overrides.target) {
            (Some(schema), Some(target)) if !config_path.exists() => Some((schema, target)),
            _ => None,
        };

        let (mut config, mut schema_path, mut output_dir, source) = match standalone {
            Some((schema, target)) => {
                let config = ProjectConfig::new(current_dir_name()?, schema.clone(), target);
                (config, schema.clone(), PathBuf::from("."), None)
            }
            None => {
                let file = ForgeToml::open(config_path)?;
                let schema_path = file.schema_path();
                let output_dir = file.output_dir();
                (
                    file.into_config(),
                    schema_path,
                    output_dir,
                    Some(config_path.to_path_buf()),
                )
            }
        };

        if let Some(target) = overrides.target {
            config.generate.target = target;
        }
        if let Some(schema) = overrides.schema {
            // An explicit format in forge.toml describes the configured file,
            // not the one given on the command line.
            config.schema.path = schema.clone();
            config.schema.format = None;
            schema_path = schema;
        }
        if let Some(output) = overrides.output {
            output_dir = output;
        }

        tracing::debug!(
            config = ?source,
            schema = %schema_path.display(),
            target = %config.generate.target,
            "resolved project"
        );
        let schema = load_schema(&schema_path, config.schema.format)?;

        Ok(Self {
            config,
            schema,
            config_path: source,
            output_dir,
        })
    }

    /// Label for reports: the forge.toml path, or the schema when there is none.
    pub fn source_label(&self) -> String {
        match &self.config_path {
            Some(path) => path.display().to_string(),
            None => self.config.schema.path.display().to_string(),
        }
    }
}

/// Name of the working directory, used as the project name.
pub fn current_dir_name() -> Result<String> {
    let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
    Ok(cwd
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("app")
        .to_string())
}

#[cfg(test)]
mod tests {
    use crudforge_ir::SchemaFormat;
    use tempfile::TempDir;

    use super::*;

    fn write_project(dir: &Path) -> PathBuf {
        let config = dir.join("forge.toml");
        std::fs::write(&config, ForgeToml::starter("blog", Target::GoChi, "schema.sql")).unwrap();
        std::fs::write(
            dir.join("schema.sql"),
            "CREATE TABLE tags (id SERIAL PRIMARY KEY, name TEXT NOT NULL);",
        )
        .unwrap();
        config
    }

    #[test]
    fn test_open_resolves_against_config_dir() {
        let temp = TempDir::new().unwrap();
        let config = write_project(temp.path());

        let project = Project::open(&config).unwrap();
        assert_eq!(project.config.generate.target, Target::GoChi);
        assert_eq!(project.schema.tables[0].name, "tags");
        assert_eq!(project.output_dir, temp.path().join("."));
        assert_eq!(project.source_label(), config.display().to_string());
    }

    #[test]
    fn test_flags_override_config() {
        let temp = TempDir::new().unwrap();
        let config = write_project(temp.path());
        let other = temp.path().join("other.sql");
        std::fs::write(&other, "CREATE TABLE notes (id INT PRIMARY KEY);").unwrap();

        let project = Project::load(
            &config,
            Overrides {
                schema: Some(other.clone()),
                target: Some(Target::JavaSpring),
                output: Some(temp.path().join("out")),
            },
        )
        .unwrap();
        assert_eq!(project.config.generate.target, Target::JavaSpring);
        assert_eq!(project.config.schema.path, other);
        assert_eq!(project.schema.tables[0].name, "notes");
        assert_eq!(project.output_dir, temp.path().join("out"));
    }

    #[test]
    fn test_runs_without_config_when_flags_suffice() {
        let temp = TempDir::new().unwrap();
        let schema = temp.path().join("api.json");
        std::fs::write(
            &schema,
            r#"{"openapi": "3.0.0", "components": {"schemas": {"Tag": {"type": "object", "properties": {"id": {"type": "integer"}}}}}}"#,
        )
        .unwrap();

        let project = Project::load(
            &temp.path().join("forge.toml"),
            Overrides {
                schema: Some(schema),
                target: Some(Target::PythonFastapi),
                output: None,
            },
        )
        .unwrap();
        assert!(project.config_path.is_none());
        assert_eq!(project.schema.format, SchemaFormat::OpenApi);
        assert_eq!(project.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_missing_config_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = Project::open(&temp.path().join("forge.toml")).err().unwrap();
        assert!(matches!(*err, Error::Io { .. }));
    }
}
