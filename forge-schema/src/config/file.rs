use std::path::{Path, PathBuf};

use super::{ProjectConfig, Target};
use crate::{Error, Result};

/// A forge.toml on disk: raw content plus the parsed configuration.
pub struct ForgeToml {
    path: PathBuf,
    content: String,
    config: ProjectConfig,
}

impl ForgeToml {
    /// Open and parse a forge.toml file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = std::fs::read_to_string(&path).map_err(|e| Error::io(&path, e))?;
        let filename = path.display().to_string();
        let config = ProjectConfig::from_str_with_filename(&content, &filename)?;

        Ok(Self {
            path,
            content,
            config,
        })
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the raw content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Get the parsed configuration.
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Consume into the parsed configuration.
    pub fn into_config(self) -> ProjectConfig {
        self.config
    }

    /// Directory that relative paths in the file are resolved against.
    pub fn base_dir(&self) -> &Path {
        self.path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
    }

    /// Schema path resolved against the config directory.
    pub fn schema_path(&self) -> PathBuf {
        self.base_dir().join(&self.config.schema.path)
    }

    /// Output directory resolved against the config directory.
    pub fn output_dir(&self) -> PathBuf {
        self.base_dir().join(&self.config.generate.output)
    }

    /// Render a starter forge.toml.
    pub fn starter(name: &str, target: Target, schema: &str) -> String {
        format!(
            r#"[project]
name = "{name}"
version = "0.1.0"
description = "CRUD backend generated by crudforge"

[schema]
path = "{schema}"

[generate]
target = "{target}"
output = "."
database = "postgres"

[features]
auth = false
rate_limit = false
file_storage = false
tests = true
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_starter_parses() {
        let content = ForgeToml::starter("blog", Target::GoChi, "schema.sql");
        let config = ProjectConfig::parse_str(&content).unwrap();
        assert_eq!(config.project.name, "blog");
        assert_eq!(config.generate.target, Target::GoChi);
    }

    #[test]
    fn test_open_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("forge.toml");
        std::fs::write(&path, ForgeToml::starter("blog", Target::RustAxum, "db/schema.sql")).unwrap();

        let file = ForgeToml::open(&path).unwrap();
        assert_eq!(file.schema_path(), temp.path().join("db/schema.sql"));
        assert_eq!(file.output_dir(), temp.path().join("."));
        assert!(file.content().contains("rust-axum"));
    }

    #[test]
    fn test_open_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = ForgeToml::open(temp.path().join("forge.toml")).err().unwrap();
        assert!(matches!(*err, Error::Io { .. }));
    }
}
