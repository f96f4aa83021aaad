use std::path::{Path, PathBuf};

use clap::Args;
use crudforge_core::{File, FileRules, WriteResult};
use crudforge_schema::{ForgeToml, ProjectConfig, Target};
use dialoguer::{Select, theme::ColorfulTheme};
use eyre::{Context, Result, bail};

use super::UnwrapOrExit;
use crate::project::current_dir_name;

/// Written next to a fresh forge.toml so `forge generate` works right away.
const STARTER_SCHEMA: &str = r#"-- Edit this schema, then run `forge generate`.

CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE posts (
    id BIGSERIAL PRIMARY KEY,
    author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title VARCHAR(200) NOT NULL,
    body TEXT NOT NULL,
    published BOOLEAN NOT NULL DEFAULT false
);
"#;

#[derive(Args)]
pub struct InitCommand {
    /// Project name (defaults to current directory)
    #[arg(default_value = ".")]
    pub name: String,

    /// Output directory (defaults to ./<name>)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Target framework for code generation
    #[arg(short, long)]
    pub target: Option<Target>,

    /// Schema file, relative to the project directory
    #[arg(short, long, default_value = "schema.sql")]
    pub schema: String,
}

impl InitCommand {
    pub fn run(&self) -> Result<()> {
        let (project_name, output_dir) = Self::resolve_paths(&self.name, self.output.clone());
        let target = match self.target {
            Some(target) => target,
            None => Self::prompt_target()?,
        };

        let config_path = output_dir.join("forge.toml");
        if config_path.exists() {
            bail!("{} already exists", config_path.display());
        }

        let content = ForgeToml::starter(&project_name, target, &self.schema);
        ProjectConfig::from_str_with_filename(&content, &config_path.display().to_string())
            .unwrap_or_exit();
        File::new(&config_path, content).write()?;

        let schema_path = output_dir.join(&self.schema);
        let created_schema = Self::write_starter_schema(&schema_path)?;

        println!(
            "Created {} project '{}' in {}",
            target.label(),
            project_name,
            output_dir.display()
        );
        if created_schema {
            println!("  + {}", schema_path.display());
        }
        println!();
        println!("Next steps:");
        if output_dir != Path::new(".") {
            println!("  cd {}", output_dir.display());
        }
        if !schema_path.exists() {
            println!("  add your schema at {}", self.schema);
        }
        println!("  forge generate");

        Ok(())
    }

    fn prompt_target() -> Result<Target> {
        let labels: Vec<String> = Target::ALL.iter().map(Target::label).collect();
        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt("Select a target")
            .items(&labels)
            .default(0)
            .interact()
            .wrap_err("Failed to get target selection")?;

        Ok(Target::ALL[selection])
    }

    fn resolve_paths(name: &str, output: Option<PathBuf>) -> (String, PathBuf) {
        if name == "." {
            let dir_name = current_dir_name().unwrap_or_exit();
            (dir_name, output.unwrap_or_else(|| PathBuf::from(".")))
        } else {
            let output_dir = output.unwrap_or_else(|| PathBuf::from(name));
            (name.to_string(), output_dir)
        }
    }

    /// Only SQL schemas get starter content; other formats are left to the user.
    fn write_starter_schema(path: &Path) -> Result<bool> {
        let is_sql = path.extension().is_some_and(|ext| ext == "sql");
        if !is_sql {
            return Ok(false);
        }
        let result = File::new(path, STARTER_SCHEMA)
            .with_rules(FileRules::if_missing())
            .write()?;
        Ok(result == WriteResult::Written)
    }
}
