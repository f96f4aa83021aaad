//! Core operations.
//!
//! The work behind each command, separated from argument parsing and
//! output rendering. Every operation returns a report.

pub mod check;
pub mod clean;
pub mod generate;
pub mod inspect;

pub use check::check;
pub use clean::clean;
pub use generate::generate;
pub use inspect::inspect;

use crudforge_codegen::Diagnostic;

/// Message with its schema location on a second line.
fn describe(diag: &Diagnostic) -> String {
    match &diag.location {
        Some(loc) => format!("{}\n  --> {}", diag.message, loc),
        None => diag.message.clone(),
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::path::{Path, PathBuf};

    use crudforge_codegen::testing::BLOG_SQL;
    use crudforge_schema::{ProjectConfig, Target, parse_sql};

    use crate::project::Project;

    /// The blog schema as a project writing into `output_dir`.
    pub fn blog_project(target: Target, output_dir: &Path) -> Project {
        project_from(BLOG_SQL, target, output_dir)
    }

    pub fn project_from(sql: &str, target: Target, output_dir: &Path) -> Project {
        Project {
            config: ProjectConfig::new("blog", "schema.sql", target),
            schema: parse_sql(sql, "schema.sql").unwrap(),
            config_path: Some(PathBuf::from("forge.toml")),
            output_dir: output_dir.to_path_buf(),
        }
    }
}
