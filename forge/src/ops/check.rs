//! Check operation - schema validation.

use crudforge_codegen::{Pipeline, Severity};

use super::describe;
use crate::{project::Project, reports::CheckReport};

/// Execute the check operation.
///
/// Runs validation only. Diagnostics are collected, never turned into an
/// error, so the report can list all of them.
pub fn check(project: &Project) -> CheckReport {
    let target = project.config.generate.target;
    let ctx =
        Pipeline::for_target(target).check(project.config.clone(), project.schema.clone());

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut infos = Vec::new();

    for diag in &ctx.diagnostics {
        let msg = describe(diag);
        match diag.severity {
            Severity::Error => errors.push(msg),
            Severity::Warning => warnings.push(msg),
            Severity::Info => infos.push(msg),
        }
    }

    CheckReport {
        source: project.source_label(),
        project_name: project.config.project.name.clone(),
        target,
        tables: ctx.schema.tables.iter().map(|t| t.name.clone()).collect(),
        errors,
        warnings,
        infos,
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crudforge_schema::Target;

    use super::*;
    use crate::ops::fixtures::{blog_project, project_from};

    #[test]
    fn test_blog_schema_is_valid() {
        let report = check(&blog_project(Target::PythonFastapi, Path::new(".")));
        assert!(report.is_valid());
        assert_eq!(report.source, "forge.toml");
        assert_eq!(report.tables[0], "users");
    }

    #[test]
    fn test_errors_carry_locations() {
        let project = project_from(
            "CREATE TABLE posts (id INT PRIMARY KEY, author_id INT REFERENCES people(id));",
            Target::RustAxum,
            Path::new("."),
        );
        let report = check(&project);
        assert!(!report.is_valid());
        assert_eq!(report.errors.len(), 1);
        assert!(report.errors[0].contains("\n  --> posts.author_id"));
    }
}
