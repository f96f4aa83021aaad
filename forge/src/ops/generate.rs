//! Generate operation - code generation from the schema.

use crudforge_codegen::pipeline::SnapshotPlugin;
use crudforge_codegen::{DisplayStyle, EntityTreeDisplay, Pipeline};
use eyre::{Context, Result, eyre};

use super::describe;
use crate::{
    language::TargetSupport,
    project::Project,
    reports::{GenerateReport, GenerationResult, PreviewResult, WrittenResult},
};

/// Options for the generate operation.
pub struct GenerateOptions {
    /// Whether to preview without writing files.
    pub dry_run: bool,
    /// Whether to write pipeline snapshots.
    pub visualize: bool,
}

/// Execute the generate operation.
///
/// Runs the pipeline and generates code for the configured target into the
/// project's output directory.
pub fn generate(project: &Project, opts: GenerateOptions) -> Result<GenerateReport> {
    let config = &project.config;
    let target = config.generate.target;
    let debug_dir = project.output_dir.join(".forge/debug");

    let mut pipeline = Pipeline::for_target(target);
    if opts.visualize {
        pipeline = pipeline.plugin(SnapshotPlugin::with_output_dir(&debug_dir));
    }
    let ctx = pipeline
        .run(config.clone(), project.schema.clone())
        .wrap_err("pipeline failed")?;

    let warnings: Vec<String> = ctx.warnings().map(describe).collect();

    let model = ctx
        .model
        .as_ref()
        .ok_or_else(|| eyre!("pipeline produced no model"))?;
    let entity_count = model.entities.len();
    let entity_tree = EntityTreeDisplay::new(model)
        .style(DisplayStyle::TreeBox)
        .to_string();

    let generator = TargetSupport::get(target).generator(ctx)?;
    let result = if opts.dry_run {
        GenerationResult::Preview(PreviewResult {
            files: generator.preview(),
        })
    } else {
        let written = generator
            .generate(&project.output_dir)
            .wrap_err("failed to generate code")?;

        GenerationResult::Written(WrittenResult {
            output_dir: project.output_dir.clone(),
            generated_dirs: generator.generated_dirs(),
            written: written.written.len(),
            created_stubs: written.created_stubs,
            preserved: written.preserved,
            debug_dir: opts.visualize.then_some(debug_dir),
        })
    };

    Ok(GenerateReport {
        project_name: config.project.name.clone(),
        project_version: config.project.version.to_string(),
        project_description: config.project.description.clone(),
        target,
        warnings,
        entity_count,
        entity_tree,
        result,
    })
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::FileCategory;
    use crudforge_schema::Target;
    use tempfile::TempDir;

    use super::*;
    use crate::ops::fixtures::blog_project;

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let project = blog_project(Target::RustAxum, temp.path());
        let report = generate(
            &project,
            GenerateOptions {
                dry_run: true,
                visualize: false,
            },
        )
        .unwrap();

        let GenerationResult::Preview(preview) = report.result else {
            panic!("expected a preview");
        };
        assert!(preview.files.iter().any(|f| f.path == "Cargo.toml"));
        assert!(preview.files.iter().any(|f| f.category == FileCategory::Stub));
        assert_eq!(std::fs::read_dir(temp.path()).unwrap().count(), 0);
        assert_eq!(report.entity_count, 4);
    }

    #[test]
    fn test_second_run_preserves_stubs() {
        let temp = TempDir::new().unwrap();
        let project = blog_project(Target::GoChi, temp.path());
        let opts = || GenerateOptions {
            dry_run: false,
            visualize: true,
        };

        let first = generate(&project, opts()).unwrap();
        let GenerationResult::Written(first) = first.result else {
            panic!("expected written files");
        };
        assert!(!first.created_stubs.is_empty());
        assert!(first.preserved.is_empty());
        assert!(temp.path().join("go.mod").exists());
        assert!(temp.path().join(".forge/debug/analyze.json").exists());

        let second = generate(&project, opts()).unwrap();
        let GenerationResult::Written(second) = second.result else {
            panic!("expected written files");
        };
        assert!(second.created_stubs.is_empty());
        for stub in &first.created_stubs {
            assert!(second.preserved.contains(stub), "{stub} was rewritten");
        }
    }
}
