//! Clean operation - remove orphaned generated files.

use crudforge_codegen::Pipeline;
use eyre::{Context, Result};

use super::describe;
use crate::{language::TargetSupport, project::Project, reports::CleanReport};

/// Options for the clean operation.
pub struct CleanOptions {
    /// Whether to preview without deleting.
    pub dry_run: bool,
}

/// Execute the clean operation.
///
/// Removes generated files and untouched stubs for entities that are no
/// longer in the schema.
pub fn clean(project: &Project, opts: CleanOptions) -> Result<CleanReport> {
    let target = project.config.generate.target;
    let ctx = Pipeline::for_target(target)
        .run(project.config.clone(), project.schema.clone())
        .wrap_err("pipeline failed")?;

    let warnings: Vec<String> = ctx.warnings().map(describe).collect();

    let generator = TargetSupport::get(target).generator(ctx)?;
    let result = if opts.dry_run {
        generator
            .preview_clean(&project.output_dir)
            .wrap_err("failed to preview clean")?
    } else {
        generator
            .clean(&project.output_dir)
            .wrap_err("failed to clean orphaned files")?
    };

    Ok(CleanReport {
        dry_run: opts.dry_run,
        warnings,
        deleted: result.deleted,
        skipped_modified: result.skipped_modified,
    })
}
