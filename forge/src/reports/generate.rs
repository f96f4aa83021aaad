//! Generate command report data structures.

use std::path::PathBuf;

use crudforge_codegen::{FileCategory, PreviewFile};
use crudforge_schema::Target;

use super::output::{Output, Report};

/// Report data from code generation.
#[derive(Debug)]
pub struct GenerateReport {
    pub project_name: String,
    pub project_version: String,
    pub project_description: Option<String>,
    pub target: Target,
    /// Warning messages from the pipeline.
    pub warnings: Vec<String>,
    pub entity_count: usize,
    /// Entity tree display string.
    pub entity_tree: String,
    pub result: GenerationResult,
}

/// Result of code generation.
#[derive(Debug)]
pub enum GenerationResult {
    /// Files were written to disk.
    Written(WrittenResult),
    /// Dry-run preview.
    Preview(PreviewResult),
}

/// Result when files were written to disk.
#[derive(Debug)]
pub struct WrittenResult {
    pub output_dir: PathBuf,
    /// Directories holding per-entity code.
    pub generated_dirs: Vec<&'static str>,
    pub written: usize,
    /// Stubs created by this run.
    pub created_stubs: Vec<String>,
    /// Write-once files that already existed and were left alone.
    pub preserved: Vec<String>,
    /// Path to pipeline snapshots, if visualization was enabled.
    pub debug_dir: Option<PathBuf>,
}

/// Result of a dry-run preview.
#[derive(Debug)]
pub struct PreviewResult {
    pub files: Vec<PreviewFile>,
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        match &self.result {
            GenerationResult::Written(written) => self.render_written(out, written),
            GenerationResult::Preview(preview) => self.render_preview(out, preview),
        }
    }
}

impl GenerateReport {
    fn render_written(&self, out: &mut dyn Output, written: &WrittenResult) {
        if let Some(debug_dir) = &written.debug_dir {
            out.key_value(
                "Pipeline snapshots written to",
                &debug_dir.display().to_string(),
            );
            out.newline();
        }

        for warning in &self.warnings {
            out.warning(warning);
        }

        out.preformatted(&format!(
            "{} v{} ({})",
            self.project_name,
            self.project_version,
            self.target.label()
        ));
        if let Some(desc) = &self.project_description {
            out.preformatted(desc);
        }
        out.newline();

        out.section(&format!("Entities ({})", self.entity_count));
        out.preformatted(&self.entity_tree);
        out.newline();

        let dirs = written.generated_dirs.join(", ");
        out.key_value(
            "Generated",
            &format!(
                "{} files in {} ({})",
                written.written,
                written.output_dir.display(),
                dirs
            ),
        );

        if !written.created_stubs.is_empty() {
            out.newline();
            out.section("New stubs");
            for stub in &written.created_stubs {
                out.added_item(stub);
            }
        }

        if !written.preserved.is_empty() {
            out.newline();
            out.key_value(
                "Kept existing files",
                &written.preserved.len().to_string(),
            );
        }
    }

    fn render_preview(&self, out: &mut dyn Output, preview: &PreviewResult) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        for file in &preview.files {
            out.divider(&file.path);
            out.preformatted(&file.content);
        }

        let stubs = preview
            .files
            .iter()
            .filter(|f| f.category == FileCategory::Stub)
            .count();
        out.divider("Summary");
        out.preformatted(&format!(
            "{} files would be generated ({} stubs, written only if missing)",
            preview.files.len(),
            stubs
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::RecordedOutput;

    fn report(result: GenerationResult) -> GenerateReport {
        GenerateReport {
            project_name: "blog".to_string(),
            project_version: "0.1.0".to_string(),
            project_description: None,
            target: Target::GoGin,
            warnings: vec!["table 'type' is reserved".to_string()],
            entity_count: 2,
            entity_tree: "├─ User (users, 2 fields)\n└─ Post (posts, 3 fields)".to_string(),
            result,
        }
    }

    #[test]
    fn test_render_written() {
        let mut out = RecordedOutput::default();
        report(GenerationResult::Written(WrittenResult {
            output_dir: PathBuf::from("out"),
            generated_dirs: vec!["internal/models", "internal/handlers"],
            written: 12,
            created_stubs: vec!["internal/service/post.go".to_string()],
            preserved: Vec::new(),
            debug_dir: None,
        }))
        .render(&mut out);

        let text = out.text();
        assert!(text.starts_with("warning: table 'type' is reserved\nblog v0.1.0 (Go (Gin + database/sql))"));
        assert!(text.contains("Entities (2):\n├─ User"));
        assert!(text.contains("Generated: 12 files in out (internal/models, internal/handlers)"));
        assert!(text.contains("New stubs:\n  + internal/service/post.go"));
        assert!(!text.contains("Kept existing files"));
    }

    #[test]
    fn test_render_preview_counts_stubs() {
        let mut out = RecordedOutput::default();
        let file = |path: &str, category| PreviewFile {
            path: path.to_string(),
            content: "package main".to_string(),
            category,
        };
        report(GenerationResult::Preview(PreviewResult {
            files: vec![
                file("go.mod", FileCategory::Config),
                file("internal/service/post.go", FileCategory::Stub),
            ],
        }))
        .render(&mut out);

        let text = out.text();
        assert!(text.contains("-- go.mod --\npackage main"));
        assert!(text.ends_with("2 files would be generated (1 stubs, written only if missing)"));
    }
}
