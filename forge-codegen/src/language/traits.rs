//! Target-agnostic code generation traits.

use std::{collections::HashSet, path::Path};

use crudforge_ir::{ColumnType, Field};
use crudforge_schema::Target;
use eyre::{Result, WrapErr};

use crate::generation::{FileCategory, FileRegistry, find_orphans, remove_empty_dirs};

/// Trait for target generators.
///
/// A generator declares its output as a [`FileRegistry`]; previewing,
/// writing and cleaning are derived from it.
pub trait LanguageCodegen {
    fn target(&self) -> Target;

    /// Extension of generated source files (e.g., "rs", "ts", "go").
    fn file_extension(&self) -> &'static str;

    /// Every file this generator produces, in write order.
    fn registry(&self) -> FileRegistry;

    /// Directories (relative to the output dir) that hold per-entity files
    /// and are scanned for orphans.
    fn generated_dirs(&self) -> Vec<&'static str>;

    /// Preview generated files without writing to disk.
    fn preview(&self) -> Vec<PreviewFile> {
        self.registry()
            .entries()
            .map(|e| PreviewFile {
                path: e.path.clone(),
                content: e.content.clone(),
                category: e.category,
            })
            .collect()
    }

    /// Generate all files into the output directory.
    fn generate(&self, output_dir: &Path) -> Result<GenerateResult> {
        let stats = self
            .registry()
            .write_all(output_dir)
            .wrap_err_with(|| format!("failed to generate into {}", output_dir.display()))?;
        tracing::info!(
            target_name = %self.target(),
            written = stats.written,
            preserved = stats.skipped,
            "generation finished"
        );
        Ok(GenerateResult {
            written: stats.written_paths,
            preserved: stats.skipped_paths,
            created_stubs: stats.created_stubs,
        })
    }

    /// Delete orphaned generated files and unmodified orphaned stubs.
    ///
    /// Stubs the user edited (marker removed) are reported, never deleted.
    fn clean(&self, output_dir: &Path) -> Result<CleanResult> {
        let result = self.preview_clean(output_dir)?;
        for path in &result.deleted {
            let full = output_dir.join(path);
            std::fs::remove_file(&full)
                .wrap_err_with(|| format!("failed to delete {}", full.display()))?;
            tracing::info!(path = %path, "deleted orphan");
            if let Some(parent) = full.parent() {
                remove_empty_dirs(parent, output_dir)?;
            }
        }
        Ok(result)
    }

    /// Report what [`clean`](Self::clean) would do without touching disk.
    fn preview_clean(&self, output_dir: &Path) -> Result<CleanResult> {
        let expected: HashSet<String> = self.registry().entries().map(|e| e.path.clone()).collect();
        let orphans = find_orphans(
            output_dir,
            &self.generated_dirs(),
            &expected,
            self.file_extension(),
        )?;

        let mut result = CleanResult::default();
        for orphan in orphans {
            if orphan.is_unmodified {
                result.deleted.push(orphan.relative_path);
            } else {
                result.skipped_modified.push(orphan.relative_path);
            }
        }
        Ok(result)
    }
}

/// Result of code generation
#[derive(Debug, Default)]
pub struct GenerateResult {
    /// Files written (created or overwritten)
    pub written: Vec<String>,
    /// Existing stubs left untouched
    pub preserved: Vec<String>,
    /// Stubs created by this run
    pub created_stubs: Vec<String>,
}

/// Result of cleaning orphaned files
#[derive(Debug, Default)]
pub struct CleanResult {
    pub deleted: Vec<String>,
    /// Orphans without a marker, kept because the user owns them
    pub skipped_modified: Vec<String>,
}

impl CleanResult {
    pub fn is_empty(&self) -> bool {
        self.deleted.is_empty() && self.skipped_modified.is_empty()
    }
}

/// A generated file for preview
#[derive(Debug, Clone)]
pub struct PreviewFile {
    /// Relative path from output directory
    pub path: String,
    /// File content, header included
    pub content: String,
    pub category: FileCategory,
}

/// Maps column types to target-language type expressions.
pub trait TypeMapper {
    fn map_type(&self, ty: &ColumnType) -> String;

    /// Type for a nullable column (`Option<T>`, `T | null`, `*T`, ...).
    fn map_optional(&self, ty: &ColumnType) -> String;

    fn map_field(&self, field: &Field) -> String {
        if field.nullable && !field.primary_key {
            self.map_optional(&field.ty)
        } else {
            self.map_type(&field.ty)
        }
    }
}
