//! File registration for declarative code generation.
//!
//! ```ignore
//! let mut registry = FileRegistry::new();
//! registry.register_file(&CargoToml::new(..), FileCategory::Config);
//! registry.register_file(&PostService::new(..), FileCategory::Stub);
//! registry.write_all(&output_dir)?;
//! ```

use std::path::Path;

use crudforge_core::{File, FileRules, GeneratedFile, Overwrite, WriteResult};
use eyre::Result;

/// Category of generated file, determining write order and behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileCategory {
    /// Build manifests (Cargo.toml, package.json, go.mod, ...).
    Config,
    /// Entry points, database setup, error types, feature plumbing.
    Infrastructure,
    /// Per-entity code regenerated on every run.
    Generated,
    /// User-editable files written only when missing.
    Stub,
}

impl FileCategory {
    pub fn default_overwrite(&self) -> Overwrite {
        match self {
            FileCategory::Stub => Overwrite::IfMissing,
            _ => Overwrite::Always,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FileCategory::Config => "config",
            FileCategory::Infrastructure => "infrastructure",
            FileCategory::Generated => "generated",
            FileCategory::Stub => "stub",
        }
    }
}

/// A file to be generated.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Relative path from output directory, `/`-separated.
    pub path: String,
    /// Final content, marker header included.
    pub content: String,
    pub category: FileCategory,
    pub overwrite: Overwrite,
}

impl FileEntry {
    pub fn new(path: impl Into<String>, content: impl Into<String>, category: FileCategory) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            category,
            overwrite: category.default_overwrite(),
        }
    }

    /// Create from a GeneratedFile, respecting its rules.
    pub fn from_generated<F: GeneratedFile + ?Sized>(file: &F, category: FileCategory) -> Self {
        let path = file
            .path(Path::new(""))
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        Self {
            path,
            content: file.contents(),
            category,
            overwrite: file.rules().overwrite,
        }
    }

    pub fn write(&self, base: &Path) -> Result<WriteResult> {
        File::new(base.join(&self.path), self.content.as_str())
            .with_rules(FileRules {
                overwrite: self.overwrite,
                header: None,
            })
            .write()
    }
}

/// Registry for collecting generated files.
///
/// Entries are written in category order:
/// Config -> Infrastructure -> Generated -> Stub
#[derive(Debug, Default)]
pub struct FileRegistry {
    entries: Vec<FileEntry>,
}

impl FileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, entry: FileEntry) {
        self.entries.push(entry);
    }

    pub fn register_file<F: GeneratedFile + ?Sized>(&mut self, file: &F, category: FileCategory) {
        self.register(FileEntry::from_generated(file, category));
    }

    /// All entries, sorted by category (stable within a category).
    pub fn entries(&self) -> impl Iterator<Item = &FileEntry> {
        let mut sorted: Vec<_> = self.entries.iter().collect();
        sorted.sort_by_key(|e| e.category);
        sorted.into_iter()
    }

    pub fn get(&self, path: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Write all files to the output directory.
    pub fn write_all(&self, base: &Path) -> Result<WriteStats> {
        let mut stats = WriteStats::default();

        for entry in self.entries() {
            match entry.write(base)? {
                WriteResult::Written => {
                    stats.written += 1;
                    stats.written_paths.push(entry.path.clone());
                    if entry.category == FileCategory::Stub {
                        stats.created_stubs.push(entry.path.clone());
                    }
                }
                WriteResult::Skipped => {
                    stats.skipped += 1;
                    stats.skipped_paths.push(entry.path.clone());
                }
            }
        }

        Ok(stats)
    }
}

/// Statistics from a write operation.
#[derive(Debug, Default)]
pub struct WriteStats {
    pub written: usize,
    /// Files skipped because they already existed.
    pub skipped: usize,
    pub written_paths: Vec<String>,
    pub skipped_paths: Vec<String>,
    pub created_stubs: Vec<String>,
}

impl WriteStats {
    pub fn total(&self) -> usize {
        self.written + self.skipped
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crudforge_core::STUB_MARKER;
    use tempfile::TempDir;

    use super::*;

    struct Service;

    impl GeneratedFile for Service {
        fn path(&self, base: &Path) -> PathBuf {
            base.join("src").join("services").join("post.rs")
        }

        fn rules(&self) -> FileRules {
            FileRules::stub("//")
        }

        fn render(&self) -> String {
            "pub struct PostService;\n".to_string()
        }
    }

    #[test]
    fn test_entries_sorted_by_category() {
        let mut registry = FileRegistry::new();
        registry.register(FileEntry::new("src/services/post.rs", "", FileCategory::Stub));
        registry.register(FileEntry::new("src/models/post.rs", "", FileCategory::Generated));
        registry.register(FileEntry::new("Cargo.toml", "", FileCategory::Config));

        let paths: Vec<_> = registry.entries().map(|e| e.path.as_str()).collect();
        assert_eq!(paths, ["Cargo.toml", "src/models/post.rs", "src/services/post.rs"]);
    }

    #[test]
    fn test_from_generated_uses_relative_path_and_header() {
        let entry = FileEntry::from_generated(&Service, FileCategory::Stub);
        assert_eq!(entry.path, "src/services/post.rs");
        assert!(entry.content.starts_with(&format!("// {}", STUB_MARKER)));
        assert_eq!(entry.overwrite, Overwrite::IfMissing);
    }

    #[test]
    fn test_write_all_preserves_existing_stubs() {
        let temp = TempDir::new().unwrap();
        let mut registry = FileRegistry::new();
        registry.register(FileEntry::new("Cargo.toml", "[package]\n", FileCategory::Config));
        registry.register_file(&Service, FileCategory::Stub);

        let first = registry.write_all(temp.path()).unwrap();
        assert_eq!(first.written, 2);
        assert_eq!(first.created_stubs, ["src/services/post.rs"]);

        let stub = temp.path().join("src/services/post.rs");
        std::fs::write(&stub, "edited").unwrap();

        let second = registry.write_all(temp.path()).unwrap();
        assert_eq!(second.written, 1);
        assert_eq!(second.skipped_paths, ["src/services/post.rs"]);
        assert!(second.created_stubs.is_empty());
        assert_eq!(std::fs::read_to_string(stub).unwrap(), "edited");
        assert_eq!(second.total(), 2);
    }
}
