//! Detection of generated files whose entity disappeared from the schema.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use crudforge_core::{GENERATED_MARKER, STUB_MARKER};
use eyre::{Result, WrapErr};

/// Marker lines are written at the top of a file; only the head is read.
const MARKER_SCAN_LINES: usize = 3;

/// A file under a generated directory that the current schema no longer produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orphan {
    /// Path relative to the output directory, `/`-separated.
    pub relative_path: String,
    pub full_path: PathBuf,
    /// Still carries a generated or stub marker, so it is safe to delete.
    pub is_unmodified: bool,
}

/// Find orphaned files under `dirs` (relative to `base`).
///
/// Only files with `extension` are considered. Files listed in `expected`
/// (relative, `/`-separated) are kept. Results are sorted by path.
pub fn find_orphans(
    base: &Path,
    dirs: &[&str],
    expected: &HashSet<String>,
    extension: &str,
) -> Result<Vec<Orphan>> {
    let mut orphans = Vec::new();
    for dir in dirs {
        scan(base, &base.join(dir), expected, extension, &mut orphans)?;
    }
    orphans.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
    orphans.dedup_by(|a, b| a.relative_path == b.relative_path);
    Ok(orphans)
}

fn scan(
    base: &Path,
    dir: &Path,
    expected: &HashSet<String>,
    extension: &str,
    orphans: &mut Vec<Orphan>,
) -> Result<()> {
    if !dir.is_dir() {
        return Ok(());
    }

    let entries =
        std::fs::read_dir(dir).wrap_err_with(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if path.is_dir() {
            scan(base, &path, expected, extension, orphans)?;
            continue;
        }
        if !path.extension().is_some_and(|ext| ext == extension) {
            continue;
        }

        let relative = relative_path(base, &path);
        if expected.contains(&relative) {
            continue;
        }

        let is_unmodified = carries_marker(&path)?;
        tracing::debug!(path = %relative, is_unmodified, "found orphan");
        orphans.push(Orphan {
            relative_path: relative,
            full_path: path,
            is_unmodified,
        });
    }
    Ok(())
}

fn relative_path(base: &Path, path: &Path) -> String {
    path.strip_prefix(base)
        .unwrap_or(path)
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

fn carries_marker(path: &Path) -> Result<bool> {
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read {}", path.display()))?;
    Ok(content
        .lines()
        .take(MARKER_SCAN_LINES)
        .any(|line| line.contains(GENERATED_MARKER) || line.contains(STUB_MARKER)))
}

/// Remove empty directories from `dir` upwards, stopping at `base`.
pub fn remove_empty_dirs(dir: &Path, base: &Path) -> Result<()> {
    if dir == base || !dir.starts_with(base) {
        return Ok(());
    }

    if std::fs::read_dir(dir)?.next().is_none() {
        std::fs::remove_dir(dir)
            .wrap_err_with(|| format!("failed to remove {}", dir.display()))?;
        if let Some(parent) = dir.parent() {
            remove_empty_dirs(parent, base)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn write(base: &Path, path: &str, content: &str) {
        let full = base.join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[test]
    fn test_find_orphans_by_marker() {
        let temp = TempDir::new().unwrap();
        let base = temp.path();
        write(base, "src/models/post.rs", &format!("// {}\n\npub struct Post;", GENERATED_MARKER));
        write(base, "src/models/tag.rs", &format!("// {}\n\npub struct Tag;", GENERATED_MARKER));
        write(base, "src/services/tag.rs", &format!("// {}\n\nimpl TagService {{}}", STUB_MARKER));
        write(base, "src/services/legacy.rs", "impl LegacyService {}");
        write(base, "src/services/notes.txt", "not source");

        let expected: HashSet<String> = ["src/models/post.rs".to_string()].into();
        let orphans = find_orphans(base, &["src/models", "src/services"], &expected, "rs").unwrap();

        let summary: Vec<_> = orphans
            .iter()
            .map(|o| (o.relative_path.as_str(), o.is_unmodified))
            .collect();
        assert_eq!(
            summary,
            [
                ("src/models/tag.rs", true),
                ("src/services/legacy.rs", false),
                ("src/services/tag.rs", true),
            ]
        );
    }

    #[test]
    fn test_missing_dir_is_empty() {
        let temp = TempDir::new().unwrap();
        let orphans = find_orphans(temp.path(), &["src/models"], &HashSet::new(), "rs").unwrap();
        assert!(orphans.is_empty());
    }

    #[test]
    fn test_remove_empty_dirs_stops_at_base() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("src/models/nested");
        fs::create_dir_all(&nested).unwrap();

        remove_empty_dirs(&nested, temp.path()).unwrap();
        assert!(!temp.path().join("src").exists());
        assert!(temp.path().exists());
    }
}
