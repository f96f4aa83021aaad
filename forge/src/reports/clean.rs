//! Clean command report data structures.

use super::output::{Output, Report};

/// Report data from cleaning orphaned files.
#[derive(Debug)]
pub struct CleanReport {
    pub dry_run: bool,
    /// Warning messages from the pipeline.
    pub warnings: Vec<String>,
    /// Orphans deleted (or that would be, on a dry run).
    pub deleted: Vec<String>,
    /// Orphaned stubs kept because the user edited them.
    pub skipped_modified: Vec<String>,
}

impl Report for CleanReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        if self.deleted.is_empty() && self.skipped_modified.is_empty() {
            out.preformatted("No orphaned files found.");
            return;
        }

        if !self.deleted.is_empty() {
            out.section(if self.dry_run { "Would delete" } else { "Deleted" });
            for path in &self.deleted {
                out.removed_item(path);
            }
        }

        if !self.skipped_modified.is_empty() {
            if !self.deleted.is_empty() {
                out.newline();
            }
            out.section("Skipped (modified by user)");
            for path in &self.skipped_modified {
                out.list_item(&format!("! {}", path));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::RecordedOutput;

    #[test]
    fn test_nothing_to_clean() {
        let mut out = RecordedOutput::default();
        CleanReport {
            dry_run: false,
            warnings: Vec::new(),
            deleted: Vec::new(),
            skipped_modified: Vec::new(),
        }
        .render(&mut out);
        assert_eq!(out.text(), "No orphaned files found.");
    }

    #[test]
    fn test_dry_run_lists_both_groups() {
        let mut out = RecordedOutput::default();
        CleanReport {
            dry_run: true,
            warnings: Vec::new(),
            deleted: vec!["src/models/tag.rs".to_string()],
            skipped_modified: vec!["src/services/tag.rs".to_string()],
        }
        .render(&mut out);
        assert_eq!(
            out.text(),
            "Would delete:\n  - src/models/tag.rs\n\nSkipped (modified by user):\n  - ! src/services/tag.rs"
        );
    }
}
