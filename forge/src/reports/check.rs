//! Check command report data structures.

use crudforge_schema::Target;

use super::output::{Output, Report};

/// Report data from schema validation.
#[derive(Debug)]
pub struct CheckReport {
    /// forge.toml (or schema) the check ran on.
    pub source: String,
    pub project_name: String,
    pub target: Target,
    /// Tables in schema order.
    pub tables: Vec<String>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub infos: Vec<String>,
}

impl CheckReport {
    /// Whether the check passed (no errors).
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

impl Report for CheckReport {
    fn render(&self, out: &mut dyn Output) {
        for error in &self.errors {
            out.error(error);
        }
        for warning in &self.warnings {
            out.warning(warning);
        }
        for info in &self.infos {
            out.preformatted(&format!("info: {}", info));
        }

        if !self.errors.is_empty() || !self.warnings.is_empty() || !self.infos.is_empty() {
            out.newline();
        }

        if !self.is_valid() {
            let count = self.errors.len();
            out.preformatted(&format!(
                "✗ {} has {} error{}",
                self.source,
                count,
                if count == 1 { "" } else { "s" }
            ));
            return;
        }

        out.preformatted(&format!("✓ {} is valid", self.source));
        out.newline();
        out.preformatted(&format!("  {} ({})", self.project_name, self.target));
        let count = self.tables.len();
        out.preformatted(&format!(
            "  {} table{}: {}",
            count,
            if count == 1 { "" } else { "s" },
            self.tables.join(", ")
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::RecordedOutput;

    fn report(errors: Vec<String>) -> CheckReport {
        CheckReport {
            source: "forge.toml".to_string(),
            project_name: "blog".to_string(),
            target: Target::RustAxum,
            tables: vec!["users".to_string(), "posts".to_string()],
            errors,
            warnings: vec!["column 'type' is a reserved word\n  --> posts.type".to_string()],
            infos: Vec::new(),
        }
    }

    #[test]
    fn test_valid_report_lists_tables() {
        let mut out = RecordedOutput::default();
        report(Vec::new()).render(&mut out);
        let text = out.text();
        assert!(text.starts_with("warning: column 'type' is a reserved word\n  --> posts.type\n"));
        assert!(text.contains("✓ forge.toml is valid"));
        assert!(text.ends_with("  blog (rust-axum)\n  2 tables: users, posts"));
    }

    #[test]
    fn test_invalid_report_counts_errors() {
        let mut out = RecordedOutput::default();
        let report = report(vec!["table 'posts' has no primary key".to_string()]);
        assert!(!report.is_valid());
        report.render(&mut out);
        let text = out.text();
        assert!(text.starts_with("error: table 'posts' has no primary key"));
        assert!(text.ends_with("✗ forge.toml has 1 error"));
        assert!(!text.contains("2 tables"));
    }
}
