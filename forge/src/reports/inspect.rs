//! Inspect command report data structures.

use super::output::{Output, Report};

/// Report data describing the lowered model.
#[derive(Debug)]
pub struct InspectReport {
    pub name: String,
    pub description: Option<String>,
    pub version: String,
    /// forge.toml (or schema) the model came from.
    pub source: String,
    /// Target label, e.g. `Rust (Axum + sqlx)`.
    pub target: String,
    pub database: String,
    /// Names of enabled features.
    pub features: Vec<&'static str>,
    pub stats: Stats,
    /// Entity tree display.
    pub entity_tree: String,
    /// Entity names, referenced entities first.
    pub creation_order: Vec<String>,
    pub warnings: Vec<String>,
}

/// Model statistics.
#[derive(Debug, Default)]
pub struct Stats {
    pub entities: usize,
    pub fields: usize,
    /// Relations counted from both ends.
    pub relations: usize,
    pub junctions: usize,
}

impl Report for InspectReport {
    fn render(&self, out: &mut dyn Output) {
        for warning in &self.warnings {
            out.warning(warning);
        }

        out.title(&self.name);
        if let Some(desc) = &self.description {
            out.preformatted(desc);
        }
        out.newline();

        out.key_value_indented("Version", &self.version);
        out.key_value_indented("Source", &self.source);
        out.key_value_indented("Target", &self.target);
        out.key_value_indented("Database", &self.database);
        let features = if self.features.is_empty() {
            "none".to_string()
        } else {
            self.features.join(", ")
        };
        out.key_value_indented("Features", &features);
        out.newline();

        out.section("Statistics");
        out.key_value_indented("Entities", &self.stats.entities.to_string());
        out.key_value_indented("Fields", &self.stats.fields.to_string());
        out.key_value_indented("Relations", &self.stats.relations.to_string());
        out.key_value_indented("Junctions", &self.stats.junctions.to_string());
        out.newline();

        if self.entity_tree.is_empty() {
            out.preformatted("No entities.");
            return;
        }

        out.section("Entities");
        out.preformatted(&self.entity_tree);
        out.newline();

        out.section("Creation order");
        for (i, name) in self.creation_order.iter().enumerate() {
            out.numbered_item(i + 1, name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::RecordedOutput;

    #[test]
    fn test_render_model() {
        let mut out = RecordedOutput::default();
        InspectReport {
            name: "blog".to_string(),
            description: Some("Blog backend".to_string()),
            version: "0.1.0".to_string(),
            source: "forge.toml".to_string(),
            target: "Python (FastAPI + SQLAlchemy)".to_string(),
            database: "sqlite".to_string(),
            features: Vec::new(),
            stats: Stats {
                entities: 2,
                fields: 5,
                relations: 2,
                junctions: 0,
            },
            entity_tree: "User (users)\nPost (posts)".to_string(),
            creation_order: vec!["User".to_string(), "Post".to_string()],
            warnings: Vec::new(),
        }
        .render(&mut out);

        let text = out.text();
        assert!(text.starts_with("# blog\nBlog backend\n"));
        assert!(text.contains("  Features: none"));
        assert!(text.contains("  Relations: 2"));
        assert!(text.ends_with("Creation order:\n  1. User\n  2. Post"));
    }
}
