//! Targets command report data structures.

use super::output::{Output, Report};

/// Supported and recognized targets.
#[derive(Debug)]
pub struct TargetsReport {
    pub targets: Vec<TargetInfo>,
    /// Frameworks recognized in forge.toml but not generated.
    pub unsupported: Vec<&'static str>,
}

#[derive(Debug)]
pub struct TargetInfo {
    /// Identifier used in forge.toml and `--target`.
    pub id: &'static str,
    pub label: String,
    pub manifest: &'static str,
    pub layers: &'static str,
}

impl Report for TargetsReport {
    fn render(&self, out: &mut dyn Output) {
        out.section("Targets");
        for (i, target) in self.targets.iter().enumerate() {
            if i > 0 {
                out.newline();
            }
            out.list_item(&format!("{:<18} {}", target.id, target.label));
            out.key_value_indented("  manifest", target.manifest);
            out.key_value_indented("  per entity", target.layers);
        }

        if !self.unsupported.is_empty() {
            out.newline();
            out.key_value("Not supported yet", &self.unsupported.join(", "));
        }
    }
}
