use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

/// A `mod.rs` declaring one submodule per entity.
pub struct ModRs {
    pub dir: &'static str,
    pub modules: Vec<String>,
}

impl ModRs {
    pub fn new(dir: &'static str, modules: impl IntoIterator<Item = String>) -> Self {
        let mut modules: Vec<String> = modules.into_iter().collect();
        modules.sort();
        Self { dir, modules }
    }
}

impl GeneratedFile for ModRs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join(self.dir).join("mod.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        self.modules
            .iter()
            .map(|m| format!("pub mod {};\n", m))
            .collect()
    }
}
