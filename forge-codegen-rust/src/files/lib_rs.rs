use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::Features;

/// The lib.rs module root; the binary and integration tests share it.
pub struct LibRs {
    pub features: Features,
}

impl GeneratedFile for LibRs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("lib.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let mut modules = vec![
            "config",
            "db",
            "error",
            "handlers",
            "models",
            "repositories",
            "routes",
            "services",
            "state",
        ];
        if self.features.auth {
            modules.push("auth");
        }
        if self.features.rate_limit {
            modules.push("rate_limit");
        }
        if self.features.file_storage {
            modules.push("storage");
        }
        modules.sort_unstable();
        modules
            .iter()
            .map(|m| format!("pub mod {};\n", m))
            .collect()
    }
}
