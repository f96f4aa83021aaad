use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

/// `src/handlers/mod.rs`: handler modules plus the shared pagination query.
pub struct HandlersMod {
    pub modules: Vec<String>,
}

impl HandlersMod {
    pub fn new(modules: impl IntoIterator<Item = String>) -> Self {
        let mut modules: Vec<String> = modules.into_iter().collect();
        modules.sort();
        Self { modules }
    }
}

impl GeneratedFile for HandlersMod {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("handlers").join("mod.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let modules: String = self
            .modules
            .iter()
            .map(|m| format!("pub mod {};\n", m))
            .collect();
        format!(
            r#"{modules}
use serde::Deserialize;

/// `?limit=&offset=` on list endpoints.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Pagination {{
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}}

impl Pagination {{
    pub const DEFAULT_LIMIT: i64 = 50;
    pub const MAX_LIMIT: i64 = 100;

    pub fn limit(&self) -> i64 {{
        self.limit
            .unwrap_or(Self::DEFAULT_LIMIT)
            .clamp(1, Self::MAX_LIMIT)
    }}

    pub fn offset(&self) -> i64 {{
        self.offset.unwrap_or(0).max(0)
    }}
}}
"#
        )
    }
}
