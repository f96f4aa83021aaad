use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::Features;

/// `src/state.rs`: shared handler state.
pub struct StateRs {
    pub features: Features,
}

impl GeneratedFile for StateRs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("state.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let mut imports = vec!["config::Config", "db::DbPool"];
        let mut fields = String::new();
        let mut setup = String::new();
        let mut inits = String::new();
        if self.features.rate_limit {
            imports.push("rate_limit::RateLimiter");
            fields.push_str("    pub limiter: Arc<RateLimiter>,\n");
            setup.push_str(
                "        let limiter = Arc::new(RateLimiter::new(\n            config.rate_limit_capacity,\n            config.rate_limit_refill_per_sec,\n        ));\n",
            );
            inits.push_str("            limiter,\n");
        }
        if self.features.file_storage {
            imports.push("storage::{LocalStorage, Storage}");
            fields.push_str("    pub storage: Arc<dyn Storage>,\n");
            setup.push_str(
                "        let storage: Arc<dyn Storage> = Arc::new(LocalStorage::new(config.upload_dir.clone()));\n",
            );
            inits.push_str("            storage,\n");
        }

        format!(
            r#"use std::sync::Arc;

use crate::{{{imports}}};

#[derive(Clone)]
pub struct AppState {{
    pub db: DbPool,
    pub config: Arc<Config>,
{fields}}}

impl AppState {{
    pub fn new(db: DbPool, config: Config) -> Self {{
{setup}        Self {{
            db,
            config: Arc::new(config),
{inits}        }}
    }}
}}
"#,
            imports = imports.join(", ")
        )
    }
}
