use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::ProjectMeta;

/// `.env.example` listing every variable `loadConfig` reads.
pub struct EnvExample<'a> {
    pub meta: &'a ProjectMeta,
}

impl GeneratedFile for EnvExample<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(".env.example")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let meta = self.meta;
        let features = meta.features;
        let mut out = format!(
            "DATABASE_URL={}\nPORT=3000\n",
            meta.database.example_url(&meta.snake_name())
        );
        if features.tests {
            out.push_str(&format!(
                "# e2e tests are skipped unless this is set\nTEST_DATABASE_URL={}\n",
                meta.database.example_url(&format!("{}_test", meta.snake_name()))
            ));
        }
        if features.auth {
            out.push_str("JWT_SECRET=change-me\nJWT_TTL_SECS=3600\n");
        }
        if features.rate_limit {
            out.push_str("RATE_LIMIT_CAPACITY=100\nRATE_LIMIT_REFILL_PER_SEC=10\n");
        }
        if features.file_storage {
            out.push_str("UPLOAD_DIR=uploads\n");
        }
        out
    }
}
