use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

use crate::project::RustProject;

/// `.env.example` listing every variable `Config::from_env` reads.
pub struct EnvExample<'a> {
    project: RustProject<'a>,
}

impl<'a> EnvExample<'a> {
    pub fn new(project: RustProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for EnvExample<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(".env.example")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let meta = &self.project.model.meta;
        let features = self.project.features();
        let mut out = format!(
            "DATABASE_URL={}\nBIND_ADDR=0.0.0.0:3000\nRUST_LOG=info,tower_http=debug\n",
            meta.database.example_url(&meta.snake_name())
        );
        if features.tests {
            out.push_str(&format!(
                "# Integration tests are skipped unless this is set\nTEST_DATABASE_URL={}\n",
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
