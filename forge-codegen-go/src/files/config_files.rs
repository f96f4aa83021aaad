use std::path::{Path, PathBuf};

use crudforge_codegen::{DependencyCollector, DependencyKind};
use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::DatabaseKind;

use crate::project::GoProject;

/// `go.mod` with the module path and the requirements the enabled
/// features pull in. Checksums are left to `go mod tidy`.
pub struct GoMod<'a> {
    project: GoProject<'a>,
}

impl<'a> GoMod<'a> {
    pub fn new(project: GoProject<'a>) -> Self {
        Self { project }
    }

    pub fn dependencies(&self) -> DependencyCollector {
        let features = self.project.features();
        let mut deps = DependencyCollector::new();

        let (router, version) = self.project.flavor.requirement();
        deps.add_simple(router, version);
        deps.add_simple("github.com/joho/godotenv", "v1.5.1");
        match self.project.model.meta.database {
            DatabaseKind::Postgres => deps.add_simple("github.com/jackc/pgx/v5", "v5.6.0"),
            DatabaseKind::Mysql => deps.add_simple("github.com/go-sql-driver/mysql", "v1.8.1"),
            DatabaseKind::Sqlite => deps.add_simple("modernc.org/sqlite", "v1.31.1"),
        }
        if self.project.needs_uuid() {
            deps.add_simple("github.com/google/uuid", "v1.6.0");
        }
        if features.auth {
            deps.add_simple("github.com/golang-jwt/jwt/v5", "v5.2.1");
            deps.add_simple("golang.org/x/crypto", "v0.25.0");
        }
        if features.rate_limit {
            deps.add_simple("golang.org/x/time", "v0.5.0");
        }
        deps
    }
}

impl GeneratedFile for GoMod<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("go.mod")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let deps = self.dependencies();
        let requires: Vec<String> = deps
            .sorted(DependencyKind::Runtime)
            .into_iter()
            .map(|(name, spec)| format!("\t{} {}", name, spec.version))
            .collect();
        format!(
            "module {}\n\ngo 1.22\n\nrequire (\n{}\n)\n",
            self.project.module(),
            requires.join("\n")
        )
    }
}

/// `.env.example` listing every variable `config.Load` reads.
pub struct EnvExample<'a> {
    project: GoProject<'a>,
}

impl<'a> EnvExample<'a> {
    pub fn new(project: GoProject<'a>) -> Self {
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
            "ADDR=:8080\nDATABASE_URL={}\n",
            meta.database.example_url(&meta.snake_name())
        );
        if features.tests {
            out.push_str(&format!(
                "# API tests are skipped unless this is set\nTEST_DATABASE_URL={}\n",
                meta.database
                    .example_url(&format!("{}_test", meta.snake_name()))
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

/// The .gitignore file
pub struct GitIgnore {
    pub file_storage: bool,
    pub database: DatabaseKind,
}

impl GeneratedFile for GitIgnore {
    fn path(&self, base: &Path) -> PathBuf {
        base.join(".gitignore")
    }

    fn rules(&self) -> FileRules {
        FileRules::if_missing()
    }

    fn render(&self) -> String {
        let mut out = String::from("/bin\n.env\n*.test\ncoverage.out\n");
        if self.database == DatabaseKind::Sqlite {
            out.push_str("*.db\n");
        }
        if self.file_storage {
            out.push_str("/uploads\n");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, all_features, compile_sql, compile_sql_with};
    use crudforge_schema::Target;

    use super::*;
    use crate::project::Flavor;

    #[test]
    fn test_go_mod_requirements() {
        let ctx = compile_sql_with(BLOG_SQL, Target::GoChi, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Chi);
        let out = GoMod::new(project).render();

        assert!(out.starts_with("module blog\n\ngo 1.22\n"));
        assert!(out.contains("\tgithub.com/go-chi/chi/v5 v5.1.0\n"));
        assert!(out.contains("\tgithub.com/golang-jwt/jwt/v5 v5.2.1\n"));
        assert!(out.contains("\tgolang.org/x/time v0.5.0\n"));
        assert!(out.contains("\tgithub.com/jackc/pgx/v5 v5.6.0\n"));
        assert!(!out.contains("gin-gonic"));
    }

    #[test]
    fn test_go_mod_without_features() {
        let ctx = compile_sql(BLOG_SQL, Target::GoGin).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Gin);
        let deps = GoMod::new(project).dependencies();

        assert!(deps.has("github.com/gin-gonic/gin"));
        assert!(!deps.has("github.com/golang-jwt/jwt/v5"));
        assert!(!deps.has("github.com/google/uuid"));
    }
}
