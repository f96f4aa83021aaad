use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

use crate::{
    files::{HandlerGo, RepositoryGo, ServiceGo},
    go_file::{GoFile, GoFunc},
    project::{Flavor, GoProject},
};

/// `internal/router/router.go`: middleware and every handler on one router.
pub struct RouterGo<'a> {
    project: GoProject<'a>,
}

impl<'a> RouterGo<'a> {
    pub fn new(project: GoProject<'a>) -> Self {
        Self { project }
    }

    fn middleware(&self) -> Vec<String> {
        let features = self.project.features();
        let mut lines = match self.project.flavor {
            Flavor::Gin => vec![
                "r := gin.New()".to_string(),
                "r.Use(gin.Logger(), gin.Recovery())".to_string(),
            ],
            Flavor::Chi => vec![
                "r := chi.NewRouter()".to_string(),
                "r.Use(middleware.RequestID, middleware.RealIP, middleware.Logger, middleware.Recoverer)"
                    .to_string(),
            ],
        };
        if features.rate_limit {
            lines.push(
                "limiter := ratelimit.New(cfg.RateLimitCapacity, cfg.RateLimitRefillPerSec)".into(),
            );
            lines.push(match self.project.flavor {
                Flavor::Gin => "r.Use(limiter.Middleware())".into(),
                Flavor::Chi => "r.Use(limiter.Middleware)".into(),
            });
        }
        lines.push(match self.project.flavor {
            Flavor::Gin => {
                "r.GET(\"/health\", func(c *gin.Context) {\n\tc.String(http.StatusOK, \"ok\")\n})".into()
            }
            Flavor::Chi => {
                "r.Get(\"/health\", func(w http.ResponseWriter, _ *http.Request) {\n\t_, _ = w.Write([]byte(\"ok\"))\n})".into()
            }
        });
        lines
    }

    /// Mount a handler constructed by `handler` at `/route`.
    fn mount(&self, route: &str, handler: &str, guarded: bool) -> String {
        match self.project.flavor {
            Flavor::Gin if guarded => format!("{handler}.Register(r, guard)"),
            Flavor::Gin => format!("{handler}.Register(r)"),
            Flavor::Chi if guarded => format!("r.Mount(\"/{route}\", {handler}.Routes(guard))"),
            Flavor::Chi => format!("r.Mount(\"/{route}\", {handler}.Routes())"),
        }
    }

    fn body(&self, file: &mut GoFile) -> String {
        let project = self.project;
        let features = project.features();
        let mut lines = self.middleware();

        if features.auth {
            file.imports_mut().add_module(&project.internal("auth"));
            lines.push(String::new());
            lines.push("tokens := auth.NewTokens(cfg.JWTSecret, cfg.JWTTTL)".into());
            lines.push(match project.flavor {
                Flavor::Gin => "guard := tokens.Middleware()".into(),
                Flavor::Chi => "guard := tokens.Middleware".into(),
            });
            lines.push(self.mount(
                "auth",
                "handlers.NewAuthHandler(auth.NewStore(db), tokens)",
                false,
            ));
        }

        lines.push(String::new());
        for (entity, _) in project.entities() {
            let repo = format!("{}Repo", project.var(entity));
            lines.push(format!(
                "{repo} := repository.New{}(db)",
                RepositoryGo::type_name(entity)
            ));
            lines.push(self.mount(
                &entity.route(),
                &format!(
                    "handlers.New{}(service.New{}({repo}), {repo})",
                    HandlerGo::type_name(entity),
                    ServiceGo::type_name(entity)
                ),
                features.auth,
            ));
        }

        if features.file_storage {
            file.imports_mut().add_module(&project.internal("storage"));
            lines.push(String::new());
            lines.push("store, err := storage.NewLocal(cfg.UploadDir)".into());
            lines.push("if err != nil {\n\treturn nil, err\n}".into());
            lines.push(self.mount("uploads", "handlers.NewUploadHandler(store)", features.auth));
        }
        lines.push("return r, nil".into());
        lines.join("\n")
    }
}

impl GeneratedFile for RouterGo<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal").join("router").join("router.go")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let project = self.project;
        let mut file = GoFile::new("router")
            .doc("Package router wires middleware and handlers together.")
            .import("database/sql")
            .import("net/http")
            .import(project.flavor.import())
            .import(&project.internal("config"))
            .import(&project.internal("handlers"));
        if project.entities().next().is_some() {
            file = file
                .import(&project.internal("repository"))
                .import(&project.internal("service"));
        }
        if project.flavor == Flavor::Chi {
            file = file.import("github.com/go-chi/chi/v5/middleware");
        }
        if project.features().rate_limit {
            file = file.import(&project.internal("ratelimit"));
        }

        let body = self.body(&mut file);
        file.add(
            &GoFunc::new("New(cfg config.Config, db *sql.DB) (http.Handler, error)")
                .doc("New builds the HTTP handler of the API.")
                .body(body),
        )
        .render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, all_features, compile_sql, compile_sql_with};
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_gin_router_with_features() {
        let ctx = compile_sql_with(BLOG_SQL, Target::GoGin, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = RouterGo::new(GoProject::new(&model, &computed, Flavor::Gin)).render();

        assert!(out.contains("\tguard := tokens.Middleware()\n"));
        assert!(out.contains("\thandlers.NewAuthHandler(auth.NewStore(db), tokens).Register(r)\n"));
        assert!(out.contains("\tpostRepo := repository.NewPostRepository(db)\n"));
        assert!(out.contains(
            "\thandlers.NewPostHandler(service.NewPostService(postRepo), postRepo).Register(r, guard)\n"
        ));
        assert!(out.contains("\tr.Use(limiter.Middleware())\n"));
        assert!(out.contains("store, err := storage.NewLocal(cfg.UploadDir)"));
    }

    #[test]
    fn test_chi_router_mounts() {
        let ctx = compile_sql(BLOG_SQL, Target::GoChi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = RouterGo::new(GoProject::new(&model, &computed, Flavor::Chi)).render();

        assert!(out.contains("\tr.Mount(\"/comments\", handlers.NewCommentHandler(service.NewCommentService(commentRepo), commentRepo).Routes())\n"));
        assert!(out.contains("\t\"github.com/go-chi/chi/v5/middleware\"\n"));
        assert!(!out.contains("tokens"));
        assert!(!out.contains("ratelimit"));
    }
}
