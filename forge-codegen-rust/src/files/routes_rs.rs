use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

use crate::project::RustProject;

/// `src/routes.rs`: the application router.
pub struct RoutesRs<'a> {
    project: RustProject<'a>,
}

impl<'a> RoutesRs<'a> {
    pub fn new(project: RustProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for RoutesRs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("routes.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let features = self.project.features();
        let router_arg = if features.auth { "state.clone()" } else { "" };

        let mut nests = String::new();
        for (entity, _) in self.project.entities() {
            nests.push_str(&format!(
                "        .nest(\"/{}\", handlers::{}::router({}))\n",
                entity.route(),
                entity.file_stem(),
                router_arg
            ));
        }
        if features.auth {
            nests.push_str("        .nest(\"/auth\", auth::handlers::router())\n");
        }
        if features.file_storage {
            nests.push_str(&format!(
                "        .nest(\"/uploads\", handlers::uploads::router({}))\n",
                router_arg
            ));
        }

        let mut modules = vec!["handlers", "state::AppState"];
        let mut axum_imports = vec!["routing::get", "Router"];
        let mut layers = String::new();
        if features.auth {
            modules.insert(0, "auth");
        }
        if features.rate_limit {
            modules.push("rate_limit");
            axum_imports.insert(0, "middleware");
            layers.push_str(
                "        .layer(middleware::from_fn_with_state(\n            state.clone(),\n            rate_limit::limit,\n        ))\n",
            );
        }

        format!(
            r#"use axum::{{{axum}}};
use tower_http::trace::TraceLayer;

use crate::{{{modules}}};

pub fn app(state: AppState) -> Router {{
    Router::new()
        .route("/health", get(health))
{nests}        .layer(TraceLayer::new_for_http())
{layers}        .with_state(state)
}}

async fn health() -> &'static str {{
    "ok"
}}
"#,
            axum = axum_imports.join(", "),
            modules = modules.join(", ")
        )
    }
}
