use std::path::{Path, PathBuf};

use crudforge_codegen::{DependencyCollector, DependencyKind, DependencySpec};
use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::DatabaseKind;

use crate::project::RustProject;

const EDITION: &str = "2021";

/// The Cargo.toml project manifest
pub struct CargoToml<'a> {
    project: RustProject<'a>,
}

impl<'a> CargoToml<'a> {
    pub fn new(project: RustProject<'a>) -> Self {
        Self { project }
    }

    /// Dependencies the generated code uses, driven by column types and features.
    pub fn dependencies(&self) -> DependencyCollector {
        let computed = self.project.computed;
        let features = self.project.features();
        let mut deps = DependencyCollector::new();

        let mut axum_features = vec!["macros"];
        if features.file_storage {
            axum_features.push("multipart");
        }
        deps.add("axum", DependencySpec::new("0.7").with_features(axum_features));
        deps.add("dotenvy", DependencySpec::new("0.15"));
        deps.add("serde", DependencySpec::new("1").with_features(["derive"]));
        deps.add_simple("serde_json", "1");

        let db = match self.project.model.meta.database {
            DatabaseKind::Postgres => "postgres",
            DatabaseKind::Mysql => "mysql",
            DatabaseKind::Sqlite => "sqlite",
        };
        let mut sqlx_features = vec!["runtime-tokio", "tls-rustls", db];
        if computed.uses_temporal {
            sqlx_features.push("chrono");
        }
        if computed.uses_uuid {
            sqlx_features.push("uuid");
        }
        if computed.uses_decimal {
            sqlx_features.push("rust_decimal");
        }
        deps.add("sqlx", DependencySpec::new("0.8").with_features(sqlx_features));

        deps.add_simple("thiserror", "2");
        deps.add("tokio", DependencySpec::new("1").with_features(["full"]));
        deps.add("tower-http", DependencySpec::new("0.6").with_features(["trace"]));
        deps.add_simple("tracing", "0.1");
        deps.add(
            "tracing-subscriber",
            DependencySpec::new("0.3").with_features(["env-filter"]),
        );

        if computed.uses_temporal {
            deps.add("chrono", DependencySpec::new("0.4").with_features(["serde"]));
        }
        if self.project.needs_uuid_crate() {
            deps.add("uuid", DependencySpec::new("1").with_features(["serde", "v4"]));
        }
        if computed.uses_decimal {
            deps.add(
                "rust_decimal",
                DependencySpec::new("1").with_features(["serde-float"]),
            );
        }
        if features.auth {
            deps.add_simple("argon2", "0.5");
            deps.add_simple("jsonwebtoken", "9");
            deps.add(
                "rand_core",
                DependencySpec::new("0.6").with_features(["getrandom"]),
            );
        }

        if features.tests {
            deps.add_dev("http-body-util", "0.1");
            deps.add("tower", DependencySpec::new("0.5").with_features(["util"]).dev());
        }
        deps
    }
}

fn render_dependency(name: &str, spec: &DependencySpec) -> String {
    if spec.features.is_empty() {
        format!("{} = \"{}\"", name, spec.version)
    } else {
        let features: Vec<String> = spec.features.iter().map(|f| format!("\"{}\"", f)).collect();
        format!(
            "{} = {{ version = \"{}\", features = [{}] }}",
            name,
            spec.version,
            features.join(", ")
        )
    }
}

impl GeneratedFile for CargoToml<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("Cargo.toml")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let meta = &self.project.model.meta;
        let deps = self.dependencies();

        let mut out = format!(
            "[package]\nname = \"{}\"\nversion = \"{}\"\nedition = \"{}\"\n",
            meta.kebab_name(),
            meta.version,
            EDITION
        );
        if let Some(description) = &meta.description {
            out.push_str(&format!("description = \"{}\"\n", description.replace('"', "\\\"")));
        }

        out.push_str("\n[dependencies]\n");
        for (name, spec) in deps.sorted(DependencyKind::Runtime) {
            out.push_str(&render_dependency(name, spec));
            out.push('\n');
        }

        let dev = deps.sorted(DependencyKind::Dev);
        if !dev.is_empty() {
            out.push_str("\n[dev-dependencies]\n");
            for (name, spec) in dev {
                out.push_str(&render_dependency(name, spec));
                out.push('\n');
            }
        }
        out
    }
}
