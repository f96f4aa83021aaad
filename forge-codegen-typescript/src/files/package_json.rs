//! package.json generator for NestJS projects.

use std::path::{Path, PathBuf};

use crudforge_codegen::{DependencyCollector, DependencyKind};
use crudforge_core::{FileRules, GeneratedFile, Overwrite};
use crudforge_ir::DatabaseKind;
use serde_json::{Map, Value, json};

use crate::project::TsProject;

/// The package.json manifest.
pub struct PackageJson<'a> {
    project: TsProject<'a>,
}

impl<'a> PackageJson<'a> {
    pub fn new(project: TsProject<'a>) -> Self {
        Self { project }
    }

    /// npm packages the generated code uses, driven by the features.
    pub fn dependencies(&self) -> DependencyCollector {
        let features = self.project.features();
        let mut deps = DependencyCollector::new();

        deps.add_simple("@nestjs/common", "^10.4.0");
        deps.add_simple("@nestjs/core", "^10.4.0");
        deps.add_simple("@nestjs/platform-express", "^10.4.0");
        deps.add_simple("@nestjs/typeorm", "^10.0.2");
        deps.add_simple("class-transformer", "^0.5.1");
        deps.add_simple("class-validator", "^0.14.1");
        deps.add_simple("dotenv", "^16.4.5");
        deps.add_simple("reflect-metadata", "^0.2.2");
        deps.add_simple("rxjs", "^7.8.1");
        deps.add_simple("typeorm", "^0.3.20");
        match self.project.model.meta.database {
            DatabaseKind::Postgres => deps.add_simple("pg", "^8.12.0"),
            DatabaseKind::Mysql => deps.add_simple("mysql2", "^3.11.0"),
            DatabaseKind::Sqlite => deps.add_simple("sqlite3", "^5.1.7"),
        }
        if features.auth {
            deps.add_simple("@nestjs/jwt", "^10.2.0");
            deps.add_simple("bcryptjs", "^2.4.3");
        }

        deps.add_dev("@types/express", "^4.17.21");
        deps.add_dev("@types/node", "^20.14.0");
        deps.add_dev("ts-node", "^10.9.2");
        deps.add_dev("typescript", "^5.5.4");
        if features.auth {
            deps.add_dev("@types/bcryptjs", "^2.4.6");
        }
        if features.file_storage {
            deps.add_dev("@types/multer", "^1.4.11");
        }
        if features.tests {
            deps.add_dev("@nestjs/testing", "^10.4.0");
            deps.add_dev("@types/jest", "^29.5.12");
            deps.add_dev("@types/supertest", "^6.0.2");
            deps.add_dev("jest", "^29.7.0");
            deps.add_dev("supertest", "^7.0.0");
            deps.add_dev("ts-jest", "^29.2.4");
        }
        deps
    }

    fn section(deps: &DependencyCollector, kind: DependencyKind) -> Value {
        let map: Map<String, Value> = deps
            .sorted(kind)
            .into_iter()
            .map(|(name, spec)| (name.to_string(), Value::String(spec.version.clone())))
            .collect();
        Value::Object(map)
    }
}

impl GeneratedFile for PackageJson<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("package.json")
    }

    fn rules(&self) -> FileRules {
        FileRules {
            overwrite: Overwrite::Always,
            header: None,
        }
    }

    fn render(&self) -> String {
        let meta = &self.project.model.meta;
        let deps = self.dependencies();

        let mut scripts = Map::new();
        scripts.insert("build".into(), json!("tsc -p tsconfig.json"));
        scripts.insert("start".into(), json!("node dist/main.js"));
        scripts.insert("dev".into(), json!("ts-node src/main.ts"));
        if meta.features.tests {
            scripts.insert(
                "test:e2e".into(),
                json!("jest --config test/jest-e2e.json --runInBand"),
            );
        }

        let package = json!({
            "name": meta.kebab_name(),
            "version": meta.version,
            "description": meta
                .description
                .clone()
                .unwrap_or_else(|| format!("{} API", meta.pascal_name())),
            "private": true,
            "scripts": scripts,
            "dependencies": Self::section(&deps, DependencyKind::Runtime),
            "devDependencies": Self::section(&deps, DependencyKind::Dev),
        });
        let mut out = serde_json::to_string_pretty(&package).unwrap_or_default();
        out.push('\n');
        out
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::{
        ComputedData,
        testing::{BLOG_SQL, all_features, compile_sql, compile_sql_with},
    };
    use crudforge_ir::DomainModel;
    use crudforge_schema::Target;

    use super::*;

    fn parts(ctx: crudforge_codegen::CompilationContext) -> (DomainModel, ComputedData) {
        let (_, model, computed) = ctx.into_parts().unwrap();
        (model, computed)
    }

    #[test]
    fn test_default_dependencies() {
        let (model, computed) = parts(compile_sql(BLOG_SQL, Target::TypescriptNestjs).unwrap());
        let deps = PackageJson::new(TsProject::new(&model, &computed)).dependencies();
        assert!(deps.has("pg"));
        assert!(deps.has("jest"));
        assert!(!deps.has("@nestjs/jwt"));
        assert!(!deps.has("@types/multer"));
    }

    #[test]
    fn test_feature_dependencies() {
        let (model, computed) =
            parts(compile_sql_with(BLOG_SQL, Target::TypescriptNestjs, all_features()).unwrap());
        let deps = PackageJson::new(TsProject::new(&model, &computed)).dependencies();
        assert!(deps.has("@nestjs/jwt"));
        assert!(deps.has("bcryptjs"));
        assert!(deps.has("@types/multer"));
    }

    #[test]
    fn test_render_is_valid_json() {
        let (model, computed) = parts(compile_sql(BLOG_SQL, Target::TypescriptNestjs).unwrap());
        let content = PackageJson::new(TsProject::new(&model, &computed)).render();
        let value: Value = serde_json::from_str(&content).unwrap();
        assert_eq!(value["name"], "blog");
        assert_eq!(value["dependencies"]["typeorm"], "^0.3.20");
        assert_eq!(value["scripts"]["test:e2e"], "jest --config test/jest-e2e.json --runInBand");
    }
}
