use crudforge_codegen::{
    CompilationContext, ComputedData, FileCategory, FileRegistry, LanguageCodegen,
};
use crudforge_ir::DomainModel;
use crudforge_schema::Target;
use eyre::Result;

use crate::{
    files::{
        AuthHandlers, AuthMod, CargoToml, ConfigRs, DbRs, EntityApiTest, EnvExample, ErrorRs,
        GitIgnore, HandlerRs, HandlersMod, LibRs, MainRs, ModRs, ModelRs, RateLimitRs,
        RepositoryRs, RoutesRs, ServiceStub, StateRs, StorageRs, TestCommon, UploadsRs,
    },
    project::RustProject,
};

/// Rust code generator that produces an Axum + sqlx service
pub struct Generator {
    model: DomainModel,
    computed: ComputedData,
}

impl Generator {
    pub fn new(model: DomainModel, computed: ComputedData) -> Self {
        Self { model, computed }
    }

    /// Take the model out of a pipeline run.
    pub fn from_context(ctx: CompilationContext) -> Result<Self> {
        let (_, model, computed) = ctx.into_parts()?;
        Ok(Self::new(model, computed))
    }

    fn project(&self) -> RustProject<'_> {
        RustProject::new(&self.model, &self.computed)
    }

    fn entity_modules(&self) -> Vec<String> {
        self.project()
            .entities()
            .map(|(entity, _)| entity.file_stem())
            .collect()
    }
}

impl LanguageCodegen for Generator {
    fn target(&self) -> Target {
        Target::RustAxum
    }

    fn file_extension(&self) -> &'static str {
        "rs"
    }

    fn generated_dirs(&self) -> Vec<&'static str> {
        vec![
            "src/models",
            "src/repositories",
            "src/services",
            "src/handlers",
            "tests",
        ]
    }

    fn registry(&self) -> FileRegistry {
        let project = self.project();
        let features = project.features();
        let mut registry = FileRegistry::new();

        registry.register_file(&CargoToml::new(project), FileCategory::Config);
        registry.register_file(&EnvExample::new(project), FileCategory::Config);
        registry.register_file(
            &GitIgnore {
                file_storage: features.file_storage,
            },
            FileCategory::Config,
        );

        registry.register_file(&MainRs::new(project), FileCategory::Infrastructure);
        registry.register_file(&LibRs { features }, FileCategory::Infrastructure);
        registry.register_file(&ConfigRs { features }, FileCategory::Infrastructure);
        registry.register_file(
            &DbRs {
                database: self.model.meta.database,
            },
            FileCategory::Infrastructure,
        );
        registry.register_file(&ErrorRs { features }, FileCategory::Infrastructure);
        registry.register_file(&StateRs { features }, FileCategory::Infrastructure);
        registry.register_file(&RoutesRs::new(project), FileCategory::Infrastructure);

        let modules = self.entity_modules();
        let mut handler_modules = modules.clone();
        if features.file_storage {
            handler_modules.push("uploads".to_string());
        }
        registry.register_file(
            &HandlersMod::new(handler_modules),
            FileCategory::Infrastructure,
        );
        for dir in ["models", "repositories", "services"] {
            registry.register_file(
                &ModRs::new(dir, modules.iter().cloned()),
                FileCategory::Infrastructure,
            );
        }

        if features.auth {
            registry.register_file(&AuthMod, FileCategory::Infrastructure);
            registry.register_file(&AuthHandlers::new(project), FileCategory::Infrastructure);
        }
        if features.rate_limit {
            registry.register_file(&RateLimitRs, FileCategory::Infrastructure);
        }
        if features.file_storage {
            registry.register_file(&StorageRs, FileCategory::Infrastructure);
            registry.register_file(
                &UploadsRs {
                    auth: features.auth,
                },
                FileCategory::Infrastructure,
            );
        }

        for (entity, key) in project.entities() {
            registry.register_file(&ModelRs::new(project, entity), FileCategory::Generated);
            registry.register_file(
                &RepositoryRs::new(project, entity, key),
                FileCategory::Generated,
            );
            registry.register_file(&HandlerRs::new(project, entity, key), FileCategory::Generated);
            registry.register_file(&ServiceStub::new(project, entity, key), FileCategory::Stub);
        }

        if features.tests {
            registry.register_file(&TestCommon::new(project), FileCategory::Generated);
            for (entity, key) in project.entities() {
                registry.register_file(
                    &EntityApiTest::new(project, entity, key),
                    FileCategory::Generated,
                );
            }
        }

        registry
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, all_features, compile_sql, compile_sql_with};

    use super::*;

    fn paths(generator: &Generator) -> Vec<String> {
        generator.preview().into_iter().map(|f| f.path).collect()
    }

    #[test]
    fn test_registry_without_features() {
        let ctx = compile_sql(BLOG_SQL, Target::RustAxum).unwrap();
        let generator = Generator::from_context(ctx).unwrap();
        let paths = paths(&generator);

        for expected in [
            "Cargo.toml",
            "src/main.rs",
            "src/models/post.rs",
            "src/repositories/tag.rs",
            "src/services/comment.rs",
            "src/handlers/user.rs",
            "tests/common/mod.rs",
            "tests/post_api.rs",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
        assert!(!paths.iter().any(|p| p.starts_with("src/auth")));
        assert!(!paths.iter().any(|p| p == "src/rate_limit.rs"));
        // the junction table is not an entity
        assert!(!paths.iter().any(|p| p.contains("post_tag")));
    }

    #[test]
    fn test_registry_with_all_features() {
        let ctx = compile_sql_with(BLOG_SQL, Target::RustAxum, all_features()).unwrap();
        let generator = Generator::from_context(ctx).unwrap();
        let paths = paths(&generator);

        for expected in [
            "src/auth/mod.rs",
            "src/auth/handlers.rs",
            "src/rate_limit.rs",
            "src/storage.rs",
            "src/handlers/uploads.rs",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_service_stubs_are_stub_category() {
        let ctx = compile_sql(BLOG_SQL, Target::RustAxum).unwrap();
        let generator = Generator::from_context(ctx).unwrap();
        let stubs: Vec<String> = generator
            .preview()
            .into_iter()
            .filter(|f| f.category == FileCategory::Stub)
            .map(|f| f.path)
            .collect();
        assert_eq!(stubs.len(), 4);
        assert!(stubs.iter().all(|p| p.starts_with("src/services/")));
    }
}
