use crudforge_codegen::{
    CompilationContext, ComputedData, FileCategory, FileRegistry, LanguageCodegen,
};
use crudforge_ir::DomainModel;
use crudforge_schema::Target;
use eyre::{Result, eyre};

use crate::{
    files::{
        ApiErrGo, AuthGo, AuthHandlerGo, AuthStoreGo, ConfigGo, DbGo, EntityTestGo, EnvExample,
        GitIgnore, GoMod, HandlerGo, MainGo, MapperGo, ModelGo, RateLimitGo, RepositoryBaseGo,
        RepositoryGo, RespondGo, RouterGo, ServiceGo, StorageGo, TestHelpersGo, UploadsGo,
    },
    project::{Flavor, GoProject},
};

/// Go code generator that produces a `database/sql` service behind Gin or Chi
pub struct Generator {
    model: DomainModel,
    computed: ComputedData,
    flavor: Flavor,
}

impl Generator {
    pub fn new(model: DomainModel, computed: ComputedData, flavor: Flavor) -> Self {
        Self {
            model,
            computed,
            flavor,
        }
    }

    /// Take the model out of a pipeline run. The configured target picks the
    /// router.
    pub fn from_context(ctx: CompilationContext) -> Result<Self> {
        let (config, model, computed) = ctx.into_parts()?;
        let target = config.generate.target;
        let flavor = Flavor::from_target(target)
            .ok_or_else(|| eyre!("target '{}' is not a Go target", target.as_str()))?;
        Ok(Self::new(model, computed, flavor))
    }

    fn project(&self) -> GoProject<'_> {
        GoProject::new(&self.model, &self.computed, self.flavor)
    }
}

impl LanguageCodegen for Generator {
    fn target(&self) -> Target {
        self.flavor.target()
    }

    fn file_extension(&self) -> &'static str {
        "go"
    }

    fn generated_dirs(&self) -> Vec<&'static str> {
        vec![
            "internal/models",
            "internal/repository",
            "internal/service",
            "internal/handlers",
            "tests",
        ]
    }

    fn registry(&self) -> FileRegistry {
        let project = self.project();
        let features = project.features();
        let database = self.model.meta.database;
        let mut registry = FileRegistry::new();

        registry.register_file(&GoMod::new(project), FileCategory::Config);
        registry.register_file(&EnvExample::new(project), FileCategory::Config);
        registry.register_file(
            &GitIgnore {
                file_storage: features.file_storage,
                database,
            },
            FileCategory::Config,
        );

        registry.register_file(&MainGo::new(project), FileCategory::Infrastructure);
        registry.register_file(&ConfigGo { features }, FileCategory::Infrastructure);
        registry.register_file(&DbGo { database }, FileCategory::Infrastructure);
        registry.register_file(&ApiErrGo { database }, FileCategory::Infrastructure);
        registry.register_file(&RespondGo::new(project), FileCategory::Infrastructure);
        registry.register_file(&RepositoryBaseGo, FileCategory::Infrastructure);
        registry.register_file(&RouterGo::new(project), FileCategory::Infrastructure);

        if features.auth {
            registry.register_file(
                &AuthGo {
                    flavor: self.flavor,
                },
                FileCategory::Infrastructure,
            );
            registry.register_file(&AuthStoreGo::new(project), FileCategory::Infrastructure);
            registry.register_file(&AuthHandlerGo::new(project), FileCategory::Infrastructure);
        }
        if features.rate_limit {
            registry.register_file(
                &RateLimitGo {
                    flavor: self.flavor,
                },
                FileCategory::Infrastructure,
            );
        }
        if features.file_storage {
            registry.register_file(&StorageGo, FileCategory::Infrastructure);
            registry.register_file(&UploadsGo::new(project), FileCategory::Infrastructure);
        }

        for (entity, key) in project.entities() {
            registry.register_file(&ModelGo::new(project, entity), FileCategory::Generated);
            registry.register_file(&MapperGo::new(project, entity), FileCategory::Generated);
            registry.register_file(
                &RepositoryGo::new(project, entity, key),
                FileCategory::Generated,
            );
            registry.register_file(&HandlerGo::new(project, entity, key), FileCategory::Generated);
            registry.register_file(&ServiceGo::new(project, entity, key), FileCategory::Stub);
        }

        if features.tests {
            registry.register_file(&TestHelpersGo::new(project), FileCategory::Generated);
            for (entity, key) in project.entities() {
                registry.register_file(
                    &EntityTestGo::new(project, entity, key),
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
        let ctx = compile_sql(BLOG_SQL, Target::GoGin).unwrap();
        let generator = Generator::from_context(ctx).unwrap();
        assert_eq!(generator.target(), Target::GoGin);
        let paths = paths(&generator);

        for expected in [
            "go.mod",
            "cmd/server/main.go",
            "internal/config/config.go",
            "internal/apierr/apierr.go",
            "internal/models/post.go",
            "internal/models/post_mapper.go",
            "internal/repository/repository.go",
            "internal/repository/tag.go",
            "internal/service/comment.go",
            "internal/handlers/user.go",
            "internal/router/router.go",
            "tests/helpers_test.go",
            "tests/post_test.go",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
        assert!(!paths.iter().any(|p| p.starts_with("internal/auth")));
        assert!(!paths.iter().any(|p| p.starts_with("internal/ratelimit")));
        assert!(!paths.iter().any(|p| p.contains("post_tag")));
    }

    #[test]
    fn test_registry_with_all_features() {
        let ctx = compile_sql_with(BLOG_SQL, Target::GoChi, all_features()).unwrap();
        let generator = Generator::from_context(ctx).unwrap();
        assert_eq!(generator.target(), Target::GoChi);
        let paths = paths(&generator);

        for expected in [
            "internal/auth/auth.go",
            "internal/auth/store.go",
            "internal/handlers/auth.go",
            "internal/ratelimit/ratelimit.go",
            "internal/storage/storage.go",
            "internal/handlers/uploads.go",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_rejects_other_targets() {
        let ctx = compile_sql(BLOG_SQL, Target::RustAxum).unwrap();
        assert!(Generator::from_context(ctx).is_err());
    }

    #[test]
    fn test_service_stubs_are_stub_category() {
        let ctx = compile_sql(BLOG_SQL, Target::GoGin).unwrap();
        let generator = Generator::from_context(ctx).unwrap();
        let stubs: Vec<String> = generator
            .preview()
            .into_iter()
            .filter(|f| f.category == FileCategory::Stub)
            .map(|f| f.path)
            .collect();
        assert_eq!(stubs.len(), 4);
        assert!(stubs.iter().all(|p| p.starts_with("internal/service/")));
    }
}
