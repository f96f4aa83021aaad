use crudforge_codegen::{
    CompilationContext, ComputedData, FileCategory, FileRegistry, LanguageCodegen,
};
use crudforge_ir::DomainModel;
use crudforge_schema::Target;
use eyre::Result;

use crate::{
    files::{
        AppModuleTs, AppSetupTs, AuthControllerTs, AuthModuleTs, AuthServiceTs, ConfigTs,
        ControllerTs, CredentialsDtoTs, DatabaseTs, DtoKind, EntityE2eTest, EntityTs, EnvExample,
        GitIgnore, JestConfig, JwtGuardTs, MainTs, MapperTs, MappingTs, ModuleTs, PackageJson,
        PaginationTs, PasswordTs, QueryFailedFilterTs, RepositoryTs, RequestDtoTs,
        ResponseDtoTs, ServiceTs, StorageModuleTs, StorageTs, TestHelpers, ThrottleGuardTs,
        TokenBucketTs, TransformersTs, TsConfig, UploadsControllerTs,
    },
    project::TsProject,
};

/// TypeScript code generator that produces a NestJS + TypeORM service
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

    fn project(&self) -> TsProject<'_> {
        TsProject::new(&self.model, &self.computed)
    }
}

impl LanguageCodegen for Generator {
    fn target(&self) -> Target {
        Target::TypescriptNestjs
    }

    fn file_extension(&self) -> &'static str {
        "ts"
    }

    fn generated_dirs(&self) -> Vec<&'static str> {
        vec!["src", "test"]
    }

    fn registry(&self) -> FileRegistry {
        let project = self.project();
        let features = project.features();
        let database = self.model.meta.database;
        let mut registry = FileRegistry::new();

        registry.register_file(&PackageJson::new(project), FileCategory::Config);
        registry.register_file(&TsConfig, FileCategory::Config);
        registry.register_file(
            &EnvExample {
                meta: &self.model.meta,
            },
            FileCategory::Config,
        );
        registry.register_file(
            &GitIgnore {
                file_storage: features.file_storage,
            },
            FileCategory::Config,
        );

        registry.register_file(&MainTs, FileCategory::Infrastructure);
        registry.register_file(&AppSetupTs, FileCategory::Infrastructure);
        registry.register_file(&AppModuleTs::new(project), FileCategory::Infrastructure);
        registry.register_file(&ConfigTs { features }, FileCategory::Infrastructure);
        registry.register_file(&DatabaseTs { database }, FileCategory::Infrastructure);
        registry.register_file(&PaginationTs, FileCategory::Infrastructure);
        registry.register_file(&MappingTs, FileCategory::Infrastructure);
        registry.register_file(&QueryFailedFilterTs { database }, FileCategory::Infrastructure);
        if self.computed.uses_decimal {
            registry.register_file(&TransformersTs, FileCategory::Infrastructure);
        }

        if features.auth {
            registry.register_file(&PasswordTs, FileCategory::Infrastructure);
            registry.register_file(&CredentialsDtoTs, FileCategory::Infrastructure);
            registry.register_file(&AuthServiceTs::new(project), FileCategory::Infrastructure);
            registry.register_file(&AuthControllerTs, FileCategory::Infrastructure);
            registry.register_file(&JwtGuardTs, FileCategory::Infrastructure);
            registry.register_file(&AuthModuleTs, FileCategory::Infrastructure);
        }
        if features.rate_limit {
            registry.register_file(&TokenBucketTs, FileCategory::Infrastructure);
            registry.register_file(&ThrottleGuardTs, FileCategory::Infrastructure);
        }
        if features.file_storage {
            registry.register_file(&StorageTs, FileCategory::Infrastructure);
            registry.register_file(&StorageModuleTs, FileCategory::Infrastructure);
            registry.register_file(
                &UploadsControllerTs {
                    auth: features.auth,
                },
                FileCategory::Infrastructure,
            );
        }

        for (entity, key) in project.entities() {
            registry.register_file(&EntityTs::new(project, entity), FileCategory::Generated);
            for kind in [DtoKind::Create, DtoKind::Update] {
                registry.register_file(
                    &RequestDtoTs::new(project, entity, kind),
                    FileCategory::Generated,
                );
            }
            registry.register_file(&ResponseDtoTs::new(project, entity), FileCategory::Generated);
            registry.register_file(&MapperTs::new(project, entity), FileCategory::Generated);
            registry.register_file(
                &RepositoryTs::new(project, entity, key),
                FileCategory::Generated,
            );
            registry.register_file(
                &ControllerTs::new(project, entity, key),
                FileCategory::Generated,
            );
            registry.register_file(&ModuleTs::new(project, entity), FileCategory::Generated);
            registry.register_file(&ServiceTs::new(project, entity, key), FileCategory::Stub);
        }

        if features.tests {
            registry.register_file(&JestConfig, FileCategory::Config);
            registry.register_file(&TestHelpers::new(project), FileCategory::Generated);
            for (entity, key) in project.entities() {
                registry.register_file(
                    &EntityE2eTest::new(project, entity, key),
                    FileCategory::Generated,
                );
            }
        }

        registry
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{
        BLOG_SQL, PRODUCT_SQL, all_features, compile_sql, compile_sql_with,
    };

    use super::*;

    fn paths(generator: &Generator) -> Vec<String> {
        generator.preview().into_iter().map(|f| f.path).collect()
    }

    #[test]
    fn test_registry_without_features() {
        let ctx = compile_sql(BLOG_SQL, Target::TypescriptNestjs).unwrap();
        let generator = Generator::from_context(ctx).unwrap();
        let paths = paths(&generator);

        for expected in [
            "package.json",
            "tsconfig.json",
            "src/main.ts",
            "src/app.module.ts",
            "src/post/post.entity.ts",
            "src/post/dto/create-post.dto.ts",
            "src/post/dto/update-post.dto.ts",
            "src/post/dto/post-response.dto.ts",
            "src/tag/tag.repository.ts",
            "src/comment/comment.service.ts",
            "src/user/user.controller.ts",
            "src/user/user.module.ts",
            "test/jest-e2e.json",
            "test/helpers.ts",
            "test/post.e2e-spec.ts",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
        assert!(!paths.iter().any(|p| p.starts_with("src/auth")));
        assert!(!paths.iter().any(|p| p.starts_with("src/rate-limit")));
        assert!(!paths.iter().any(|p| p == "src/common/transformers.ts"));
        assert!(!paths.iter().any(|p| p.contains("post-tag")));
    }

    #[test]
    fn test_registry_with_all_features() {
        let ctx = compile_sql_with(BLOG_SQL, Target::TypescriptNestjs, all_features()).unwrap();
        let generator = Generator::from_context(ctx).unwrap();
        let paths = paths(&generator);

        for expected in [
            "src/auth/auth.module.ts",
            "src/auth/auth.service.ts",
            "src/auth/jwt-auth.guard.ts",
            "src/rate-limit/throttle.guard.ts",
            "src/storage/storage.ts",
            "src/storage/uploads.controller.ts",
        ] {
            assert!(paths.iter().any(|p| p == expected), "missing {expected}");
        }
    }

    #[test]
    fn test_decimal_columns_add_transformers() {
        let ctx = compile_sql(PRODUCT_SQL, Target::TypescriptNestjs).unwrap();
        let generator = Generator::from_context(ctx).unwrap();
        assert!(paths(&generator).iter().any(|p| p == "src/common/transformers.ts"));
    }

    #[test]
    fn test_service_stubs_are_stub_category() {
        let ctx = compile_sql(BLOG_SQL, Target::TypescriptNestjs).unwrap();
        let generator = Generator::from_context(ctx).unwrap();
        let stubs: Vec<String> = generator
            .preview()
            .into_iter()
            .filter(|f| f.category == FileCategory::Stub)
            .map(|f| f.path)
            .collect();
        assert_eq!(stubs.len(), 4);
        assert!(stubs.iter().all(|p| p.ends_with(".service.ts")));
    }
}
