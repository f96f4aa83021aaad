use crudforge_codegen::{
    CompilationContext, ComputedData, FileCategory, FileRegistry, LanguageCodegen,
};
use crudforge_ir::DomainModel;
use crudforge_schema::Target;
use eyre::{Result, eyre};

use crate::{
    files::{
        ApiExceptionJava, ApiTestSupportJava, AppPropertiesJava, ApplicationJava, ApplicationYml,
        AuthControllerJava, ControllerJava, DtoJava, DtoKind, EntityJava, EntityTestJava,
        EnvExample, ErrorHandlerJava, GitIgnore, HealthControllerJava, JwtFilterJava, MapperJava,
        OffsetPageJava, PagingJava, PomXml, RateLimitFilterJava, RepositoryJava,
        SecurityConfigJava, ServiceJava, StorageJava, TokenServiceJava, UploadControllerJava,
        UserAccountsJava,
    },
    project::JavaProject,
};

/// Java code generator that produces a Spring Boot 3 service on JPA
pub struct Generator {
    model: DomainModel,
    computed: ComputedData,
}

impl Generator {
    pub fn new(model: DomainModel, computed: ComputedData) -> Self {
        Self { model, computed }
    }

    pub fn from_context(ctx: CompilationContext) -> Result<Self> {
        let (config, model, computed) = ctx.into_parts()?;
        let target = config.generate.target;
        if target != Target::JavaSpring {
            return Err(eyre!("target '{}' is not a Java target", target.as_str()));
        }
        Ok(Self::new(model, computed))
    }

    fn project(&self) -> JavaProject<'_> {
        JavaProject::new(&self.model, &self.computed)
    }
}

impl LanguageCodegen for Generator {
    fn target(&self) -> Target {
        Target::JavaSpring
    }

    fn file_extension(&self) -> &'static str {
        "java"
    }

    fn generated_dirs(&self) -> Vec<&'static str> {
        vec!["src/main/java", "src/test/java"]
    }

    fn registry(&self) -> FileRegistry {
        let project = self.project();
        let features = project.features();
        let mut registry = FileRegistry::new();

        registry.register_file(&PomXml::new(project), FileCategory::Config);
        registry.register_file(&ApplicationYml::new(project), FileCategory::Config);
        registry.register_file(&EnvExample::new(project), FileCategory::Config);
        registry.register_file(
            &GitIgnore {
                file_storage: features.file_storage,
                database: self.model.meta.database,
            },
            FileCategory::Config,
        );

        registry.register_file(&ApplicationJava::new(project), FileCategory::Infrastructure);
        registry.register_file(&ApiExceptionJava::new(project), FileCategory::Infrastructure);
        registry.register_file(&ErrorHandlerJava::new(project), FileCategory::Infrastructure);
        registry.register_file(&PagingJava::new(project), FileCategory::Infrastructure);
        registry.register_file(&OffsetPageJava::new(project), FileCategory::Infrastructure);
        registry.register_file(&HealthControllerJava::new(project), FileCategory::Infrastructure);
        if AppPropertiesJava::needed(project) {
            registry.register_file(&AppPropertiesJava::new(project), FileCategory::Infrastructure);
        }

        if features.auth {
            registry.register_file(&SecurityConfigJava::new(project), FileCategory::Infrastructure);
            registry.register_file(&TokenServiceJava::new(project), FileCategory::Infrastructure);
            registry.register_file(&JwtFilterJava::new(project), FileCategory::Infrastructure);
            registry.register_file(&UserAccountsJava::new(project), FileCategory::Infrastructure);
            registry.register_file(&AuthControllerJava::new(project), FileCategory::Infrastructure);
        }
        if features.rate_limit {
            registry.register_file(&RateLimitFilterJava::new(project), FileCategory::Infrastructure);
        }
        if features.file_storage {
            registry.register_file(&StorageJava::port(project), FileCategory::Infrastructure);
            registry.register_file(&StorageJava::local(project), FileCategory::Infrastructure);
            registry.register_file(&UploadControllerJava::new(project), FileCategory::Infrastructure);
        }

        for (entity, key) in project.entities() {
            registry.register_file(&EntityJava::new(project, entity), FileCategory::Generated);
            for kind in [DtoKind::Create, DtoKind::Update, DtoKind::Response] {
                registry.register_file(&DtoJava::new(project, entity, kind), FileCategory::Generated);
            }
            registry.register_file(&MapperJava::new(project, entity), FileCategory::Generated);
            registry.register_file(
                &RepositoryJava::new(project, entity, key),
                FileCategory::Generated,
            );
            registry.register_file(
                &ControllerJava::new(project, entity, key),
                FileCategory::Generated,
            );
            registry.register_file(&ServiceJava::new(project, entity, key), FileCategory::Stub);
        }

        if features.tests {
            registry.register_file(&ApiTestSupportJava::new(project), FileCategory::Generated);
            for (entity, key) in project.entities() {
                registry.register_file(
                    &EntityTestJava::new(project, entity, key),
                    FileCategory::Generated,
                );
            }
        }

        registry
    }
}
