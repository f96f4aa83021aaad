use crudforge_codegen::{
    CompilationContext, ComputedData, FileCategory, FileRegistry, LanguageCodegen,
};
use crudforge_ir::DomainModel;
use crudforge_schema::Target;
use eyre::{Result, eyre};

use crate::{
    files::{
        AuthPy, AuthRouterPy, ConfigPy, ConftestPy, DatabasePy, EntityTestPy, EnvExample,
        ErrorsPy, GitIgnore, HelpersPy, JunctionsPy, MainPy, MapperPy, ModelPy, PackageInit,
        PaginationPy, PyProjectToml, RateLimitPy, RepositoryPy, RouterPy, SchemaPy, ServicePy,
        StoragePy, UploadsPy,
    },
    project::PyProject,
};

/// Packages under `app`, with their docstrings.
const PACKAGES: &[(&str, &str)] = &[
    ("app", "The generated API."),
    ("app/models", "SQLAlchemy models, one module per table."),
    ("app/schemas", "Request and response bodies."),
    ("app/mappers", "Conversions between schemas and models."),
    ("app/repositories", "Database access."),
    ("app/services", "Business rules. Edit freely; these files are not regenerated."),
    ("app/routers", "HTTP routes."),
];

/// Python code generator that produces a FastAPI service on SQLAlchemy 2
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
        if target != Target::PythonFastapi {
            return Err(eyre!("target '{}' is not a Python target", target.as_str()));
        }
        Ok(Self::new(model, computed))
    }

    fn project(&self) -> PyProject<'_> {
        PyProject::new(&self.model, &self.computed)
    }
}

impl LanguageCodegen for Generator {
    fn target(&self) -> Target {
        Target::PythonFastapi
    }

    fn file_extension(&self) -> &'static str {
        "py"
    }

    fn generated_dirs(&self) -> Vec<&'static str> {
        vec![
            "app/models",
            "app/schemas",
            "app/mappers",
            "app/repositories",
            "app/services",
            "app/routers",
            "tests",
        ]
    }

    fn registry(&self) -> FileRegistry {
        let project = self.project();
        let features = project.features();
        let database = self.model.meta.database;
        let mut registry = FileRegistry::new();

        registry.register_file(&PyProjectToml::new(project), FileCategory::Config);
        registry.register_file(&EnvExample::new(project), FileCategory::Config);
        registry.register_file(
            &GitIgnore {
                file_storage: features.file_storage,
                database,
            },
            FileCategory::Config,
        );

        for &(package, doc) in PACKAGES {
            registry.register_file(&PackageInit::new(package, doc), FileCategory::Infrastructure);
        }
        registry.register_file(&MainPy::new(project), FileCategory::Infrastructure);
        registry.register_file(&ConfigPy { features }, FileCategory::Infrastructure);
        registry.register_file(&DatabasePy { database }, FileCategory::Infrastructure);
        registry.register_file(&ErrorsPy { database }, FileCategory::Infrastructure);
        registry.register_file(&PaginationPy, FileCategory::Infrastructure);
        if !self.model.junctions.is_empty() {
            registry.register_file(&JunctionsPy::new(project), FileCategory::Infrastructure);
        }

        if features.auth {
            registry.register_file(&AuthPy, FileCategory::Infrastructure);
            registry.register_file(&AuthRouterPy::new(project), FileCategory::Infrastructure);
        }
        if features.rate_limit {
            registry.register_file(&RateLimitPy, FileCategory::Infrastructure);
        }
        if features.file_storage {
            registry.register_file(&StoragePy, FileCategory::Infrastructure);
            registry.register_file(&UploadsPy::new(project), FileCategory::Infrastructure);
        }

        for (entity, key) in project.entities() {
            registry.register_file(&ModelPy::new(project, entity), FileCategory::Generated);
            registry.register_file(&SchemaPy::new(project, entity), FileCategory::Generated);
            registry.register_file(&MapperPy::new(project, entity), FileCategory::Generated);
            registry.register_file(
                &RepositoryPy::new(project, entity, key),
                FileCategory::Generated,
            );
            registry.register_file(&RouterPy::new(project, entity, key), FileCategory::Generated);
            registry.register_file(&ServicePy::new(project, entity, key), FileCategory::Stub);
        }

        if features.tests {
            registry.register_file(
                &PackageInit::new("tests", "API tests against TEST_DATABASE_URL."),
                FileCategory::Generated,
            );
            registry.register_file(&ConftestPy::new(project), FileCategory::Generated);
            registry.register_file(&HelpersPy::new(project), FileCategory::Generated);
            for (entity, key) in project.entities() {
                registry.register_file(
                    &EntityTestPy::new(project, entity, key),
                    FileCategory::Generated,
                );
            }
        }

        registry
    }
}
