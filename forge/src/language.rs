//! Unified target dispatch.
//!
//! Centralizes generator creation and the per-target metadata the CLI prints.

use crudforge_codegen::{CompilationContext, LanguageCodegen};
use crudforge_codegen_go::Generator as GoGenerator;
use crudforge_codegen_java::Generator as JavaGenerator;
use crudforge_codegen_python::Generator as PythonGenerator;
use crudforge_codegen_rust::Generator as RustGenerator;
use crudforge_codegen_typescript::Generator as TypeScriptGenerator;
use crudforge_schema::Target;
use eyre::Result;

/// Generation support for one target.
pub struct TargetSupport {
    pub target: Target,
    /// Build manifest written at the project root.
    pub manifest: &'static str,
    /// Per-entity layers, in the order a request passes through them.
    pub layers: &'static str,
}

impl TargetSupport {
    pub fn get(target: Target) -> Self {
        let (manifest, layers) = match target {
            Target::RustAxum => ("Cargo.toml", "model, repository, service, handler"),
            Target::TypescriptNestjs => (
                "package.json",
                "entity, dto, mapper, service, controller, module",
            ),
            Target::GoGin | Target::GoChi => {
                ("go.mod", "model, mapper, repository, service, handler")
            }
            Target::PythonFastapi => (
                "pyproject.toml",
                "model, schema, mapper, service, router",
            ),
            Target::JavaSpring => (
                "pom.xml",
                "entity, dto, mapper, repository, service, controller",
            ),
        };
        Self {
            target,
            manifest,
            layers,
        }
    }

    pub fn all() -> impl Iterator<Item = Self> {
        Target::ALL.into_iter().map(Self::get)
    }

    /// Create the generator for this target.
    pub fn generator(&self, ctx: CompilationContext) -> Result<Box<dyn LanguageCodegen>> {
        Ok(match self.target {
            Target::RustAxum => Box::new(RustGenerator::from_context(ctx)?),
            Target::TypescriptNestjs => Box::new(TypeScriptGenerator::from_context(ctx)?),
            Target::GoGin | Target::GoChi => Box::new(GoGenerator::from_context(ctx)?),
            Target::PythonFastapi => Box::new(PythonGenerator::from_context(ctx)?),
            Target::JavaSpring => Box::new(JavaGenerator::from_context(ctx)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, compile_sql};

    use super::*;

    #[test]
    fn test_every_target_has_a_generator() {
        for support in TargetSupport::all() {
            let ctx = compile_sql(BLOG_SQL, support.target).unwrap();
            let generator = support.generator(ctx).unwrap();
            assert_eq!(generator.target(), support.target);
            assert!(
                generator.preview().iter().any(|f| f.path == support.manifest),
                "{} does not emit {}",
                support.target,
                support.manifest
            );
        }
    }
}
