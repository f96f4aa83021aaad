//! Compilation context passed through pipeline phases.

use crudforge_ir::{DomainModel, ParsedSchema};
use crudforge_schema::{ProjectConfig, Target};
use eyre::{Result, eyre};

use super::diagnostic::{Diagnostic, Severity};
use crate::schema::ComputedData;

/// State of one compilation, accumulated phase by phase.
#[derive(Debug)]
pub struct CompilationContext {
    pub config: ProjectConfig,
    pub schema: ParsedSchema,
    /// Populated by LowerPhase.
    pub model: Option<DomainModel>,
    /// Populated by AnalyzePhase.
    pub computed: Option<ComputedData>,
    pub diagnostics: Vec<Diagnostic>,
}

impl CompilationContext {
    pub fn new(config: ProjectConfig, schema: ParsedSchema) -> Self {
        Self {
            config,
            schema,
            model: None,
            computed: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn target(&self) -> Target {
        self.config.generate.target
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_error())
    }

    pub fn has_warnings(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity.is_warning())
    }

    pub fn error_count(&self) -> usize {
        self.errors().count()
    }

    pub fn warning_count(&self) -> usize {
        self.warnings().count()
    }

    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn errors(&self) -> impl Iterator<Item = &Diagnostic> {
        self.by_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.by_severity(Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &Diagnostic> {
        self.by_severity(Severity::Info)
    }

    fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }

    /// Split into the pieces a generator needs.
    ///
    /// Fails if LowerPhase or AnalyzePhase has not run.
    pub fn into_parts(self) -> Result<(ProjectConfig, DomainModel, ComputedData)> {
        let model = self
            .model
            .ok_or_else(|| eyre!("domain model not set - did LowerPhase run?"))?;
        let computed = self
            .computed
            .ok_or_else(|| eyre!("computed data not set - did AnalyzePhase run?"))?;
        Ok((self.config, model, computed))
    }
}

#[cfg(test)]
mod tests {
    use crudforge_ir::SchemaFormat;

    use super::*;

    fn make_context() -> CompilationContext {
        let config = ProjectConfig::new("blog", "schema.sql", Target::RustAxum);
        CompilationContext::new(config, ParsedSchema::new("schema.sql", SchemaFormat::Sql))
    }

    #[test]
    fn test_context_diagnostics() {
        let mut ctx = make_context();
        ctx.add_diagnostic(Diagnostic::error("validate", "broken"));
        ctx.add_diagnostic(Diagnostic::warning("validate", "odd"));
        ctx.add_diagnostic(Diagnostic::info("validate", "fyi"));

        assert!(ctx.has_errors());
        assert!(ctx.has_warnings());
        assert_eq!(ctx.error_count(), 1);
        assert_eq!(ctx.warning_count(), 1);
        assert_eq!(ctx.infos().count(), 1);
    }

    #[test]
    fn test_into_parts_requires_phases() {
        let ctx = make_context();
        assert_eq!(ctx.target(), Target::RustAxum);
        let err = ctx.into_parts().unwrap_err();
        assert!(err.to_string().contains("LowerPhase"));
    }
}
