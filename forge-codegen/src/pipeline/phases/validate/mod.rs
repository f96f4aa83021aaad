//! Validate phase - runs lints on the parsed schema.

mod lint;
pub mod lints;

use eyre::{Result, bail};
pub use lint::Lint;
pub use lints::{
    CompositeKeyLint, DuplicateTableLint, EmptyTableLint, MissingPrimaryKeyLint,
    NullableForeignKeyLint, ReservedWordLint, UnknownReferenceLint,
};

use crate::pipeline::{CompilationContext, Phase};

/// Phase that validates the schema using configurable lints.
pub struct ValidatePhase {
    lints: Vec<Box<dyn Lint>>,
}

impl ValidatePhase {
    /// Validate phase with the target-independent lints.
    pub fn new() -> Self {
        Self {
            lints: vec![
                Box::new(EmptyTableLint),
                Box::new(DuplicateTableLint),
                Box::new(UnknownReferenceLint),
                Box::new(MissingPrimaryKeyLint),
                Box::new(CompositeKeyLint),
                Box::new(NullableForeignKeyLint),
            ],
        }
    }

    pub fn empty() -> Self {
        Self { lints: Vec::new() }
    }

    pub fn with_lint(mut self, lint: impl Lint + 'static) -> Self {
        self.lints.push(Box::new(lint));
        self
    }

    pub fn lint_names(&self) -> Vec<&'static str> {
        self.lints.iter().map(|l| l.name()).collect()
    }

    /// Run every lint, recording diagnostics without failing.
    pub fn lint(&self, ctx: &mut CompilationContext) {
        for lint in &self.lints {
            let before = ctx.diagnostics.len();
            lint.check(&ctx.schema, &mut ctx.diagnostics);
            let found = ctx.diagnostics.len() - before;
            if found > 0 {
                tracing::debug!(lint = lint.name(), found, "lint reported");
            }
        }
    }
}

impl Default for ValidatePhase {
    fn default() -> Self {
        Self::new()
    }
}

impl Phase for ValidatePhase {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn description(&self) -> &'static str {
        "Check schema integrity and collect diagnostics"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        self.lint(ctx);

        if ctx.has_errors() {
            bail!("validation failed with {} error(s)", ctx.error_count());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crudforge_ir::ParsedSchema;
    use crudforge_schema::{ProjectConfig, Target, parse_sql};

    use super::*;
    use crate::pipeline::Diagnostic;

    fn context(sql: &str) -> CompilationContext {
        let config = ProjectConfig::new("blog", "schema.sql", Target::RustAxum);
        CompilationContext::new(config, parse_sql(sql, "schema.sql").unwrap())
    }

    #[test]
    fn test_with_errors() {
        struct AlwaysErrorLint;
        impl Lint for AlwaysErrorLint {
            fn name(&self) -> &'static str {
                "always-error"
            }
            fn description(&self) -> &'static str {
                "Always produces an error"
            }
            fn check(&self, _schema: &ParsedSchema, diagnostics: &mut Vec<Diagnostic>) {
                diagnostics.push(Diagnostic::error("always-error", "forced error"));
            }
        }

        let mut ctx = context("CREATE TABLE tags (id INT PRIMARY KEY);");
        let phase = ValidatePhase::empty().with_lint(AlwaysErrorLint);

        assert!(phase.run(&mut ctx).is_err());
        assert!(ctx.has_errors());
    }

    #[test]
    fn test_warnings_allowed() {
        let mut ctx = context("CREATE TABLE memberships (org_id INT, user_id INT, PRIMARY KEY (org_id, user_id));");
        let phase = ValidatePhase::empty().with_lint(CompositeKeyLint);

        assert!(phase.run(&mut ctx).is_ok());
        assert!(ctx.has_warnings());
        assert!(!ctx.has_errors());
    }

    #[test]
    fn test_default_lint_names() {
        assert_eq!(
            ValidatePhase::new().lint_names(),
            [
                "empty-table",
                "duplicate-table",
                "unknown-reference",
                "missing-primary-key",
                "composite-key",
                "nullable-foreign-key",
            ]
        );
    }
}
