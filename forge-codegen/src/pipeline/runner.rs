//! Pipeline orchestrator.

use crudforge_ir::ParsedSchema;
use crudforge_schema::{ProjectConfig, Target};
use eyre::Result;

use super::{
    CompilationContext, Phase, Plugin,
    phases::{AnalyzePhase, LowerPhase, ReservedWordLint, ValidatePhase},
};
use crate::language::NamingConvention;

/// The compilation pipeline orchestrator.
///
/// Runs the built-in phases (validate, lower, analyze) followed by any
/// extra phases, calling plugin hooks around each one.
///
/// ```ignore
/// let ctx = Pipeline::new()
///     .plugin(SnapshotPlugin::with_output_dir(".forge/debug"))
///     .run(config, schema)?;
/// ```
pub struct Pipeline {
    validate: ValidatePhase,
    phases: Vec<Box<dyn Phase>>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Pipeline {
    /// Pipeline with the target-independent lints.
    pub fn new() -> Self {
        Self {
            validate: ValidatePhase::new(),
            phases: Vec::new(),
            plugins: Vec::new(),
        }
    }

    /// Pipeline that also warns about identifiers reserved in the target language.
    pub fn for_target(target: Target) -> Self {
        let naming = NamingConvention::for_target(target);
        Self {
            validate: ValidatePhase::new().with_lint(ReservedWordLint::new(naming)),
            ..Self::new()
        }
    }

    /// Add a phase to run after the built-in phases.
    pub fn phase(mut self, phase: impl Phase + 'static) -> Self {
        self.phases.push(Box::new(phase));
        self
    }

    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    /// Run all phases.
    ///
    /// # Errors
    ///
    /// Fails when validation records an error or any phase fails fatally.
    pub fn run(&self, config: ProjectConfig, schema: ParsedSchema) -> Result<CompilationContext> {
        let mut ctx = CompilationContext::new(config, schema);

        let lower = LowerPhase;
        let analyze = AnalyzePhase;
        let builtin: [&dyn Phase; 3] = [&self.validate, &lower, &analyze];

        for phase in builtin {
            self.run_phase(phase, &mut ctx)?;
        }
        for phase in &self.phases {
            self.run_phase(phase.as_ref(), &mut ctx)?;
        }

        Ok(ctx)
    }

    /// Run validation only, collecting diagnostics without failing on them.
    pub fn check(&self, config: ProjectConfig, schema: ParsedSchema) -> CompilationContext {
        let mut ctx = CompilationContext::new(config, schema);
        self.validate.lint(&mut ctx);
        ctx
    }

    fn run_phase(&self, phase: &dyn Phase, ctx: &mut CompilationContext) -> Result<()> {
        let phase_name = phase.name();
        let _span = tracing::debug_span!("phase", name = phase_name).entered();

        for plugin in &self.plugins {
            plugin.on_before_phase(phase_name, ctx)?;
        }

        phase.run(ctx)?;
        tracing::debug!(diagnostics = ctx.diagnostics.len(), "phase complete");

        for plugin in &self.plugins {
            plugin.on_after_phase(phase_name, ctx)?;
        }

        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
