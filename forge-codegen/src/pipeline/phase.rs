//! Pipeline phase trait.

use eyre::Result;

use super::CompilationContext;

/// A phase in the compilation pipeline.
///
/// Built-in phases:
/// - `ValidatePhase` - runs lints over the parsed schema
/// - `LowerPhase` - builds the domain model
/// - `AnalyzePhase` - computes shared data from the model
pub trait Phase: Send + Sync {
    /// Name used in diagnostics and plugin hooks.
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Run this phase. Non-fatal issues are recorded as diagnostics.
    fn run(&self, ctx: &mut CompilationContext) -> Result<()>;
}
