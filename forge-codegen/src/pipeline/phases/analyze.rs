//! Analyze phase - computes shared data from the domain model.

use eyre::Result;

use crate::{
    pipeline::{CompilationContext, Phase},
    schema::ComputedData,
};

/// Phase that computes shared analysis data from the domain model.
///
/// Must run after `LowerPhase`, which populates the model.
pub struct AnalyzePhase;

impl Phase for AnalyzePhase {
    fn name(&self) -> &'static str {
        "analyze"
    }

    fn description(&self) -> &'static str {
        "Compute creation order and type usage from the model"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let model = ctx
            .model
            .as_ref()
            .ok_or_else(|| eyre::eyre!("model not set - AnalyzePhase must run after LowerPhase"))?;

        ctx.computed = Some(ComputedData::from_model(model));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crudforge_schema::{ProjectConfig, Target, parse_sql};

    use super::*;
    use crate::pipeline::phases::LowerPhase;

    fn context() -> CompilationContext {
        let schema = parse_sql(
            "CREATE TABLE users (id UUID PRIMARY KEY DEFAULT gen_random_uuid());",
            "schema.sql",
        )
        .unwrap();
        let config = ProjectConfig::new("shop", "schema.sql", Target::GoChi);
        CompilationContext::new(config, schema)
    }

    #[test]
    fn test_analyze_phase() {
        let mut ctx = context();
        LowerPhase.run(&mut ctx).unwrap();
        assert!(ctx.computed.is_none());

        AnalyzePhase.run(&mut ctx).expect("analyze should succeed");

        let computed = ctx.computed.as_ref().unwrap();
        assert_eq!(computed.entity_count, 1);
        assert!(computed.uses_uuid);
    }

    #[test]
    fn test_analyze_phase_requires_model() {
        let mut ctx = context();
        let err = AnalyzePhase.run(&mut ctx).unwrap_err();
        assert!(err.to_string().contains("after LowerPhase"));
    }
}
