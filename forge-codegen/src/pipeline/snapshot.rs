//! Pipeline snapshot plugin for `--visualize`.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use crudforge_ir::DomainModel;
use eyre::{Result, WrapErr};
use serde::Serialize;

use super::{CompilationContext, Diagnostic, Plugin};
use crate::schema::ComputedData;

/// Pipeline state right after a phase.
#[derive(Debug, Clone, Serialize)]
pub struct PhaseSnapshot {
    pub phase: String,
    /// Number of parsed tables.
    pub tables: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<DomainModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub computed: Option<ComputedData>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Captures a [`PhaseSnapshot`] after each phase, optionally writing
/// `<phase>.json` files as it goes.
#[derive(Default)]
pub struct SnapshotPlugin {
    snapshots: Mutex<Vec<PhaseSnapshot>>,
    output_dir: Option<PathBuf>,
}

impl SnapshotPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output_dir(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            snapshots: Mutex::default(),
            output_dir: Some(output_dir.into()),
        }
    }

    pub fn snapshots(&self) -> Vec<PhaseSnapshot> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PhaseSnapshot>> {
        self.snapshots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn write_snapshot(dir: &Path, snapshot: &PhaseSnapshot) -> Result<()> {
    fs::create_dir_all(dir).wrap_err_with(|| format!("failed to create {}", dir.display()))?;
    let path = dir.join(format!("{}.json", snapshot.phase));
    let json = serde_json::to_string_pretty(snapshot)?;
    fs::write(&path, json).wrap_err_with(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), "wrote snapshot");
    Ok(())
}

impl Plugin for SnapshotPlugin {
    fn name(&self) -> &'static str {
        "snapshot"
    }

    fn on_after_phase(&self, phase: &str, ctx: &mut CompilationContext) -> Result<()> {
        let snapshot = PhaseSnapshot {
            phase: phase.to_string(),
            tables: ctx.schema.tables.len(),
            model: ctx.model.clone(),
            computed: ctx.computed.clone(),
            diagnostics: ctx.diagnostics.clone(),
        };

        if let Some(dir) = &self.output_dir {
            write_snapshot(dir, &snapshot)?;
        }
        self.lock().push(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crudforge_schema::{ProjectConfig, Target, parse_sql};
    use tempfile::TempDir;

    use super::*;
    use crate::pipeline::Pipeline;

    #[test]
    fn test_snapshots_written_per_phase() {
        let temp = TempDir::new().unwrap();
        let plugin = SnapshotPlugin::with_output_dir(temp.path());
        let pipeline = Pipeline::new().plugin(plugin);

        let schema = parse_sql("CREATE TABLE tags (id INT PRIMARY KEY);", "schema.sql").unwrap();
        let config = ProjectConfig::new("blog", "schema.sql", Target::GoGin);
        pipeline.run(config, schema).unwrap();

        for phase in ["validate", "lower", "analyze"] {
            assert!(temp.path().join(format!("{phase}.json")).exists());
        }
        let lower = std::fs::read_to_string(temp.path().join("lower.json")).unwrap();
        assert!(lower.contains("\"Tag\""));
    }

    #[test]
    fn test_snapshot_model_absent_before_lower() {
        let plugin = SnapshotPlugin::new();
        let schema = parse_sql("CREATE TABLE tags (id INT PRIMARY KEY);", "schema.sql").unwrap();
        let mut ctx =
            CompilationContext::new(ProjectConfig::new("blog", "schema.sql", Target::GoGin), schema);
        plugin.on_after_phase("validate", &mut ctx).unwrap();

        let snapshots = plugin.snapshots();
        assert_eq!(snapshots.len(), 1);
        assert!(snapshots[0].model.is_none());
        assert_eq!(snapshots[0].tables, 1);
    }
}
