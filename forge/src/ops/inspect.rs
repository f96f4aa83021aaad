//! Inspect operation - describe the lowered model.

use crudforge_codegen::{DisplayStyle, EntityTreeDisplay, Pipeline};
use crudforge_ir::Features;
use eyre::{Context, Result};

use super::describe;
use crate::{
    project::Project,
    reports::{InspectReport, Stats},
};

/// Execute the inspect operation.
///
/// `tree` draws relations with box characters instead of listing fields.
pub fn inspect(project: &Project, tree: bool) -> Result<InspectReport> {
    let config = &project.config;
    let ctx = Pipeline::for_target(config.generate.target)
        .run(config.clone(), project.schema.clone())
        .wrap_err("pipeline failed")?;
    let warnings = ctx.warnings().map(describe).collect();

    let (_, model, computed) = ctx.into_parts()?;
    let style = if tree {
        DisplayStyle::TreeBox
    } else {
        DisplayStyle::WithFields
    };
    let entity_tree = EntityTreeDisplay::new(&model).style(style).to_string();

    Ok(InspectReport {
        name: config.project.name.clone(),
        description: config.project.description.clone(),
        version: config.project.version.to_string(),
        source: project.source_label(),
        target: config.generate.target.label(),
        database: config.generate.database.as_str().to_string(),
        features: enabled_features(&config.features),
        stats: Stats {
            entities: computed.entity_count,
            fields: model.entities.iter().map(|e| e.fields.len()).sum(),
            relations: computed.relation_count,
            junctions: computed.junction_count,
        },
        entity_tree,
        creation_order: computed.creation_order,
        warnings,
    })
}

fn enabled_features(features: &Features) -> Vec<&'static str> {
    [
        ("auth", features.auth),
        ("rate_limit", features.rate_limit),
        ("file_storage", features.file_storage),
        ("tests", features.tests),
    ]
    .into_iter()
    .filter_map(|(name, on)| on.then_some(name))
    .collect()
}
