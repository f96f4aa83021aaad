//! Computed data from model analysis.
//!
//! [`ComputedData`] holds results several generators need, so each target
//! does not walk the model again for them.

use crudforge_ir::{ColumnType, DomainModel, RelationKind};
use serde::Serialize;

/// Pre-computed data from the domain model.
#[derive(Debug, Default, Clone, Serialize)]
pub struct ComputedData {
    /// Entity names ordered so that referenced entities come first.
    ///
    /// Self-references are ignored; a reference cycle is broken at the
    /// earliest entity in source order.
    pub creation_order: Vec<String>,
    pub entity_count: usize,
    pub junction_count: usize,
    /// Relations counted from both ends.
    pub relation_count: usize,
    pub uses_uuid: bool,
    pub uses_decimal: bool,
    /// Any date, time or timestamp column.
    pub uses_temporal: bool,
    pub uses_json: bool,
    pub uses_binary: bool,
    /// Whether the model has a credential entity for generated auth.
    pub has_auth_entity: bool,
}

impl ComputedData {
    /// Compute all data from a domain model.
    pub fn from_model(model: &DomainModel) -> Self {
        let uses = |pred: fn(&ColumnType) -> bool| {
            model
                .entities
                .iter()
                .flat_map(|e| &e.fields)
                .any(|f| pred(&f.ty))
        };

        Self {
            creation_order: creation_order(model),
            entity_count: model.entities.len(),
            junction_count: model.junctions.len(),
            relation_count: model.entities.iter().map(|e| e.relations.len()).sum(),
            uses_uuid: uses(|ty| matches!(ty, ColumnType::Uuid)),
            uses_decimal: uses(|ty| matches!(ty, ColumnType::Decimal { .. })),
            uses_temporal: uses(ColumnType::is_temporal),
            uses_json: uses(|ty| matches!(ty, ColumnType::Json)),
            uses_binary: uses(|ty| matches!(ty, ColumnType::Binary)),
            has_auth_entity: model.auth_entity().is_some(),
        }
    }

    /// Position of an entity in [`Self::creation_order`].
    pub fn creation_rank(&self, entity: &str) -> Option<usize> {
        self.creation_order.iter().position(|name| name == entity)
    }
}

fn creation_order(model: &DomainModel) -> Vec<String> {
    let dependencies: Vec<Vec<&str>> = model
        .entities
        .iter()
        .map(|entity| {
            entity
                .relations_of(RelationKind::ManyToOne)
                .map(|r| r.target.as_str())
                .filter(|target| *target != entity.name)
                .collect()
        })
        .collect();

    let mut placed = vec![false; model.entities.len()];
    let mut order: Vec<String> = Vec::with_capacity(model.entities.len());

    while order.len() < model.entities.len() {
        let ready = (0..model.entities.len()).find(|&i| {
            !placed[i]
                && dependencies[i]
                    .iter()
                    .all(|dep| order.iter().any(|name| name == dep))
        });
        // On a cycle, fall back to the first entity not yet placed.
        let Some(next) = ready.or_else(|| placed.iter().position(|p| !p)) else {
            break;
        };
        placed[next] = true;
        order.push(model.entities[next].name.clone());
    }
    order
}

#[cfg(test)]
mod tests {
    use crudforge_schema::{ProjectConfig, Target, parse_sql};

    use super::*;
    use crate::pipeline::phases::lower_schema;

    fn model(sql: &str) -> DomainModel {
        let schema = parse_sql(sql, "schema.sql").unwrap();
        let meta = ProjectConfig::new("shop", "schema.sql", Target::RustAxum).meta();
        lower_schema(meta, &schema).0
    }

    #[test]
    fn test_creation_order_puts_parents_first() {
        let model = model(
            "CREATE TABLE order_items (
                id INT PRIMARY KEY,
                order_id INT REFERENCES orders(id),
                price DECIMAL(10,2) NOT NULL
             );
             CREATE TABLE orders (
                id INT PRIMARY KEY,
                customer_id INT REFERENCES customers(id),
                placed_at TIMESTAMP
             );
             CREATE TABLE customers (id INT PRIMARY KEY, email TEXT, password_hash TEXT);",
        );
        let computed = ComputedData::from_model(&model);
        assert_eq!(computed.creation_order, ["Customer", "Order", "OrderItem"]);
        assert_eq!(computed.creation_rank("OrderItem"), Some(2));
        assert!(computed.uses_decimal);
        assert!(computed.uses_temporal);
        assert!(!computed.uses_uuid);
        assert!(!computed.has_auth_entity);
        assert_eq!(computed.relation_count, 4);
    }

    #[test]
    fn test_creation_order_breaks_cycles() {
        let model = model(
            "CREATE TABLE a (id INT PRIMARY KEY, b_id INT REFERENCES b(id));
             CREATE TABLE b (id INT PRIMARY KEY, a_id INT REFERENCES a(id));
             CREATE TABLE nodes (id INT PRIMARY KEY, parent_id INT REFERENCES nodes(id));",
        );
        let computed = ComputedData::from_model(&model);
        assert_eq!(computed.creation_order, ["Node", "A", "B"]);
    }

    #[test]
    fn test_default_is_empty() {
        let computed = ComputedData::default();
        assert!(computed.creation_order.is_empty());
        assert_eq!(computed.entity_count, 0);
        assert!(!computed.uses_json);
    }
}
