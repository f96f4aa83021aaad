//! Lower phase - transforms the parsed schema into the domain model.
//!
//! Junction tables are folded into many-to-many relations, every other table
//! becomes an entity, and each single-column foreign key is visible from
//! both ends.

use std::collections::{HashMap, HashSet};

use crudforge_core::{pluralize, singularize, to_pascal_case, to_snake_case};
use crudforge_ir::{
    DomainModel, Entity, Field, FieldReference, ForeignKey, JunctionRef, JunctionSide,
    JunctionTable, ParsedSchema, ProjectMeta, Relation, RelationKind, SqlTable, TableOrigin,
};
use eyre::Result;

use crate::pipeline::{CompilationContext, Diagnostic, Phase};

/// Phase that builds the [`DomainModel`] from the parsed schema.
pub struct LowerPhase;

impl Phase for LowerPhase {
    fn name(&self) -> &'static str {
        "lower"
    }

    fn description(&self) -> &'static str {
        "Build entities, relations and junctions from tables"
    }

    fn run(&self, ctx: &mut CompilationContext) -> Result<()> {
        let (model, diagnostics) = lower_schema(ctx.config.meta(), &ctx.schema);
        tracing::debug!(
            entities = model.entities.len(),
            junctions = model.junctions.len(),
            "lowered schema"
        );
        ctx.diagnostics.extend(diagnostics);
        ctx.model = Some(model);
        Ok(())
    }
}

/// Lower a parsed schema into a domain model.
pub fn lower_schema(meta: ProjectMeta, schema: &ParsedSchema) -> (DomainModel, Vec<Diagnostic>) {
    let mut lowering = Lowering::new(schema);
    lowering.collect_entities();
    lowering.many_to_one();
    lowering.one_to_many();
    let junctions = lowering.many_to_many();

    let model = DomainModel {
        meta,
        entities: lowering.entities,
        junctions,
    };
    (model, lowering.diagnostics)
}

struct Lowering<'a> {
    schema: &'a ParsedSchema,
    /// Tables lowered to junctions.
    junction_tables: Vec<&'a SqlTable>,
    /// Entity tables in source order, parallel to `entities`.
    entity_tables: Vec<&'a SqlTable>,
    /// Lowercased table name -> index into `entities`.
    index: HashMap<String, usize>,
    entities: Vec<Entity>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Lowering<'a> {
    fn new(schema: &'a ParsedSchema) -> Self {
        let mut junction_tables = Vec::new();
        let mut entity_tables = Vec::new();
        for table in &schema.tables {
            if schema.links_entities(table) {
                junction_tables.push(table);
            } else {
                entity_tables.push(table);
            }
        }

        Self {
            schema,
            junction_tables,
            entity_tables,
            index: HashMap::new(),
            entities: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn collect_entities(&mut self) {
        let mut used_names: HashSet<String> = HashSet::new();
        for (i, table) in self.entity_tables.iter().enumerate() {
            let singular = singularize(&to_snake_case(&table.name));
            let mut name = to_pascal_case(&singular);
            if !used_names.insert(name.clone()) {
                let fallback = to_pascal_case(&table.name);
                self.diagnostics.push(
                    Diagnostic::warning(
                        "lower",
                        format!(
                            "table '{}' would also be named '{}'; using '{}'",
                            table.name, name, fallback
                        ),
                    )
                    .at(&table.name),
                );
                name = fallback;
                used_names.insert(name.clone());
            }
            self.index.insert(table.name.to_lowercase(), i);
            self.entities.push(Entity {
                name,
                table: table.name.clone(),
                plural: pluralize(&singular),
                fields: Vec::new(),
                primary_key: table.primary_key.clone(),
                relations: Vec::new(),
                description: table.comment.clone(),
            });
        }

        for i in 0..self.entity_tables.len() {
            let table = self.entity_tables[i];
            let fields = table
                .columns
                .iter()
                .map(|col| Field {
                    name: col.name.clone(),
                    ty: col.ty.clone(),
                    nullable: col.nullable && !col.primary_key,
                    primary_key: col.primary_key,
                    unique: col.unique,
                    generated: col.is_database_generated(),
                    default: col.default.clone(),
                    references: table
                        .foreign_key_for(&col.name)
                        .and_then(|fk| self.reference(fk)),
                    description: col.comment.clone(),
                })
                .collect();
            self.entities[i].fields = fields;
            tracing::trace!(entity = %self.entities[i].name, table = %table.name, "entity");
        }
    }

    fn entity_index(&self, table: &str) -> Option<usize> {
        self.index.get(&table.to_lowercase()).copied()
    }

    fn reference(&self, fk: &ForeignKey) -> Option<FieldReference> {
        let target = self.entity_index(&fk.ref_table)?;
        Some(FieldReference {
            entity: self.entities[target].name.clone(),
            table: self.entities[target].table.clone(),
            column: self.ref_column(fk),
        })
    }

    /// Referenced column, falling back to the target's first key column.
    fn ref_column(&self, fk: &ForeignKey) -> String {
        fk.ref_columns
            .first()
            .cloned()
            .or_else(|| {
                self.schema
                    .table(&fk.ref_table)
                    .and_then(|t| t.primary_key.first().cloned())
            })
            .unwrap_or_else(|| "id".to_string())
    }

    /// Single-column foreign keys of an entity table that point at entities.
    fn entity_foreign_keys(&self, owner: usize) -> Vec<(&'a ForeignKey, usize)> {
        let table = self.entity_tables[owner];
        let mut keys = Vec::new();
        for fk in &table.foreign_keys {
            if fk.columns.len() != 1 {
                continue;
            }
            if let Some(target) = self.entity_index(&fk.ref_table) {
                keys.push((fk, target));
            }
        }
        keys
    }

    fn many_to_one(&mut self) {
        for owner in 0..self.entity_tables.len() {
            let table = self.entity_tables[owner];
            for fk in table.foreign_keys.iter().filter(|fk| fk.columns.len() > 1) {
                self.diagnostics.push(
                    Diagnostic::warning(
                        "lower",
                        format!(
                            "foreign key ({}) on '{}' spans several columns and is not mapped to a relation",
                            fk.columns.join(", "),
                            table.name
                        ),
                    )
                    .at(&table.name),
                );
            }

            for (fk, target) in self.entity_foreign_keys(owner) {
                let column = &fk.columns[0];
                let candidate = foreign_key_base(column)
                    .unwrap_or_else(|| to_snake_case(&self.entities[target].name));
                let relation = Relation {
                    kind: RelationKind::ManyToOne,
                    name: String::new(),
                    target: self.entities[target].name.clone(),
                    target_table: self.entities[target].table.clone(),
                    local_column: column.clone(),
                    remote_column: self.ref_column(fk),
                    junction: None,
                };
                push_relation(
                    &mut self.entities[owner],
                    relation,
                    candidate,
                    format!("{}_ref", to_snake_case(column)),
                );
            }
        }
    }

    fn one_to_many(&mut self) {
        for owner in 0..self.entity_tables.len() {
            let keys = self.entity_foreign_keys(owner);
            for &(fk, target) in &keys {
                let column = &fk.columns[0];
                let base = foreign_key_base(column).unwrap_or_else(|| to_snake_case(column));
                let owner_plural = self.entities[owner].plural.clone();
                let prefixed = format!("{}_{}", base, owner_plural);

                let siblings = keys.iter().filter(|(_, t)| *t == target).count();
                let candidate = if siblings > 1 {
                    prefixed.clone()
                } else {
                    owner_plural
                };

                let relation = Relation {
                    kind: RelationKind::OneToMany,
                    name: String::new(),
                    target: self.entities[owner].name.clone(),
                    target_table: self.entities[owner].table.clone(),
                    local_column: self.ref_column(fk),
                    remote_column: column.clone(),
                    junction: None,
                };
                push_relation(&mut self.entities[target], relation, candidate, prefixed);
            }
        }
    }

    fn many_to_many(&mut self) -> Vec<JunctionTable> {
        let mut junctions = Vec::new();
        for table in self.junction_tables.clone() {
            let Some((left_fk, right_fk)) = table.junction_sides() else {
                continue;
            };
            let (Some(left), Some(right)) = (
                self.entity_index(&left_fk.ref_table),
                self.entity_index(&right_fk.ref_table),
            ) else {
                continue;
            };

            let left_side = self.junction_side(table, left_fk, left);
            let right_side = self.junction_side(table, right_fk, right);
            let self_referential = left == right;

            for (owner, other, near, far) in [
                (left, right, &left_side, &right_side),
                (right, left, &right_side, &left_side),
            ] {
                let candidate = if self_referential {
                    let column = foreign_key_base(&far.column).unwrap_or_else(|| far.column.clone());
                    pluralize(&to_snake_case(&column))
                } else {
                    self.entities[other].plural.clone()
                };
                let fallback = format!("{}_{}", to_snake_case(&table.name), candidate);
                let relation = Relation {
                    kind: RelationKind::ManyToMany,
                    name: String::new(),
                    target: self.entities[other].name.clone(),
                    target_table: self.entities[other].table.clone(),
                    local_column: near.ref_column.clone(),
                    remote_column: far.ref_column.clone(),
                    junction: Some(JunctionRef {
                        table: table.name.clone(),
                        local_column: near.column.clone(),
                        remote_column: far.column.clone(),
                    }),
                };
                push_relation(&mut self.entities[owner], relation, candidate, fallback);
            }

            junctions.push(JunctionTable {
                table: table.name.clone(),
                left: left_side,
                right: right_side,
                synthesized: table.origin == TableOrigin::Synthesized,
            });
        }
        junctions
    }

    fn junction_side(&self, table: &SqlTable, fk: &ForeignKey, entity: usize) -> JunctionSide {
        let column = fk.columns[0].clone();
        let column_type = table
            .column(&column)
            .map(|c| c.ty.clone())
            .unwrap_or(crudforge_ir::ColumnType::BigInt);
        JunctionSide {
            column,
            column_type,
            entity: self.entities[entity].name.clone(),
            table: self.entities[entity].table.clone(),
            ref_column: self.ref_column(fk),
        }
    }
}

/// Column name without its `_id` suffix (`author_id` -> `author`, `authorId` -> `author`).
fn foreign_key_base(column: &str) -> Option<String> {
    let snake = to_snake_case(column);
    snake
        .strip_suffix("_id")
        .filter(|base| !base.is_empty())
        .map(str::to_string)
}

fn name_taken(entity: &Entity, name: &str) -> bool {
    entity.fields.iter().any(|f| f.name.eq_ignore_ascii_case(name))
        || entity.relations.iter().any(|r| r.name == name)
}

/// Attach a relation under `candidate`, or `fallback` when the candidate is
/// already a field or relation name.
fn push_relation(entity: &mut Entity, mut relation: Relation, candidate: String, fallback: String) {
    relation.name = if name_taken(entity, &candidate) {
        let mut name = fallback;
        while name_taken(entity, &name) {
            name.push('_');
            name.push_str(&relation.target_table.to_lowercase());
        }
        name
    } else {
        candidate
    };
    entity.relations.push(relation);
}
