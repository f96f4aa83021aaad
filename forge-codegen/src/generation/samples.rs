//! Sample request payloads for generated API tests.

use crudforge_ir::{ColumnType, DomainModel, Entity, Field};
use serde_json::{Value, json};

use crate::schema::ComputedData;

/// A JSON value accepted by a column of this type.
///
/// Character columns get a value that fits their declared length.
pub fn sample_value(field: &Field) -> Value {
    match &field.ty {
        ColumnType::SmallInt | ColumnType::Integer | ColumnType::BigInt => json!(1),
        ColumnType::Decimal { .. } => json!(9.99),
        ColumnType::Real | ColumnType::Double => json!(1.5),
        ColumnType::Boolean => json!(true),
        ColumnType::Char(_) | ColumnType::Varchar(_) | ColumnType::Text | ColumnType::Other(_) => {
            let text = if field.name.to_ascii_lowercase().contains("email") {
                "user@example.com".to_string()
            } else {
                format!("sample {}", field.name)
            };
            json!(fit(text, field.ty.max_length()))
        }
        ColumnType::Uuid => json!("00000000-0000-4000-8000-000000000001"),
        ColumnType::Date => json!("2024-01-01"),
        ColumnType::Time => json!("12:00:00"),
        ColumnType::Timestamp => json!("2024-01-01T12:00:00"),
        ColumnType::TimestampTz => json!("2024-01-01T12:00:00Z"),
        ColumnType::Json => json!({ "key": "value" }),
        ColumnType::Binary => json!([1, 2, 3]),
        ColumnType::Enum(values) => json!(values.first().cloned().unwrap_or_default()),
    }
}

fn fit(text: String, max: Option<u32>) -> String {
    match max {
        Some(n) => text.chars().take(n as usize).collect(),
        None => text,
    }
}

/// Fields a create request sends: required ones, plus every foreign key so
/// tests exercise relations.
pub fn sample_fields(entity: &Entity) -> impl Iterator<Item = &Field> {
    entity
        .insertable_fields()
        .filter(|f| f.required_on_create() || f.references.is_some())
}

/// Entities that must exist before `entity` can be created, paired with the
/// foreign key field pointing at them.
///
/// Only parents earlier in the creation order are returned, so following the
/// chain always terminates.
pub fn required_parents<'a>(
    model: &'a DomainModel,
    computed: &ComputedData,
    entity: &'a Entity,
) -> Vec<(&'a Field, &'a Entity)> {
    let rank = computed.creation_rank(&entity.name);
    sample_fields(entity)
        .filter_map(|field| {
            let reference = field.references.as_ref()?;
            let parent = model.entity(&reference.entity)?;
            let earlier = match (computed.creation_rank(&parent.name), rank) {
                (Some(p), Some(r)) => p < r,
                _ => false,
            };
            earlier.then_some((field, parent))
        })
        .collect()
}

/// How a generated test fills one field of a create request.
#[derive(Debug, Clone)]
pub enum SampleSource<'a> {
    /// Copy `column` from a parent row the test creates first.
    Parent {
        binding: String,
        entity: &'a Entity,
        column: &'a str,
    },
    /// A fresh value per call, for unique and key columns.
    Unique,
    Literal(Value),
}

/// Variable holding the parent row a foreign key points at
/// (`author_id` -> `author`).
pub fn parent_binding(field: &Field) -> String {
    field
        .name
        .strip_suffix("_id")
        .filter(|base| !base.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}_parent", field.name))
}

/// The create payload of `entity`, field by field.
///
/// Nullable foreign keys whose parent cannot be created first are left out.
pub fn sample_plan<'a>(
    model: &'a DomainModel,
    computed: &ComputedData,
    entity: &'a Entity,
) -> Vec<(&'a Field, SampleSource<'a>)> {
    let parents = required_parents(model, computed, entity);
    sample_fields(entity)
        .filter_map(|field| {
            if let Some((_, parent)) = parents.iter().find(|(f, _)| f.name == field.name) {
                let column = field
                    .references
                    .as_ref()
                    .map(|r| r.column.as_str())
                    .unwrap_or("id");
                return Some((
                    field,
                    SampleSource::Parent {
                        binding: parent_binding(field),
                        entity: parent,
                        column,
                    },
                ));
            }
            if field.references.is_some() && field.nullable {
                return None;
            }
            if field.unique || field.primary_key {
                return Some((field, SampleSource::Unique));
            }
            Some((field, SampleSource::Literal(sample_value(field))))
        })
        .collect()
}

/// A field an update test can change, with its new value.
///
/// Prefers plain text, then booleans, then numbers. Foreign keys, unique
/// columns and the password column are skipped.
pub fn update_sample(entity: &Entity) -> Option<(&Field, Value)> {
    let password = entity.password_field().map(|f| f.name.as_str());
    let candidates = || {
        entity.updatable_fields().filter(move |f| {
            f.references.is_none() && !f.unique && Some(f.name.as_str()) != password
        })
    };
    if let Some(field) = candidates().find(|f| {
        matches!(
            f.ty,
            ColumnType::Char(_) | ColumnType::Varchar(_) | ColumnType::Text
        )
    }) {
        return Some((field, json!(fit("updated".into(), field.ty.max_length()))));
    }
    if let Some(field) = candidates().find(|f| f.ty == ColumnType::Boolean) {
        return Some((field, json!(false)));
    }
    candidates()
        .find(|f| f.ty.is_integer())
        .map(|field| (field, json!(2)))
}

/// Path segment for a row key that no test creates.
pub fn missing_key_literal(field: &Field) -> &'static str {
    if field.ty.is_integer() {
        "2147483000"
    } else if matches!(field.ty, ColumnType::Uuid) {
        "00000000-0000-4000-8000-00000000ffff"
    } else {
        "missing-key"
    }
}
