//! OpenAPI component schemas as tables.
//!
//! Every object schema under `components.schemas` (Swagger 2: `definitions`)
//! becomes a table. `$ref` properties become foreign keys and arrays of
//! `$ref` become synthesized junction tables.

mod types;

use std::collections::{BTreeSet, HashSet};

use crudforge_core::{pluralize, singularize, to_snake_case};
use crudforge_ir::{
    ColumnType, ForeignKey, ParsedSchema, ReferentialAction, SchemaFormat, SqlColumn, SqlTable,
    TableOrigin,
};
use serde_json::{Map, Value};

use crate::{Error, Result, error::SourceContext};

const REF_PREFIXES: &[&str] = &["#/components/schemas/", "#/definitions/"];

/// Parse an OpenAPI (JSON or YAML) document into tables.
pub fn parse_openapi(src: &str, filename: &str) -> Result<ParsedSchema> {
    let ctx = SourceContext::new(src, filename);
    let document = load_document(&ctx)?;

    let (schemas, base) = match document.pointer("/components/schemas") {
        Some(v) => (v, "/components/schemas"),
        None => match document.get("definitions") {
            Some(v) => (v, "/definitions"),
            None => {
                return Err(Error::openapi(
                    "document has no 'components.schemas' section",
                    "",
                ));
            }
        },
    };
    let schemas = schemas
        .as_object()
        .ok_or_else(|| Error::openapi("component schemas must be a mapping", base))?;

    let builder = Builder::new(schemas, base)?;
    let schema = builder.build(filename)?;
    tracing::debug!(
        source = filename,
        tables = schema.tables.len(),
        "parsed OpenAPI schema"
    );
    Ok(schema)
}

fn load_document(ctx: &SourceContext) -> Result<Value> {
    let is_json = ctx.src().trim_start().starts_with('{');
    if is_json {
        serde_json::from_str(ctx.src())
            .map_err(|e| ctx.document_error(e.to_string(), e.line(), e.column()))
    } else {
        serde_yaml::from_str(ctx.src()).map_err(|e| {
            let (line, column) = e
                .location()
                .map(|l| (l.line(), l.column()))
                .unwrap_or((0, 0));
            ctx.document_error(e.to_string(), line, column)
        })
    }
}

/// Table name for a schema name (`BlogPost` -> `blog_posts`).
fn table_name(schema: &str) -> String {
    pluralize(&to_snake_case(schema))
}

/// Name of the schema a local `$ref` points at.
fn ref_target(reference: &str) -> Option<&str> {
    REF_PREFIXES
        .iter()
        .find_map(|prefix| reference.strip_prefix(prefix))
}

/// A `$ref` held directly or through a single-element `allOf`.
fn direct_ref(schema: &Value) -> Option<&str> {
    if let Some(r) = schema.get("$ref").and_then(Value::as_str) {
        return Some(r);
    }
    match schema.get("allOf").and_then(Value::as_array) {
        Some(parts) if parts.len() == 1 => parts[0].get("$ref").and_then(Value::as_str),
        _ => None,
    }
}

struct CrossRef {
    owner: String,
    target: String,
    property: String,
}

struct Builder<'a> {
    schemas: &'a Map<String, Value>,
    base: &'a str,
    /// Schemas that become tables, in document order.
    tables: Vec<&'a str>,
}

impl<'a> Builder<'a> {
    fn new(schemas: &'a Map<String, Value>, base: &'a str) -> Result<Self> {
        let mut composed_only = HashSet::new();
        let mut referenced = HashSet::new();
        for (name, schema) in schemas {
            let pointer = format!("{}/{}", base, name);
            if let Some(parts) = schema.get("allOf").and_then(Value::as_array) {
                for part in parts {
                    if let Some(r) = part.get("$ref").and_then(Value::as_str) {
                        composed_only.insert(Self::resolve_name(schemas, r, &pointer)?);
                    }
                }
            }
            if let Some(props) = schema.get("properties").and_then(Value::as_object) {
                for prop in props.values() {
                    let target = direct_ref(prop).or_else(|| {
                        prop.get("items")
                            .and_then(|items| items.get("$ref"))
                            .and_then(Value::as_str)
                    });
                    if let Some(r) = target {
                        referenced.insert(Self::resolve_name(schemas, r, &pointer)?);
                    }
                }
            }
        }

        let tables = schemas
            .iter()
            .filter(|(name, schema)| {
                let object = is_object_schema(schema);
                let base_only = composed_only.contains(name.as_str())
                    && !referenced.contains(name.as_str());
                if object && base_only {
                    tracing::debug!(schema = %name, "skipping allOf base schema");
                }
                object && !base_only
            })
            .map(|(name, _)| name.as_str())
            .collect();

        Ok(Self {
            schemas,
            base,
            tables,
        })
    }

    fn resolve_name<'s>(
        schemas: &'s Map<String, Value>,
        reference: &str,
        pointer: &str,
    ) -> Result<&'s str> {
        ref_target(reference)
            .and_then(|name| schemas.get_key_value(name))
            .map(|(name, _)| name.as_str())
            .ok_or_else(|| {
                Box::new(Error::UnresolvedRef {
                    reference: reference.to_string(),
                    pointer: pointer.to_string(),
                })
            })
    }

    fn is_table(&self, name: &str) -> bool {
        self.tables.contains(&name)
    }

    /// Properties and required names, with `allOf` members merged in order.
    fn effective_properties(
        &self,
        schema: &'a Value,
        pointer: &str,
    ) -> Result<(Vec<(&'a String, &'a Value)>, HashSet<&'a str>)> {
        self.composed_properties(schema, pointer, &mut Vec::new())
    }

    /// `composing` holds the `allOf` references currently being expanded.
    fn composed_properties(
        &self,
        schema: &'a Value,
        pointer: &str,
        composing: &mut Vec<&'a str>,
    ) -> Result<(Vec<(&'a String, &'a Value)>, HashSet<&'a str>)> {
        let mut props = Vec::new();
        let mut required = HashSet::new();

        if let Some(parts) = schema.get("allOf").and_then(Value::as_array) {
            for part in parts {
                let (p, r) = match part.get("$ref").and_then(Value::as_str) {
                    Some(r) => {
                        let name = Self::resolve_name(self.schemas, r, pointer)?;
                        if composing.contains(&name) {
                            return Err(Error::openapi(
                                format!("cyclic allOf composition through '{}'", name),
                                pointer,
                            ));
                        }
                        composing.push(name);
                        let merged =
                            self.composed_properties(&self.schemas[name], pointer, composing);
                        composing.pop();
                        merged?
                    }
                    None => self.composed_properties(part, pointer, composing)?,
                };
                props.extend(p);
                required.extend(r);
            }
        }
        if let Some(map) = schema.get("properties").and_then(Value::as_object) {
            props.extend(map.iter());
        }
        if let Some(list) = schema.get("required").and_then(Value::as_array) {
            required.extend(list.iter().filter_map(Value::as_str));
        }

        // Later definitions override earlier ones with the same name.
        let mut seen = HashSet::new();
        let mut deduped: Vec<_> = props
            .into_iter()
            .rev()
            .filter(|(name, _)| seen.insert(name.as_str()))
            .collect();
        deduped.reverse();
        Ok((deduped, required))
    }

    /// Key column type of a table schema: its `id` property, or BIGINT.
    fn key_type(&self, name: &str) -> Result<ColumnType> {
        let pointer = format!("{}/{}", self.base, name);
        let (props, _) = self.effective_properties(&self.schemas[name], &pointer)?;
        Ok(props
            .iter()
            .find(|(prop, _)| prop.as_str() == "id")
            .map(|(_, schema)| types::map_type(schema).0)
            .unwrap_or(ColumnType::BigInt))
    }

    fn build(self, filename: &str) -> Result<ParsedSchema> {
        let mut schema = ParsedSchema::new(filename, SchemaFormat::OpenApi);
        let mut cross_refs = Vec::new();

        for name in &self.tables {
            let table = self.build_table(name, &mut cross_refs)?;
            schema.tables.push(table);
        }

        let mut seen_pairs = BTreeSet::new();
        for cross in cross_refs {
            let owner_table = table_name(&cross.owner);
            let target_table = table_name(&cross.target);
            let self_ref = cross.owner == cross.target;

            let pair = if self_ref {
                (owner_table.clone(), to_snake_case(&cross.property))
            } else if owner_table <= target_table {
                (owner_table.clone(), target_table.clone())
            } else {
                (target_table.clone(), owner_table.clone())
            };
            if !seen_pairs.insert(pair.clone()) {
                continue;
            }

            let junction = self.build_junction(&cross, &pair, self_ref)?;
            if schema.table(&junction.name).is_some() {
                tracing::debug!(table = %junction.name, "junction already declared");
                continue;
            }
            schema.tables.push(junction);
        }

        Ok(schema)
    }

    fn build_table(&self, name: &str, cross_refs: &mut Vec<CrossRef>) -> Result<SqlTable> {
        let pointer = format!("{}/{}", self.base, name);
        let schema = &self.schemas[name];
        let mut table = SqlTable::new(
            table_name(name),
            TableOrigin::OpenApi {
                schema: name.to_string(),
            },
        );
        table.comment = schema
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);

        let (props, required) = self.effective_properties(schema, &pointer)?;
        let mut has_id = false;

        for (prop, prop_schema) in props {
            let prop_pointer = format!("{}/properties/{}", pointer, prop);

            if let Some(reference) = direct_ref(prop_schema) {
                let target = Self::resolve_name(self.schemas, reference, &prop_pointer)?;
                if self.is_table(target) {
                    let column_name = foreign_key_column(prop);
                    let mut column = SqlColumn::new(&column_name, self.key_type(target)?);
                    column.raw_type = format!("$ref {}", target);
                    column.nullable = !required.contains(prop.as_str());
                    column.comment = description(prop_schema);
                    table.columns.push(column);

                    let mut fk = ForeignKey::new(
                        vec![column_name],
                        table_name(target),
                        vec!["id".to_string()],
                    );
                    fk.on_delete = Some(if required.contains(prop.as_str()) {
                        ReferentialAction::Cascade
                    } else {
                        ReferentialAction::SetNull
                    });
                    table.foreign_keys.push(fk);
                } else {
                    // Shared enum or primitive schema: inline its type.
                    let mut column = self.column(prop, &self.schemas[target], &required);
                    column.comment = column.comment.or_else(|| description(prop_schema));
                    table.columns.push(column);
                }
                continue;
            }

            let items_ref = prop_schema
                .get("items")
                .and_then(|items| items.get("$ref"))
                .and_then(Value::as_str);
            if let Some(reference) = items_ref {
                let target = Self::resolve_name(self.schemas, reference, &prop_pointer)?;
                if self.is_table(target) {
                    cross_refs.push(CrossRef {
                        owner: name.to_string(),
                        target: target.to_string(),
                        property: prop.clone(),
                    });
                    continue;
                }
            }

            let mut column = self.column(prop, prop_schema, &required);
            if column.name == "id" {
                has_id = true;
                column.nullable = false;
                if column.ty.is_integer() {
                    column.auto_increment = true;
                }
            }
            table.columns.push(column);
        }

        if has_id {
            table.set_primary_key(vec!["id".to_string()]);
        } else {
            tracing::debug!(schema = %name, "synthesizing id column");
            let mut id = SqlColumn::new("id", ColumnType::BigInt);
            id.auto_increment = true;
            table.columns.insert(0, id);
            table.set_primary_key(vec!["id".to_string()]);
        }
        Ok(table)
    }

    fn column(&self, prop: &str, schema: &Value, required: &HashSet<&str>) -> SqlColumn {
        let (ty, nullable_type) = types::map_type(schema);
        let mut column = SqlColumn::new(to_snake_case(prop), ty);
        column.raw_type = types::describe(schema);
        column.nullable = nullable_type
            || !required.contains(prop)
            || schema.get("nullable").and_then(Value::as_bool) == Some(true);
        column.read_only = schema.get("readOnly").and_then(Value::as_bool) == Some(true);
        column.comment = description(schema);
        column.default = schema.get("default").map(types::default_literal);
        column
    }

    fn build_junction(
        &self,
        cross: &CrossRef,
        pair: &(String, String),
        self_ref: bool,
    ) -> Result<SqlTable> {
        let name = format!("{}_{}", pair.0, pair.1);
        let mut table = SqlTable::new(&name, TableOrigin::Synthesized);

        let owner_key = self.key_type(&cross.owner)?;
        let target_key = self.key_type(&cross.target)?;
        let owner_table = table_name(&cross.owner);
        let target_table = table_name(&cross.target);

        let owner_column = format!("{}_id", singularize(&owner_table));
        let target_column = if self_ref {
            format!("{}_id", singularize(&to_snake_case(&cross.property)))
        } else {
            format!("{}_id", singularize(&target_table))
        };

        // Keep column order aligned with the sorted table name.
        let mut sides = vec![
            (owner_column, owner_key, owner_table),
            (target_column, target_key, target_table),
        ];
        if !self_ref && sides[0].2 > sides[1].2 {
            sides.swap(0, 1);
        }

        for (column_name, ty, ref_table) in sides {
            let mut column = SqlColumn::new(&column_name, ty);
            column.nullable = false;
            table.columns.push(column);
            let mut fk = ForeignKey::new(vec![column_name], ref_table, vec!["id".to_string()]);
            fk.on_delete = Some(ReferentialAction::Cascade);
            table.foreign_keys.push(fk);
        }
        let key = table.columns.iter().map(|c| c.name.clone()).collect();
        table.set_primary_key(key);
        tracing::debug!(table = %name, "synthesized junction table");
        Ok(table)
    }
}

fn is_object_schema(schema: &Value) -> bool {
    let typed_object = schema.get("type").and_then(Value::as_str) == Some("object");
    let has_props = schema.get("properties").is_some();
    let composed = schema.get("allOf").is_some();
    (typed_object || has_props || composed) && schema.get("enum").is_none()
}

fn foreign_key_column(prop: &str) -> String {
    let snake = to_snake_case(prop);
    if snake.ends_with("_id") {
        snake
    } else {
        format!("{}_id", snake)
    }
}

fn description(schema: &Value) -> Option<String> {
    schema
        .get("description")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PETSTORE: &str = r##"
openapi: 3.0.3
info:
  title: Petstore
  version: 1.0.0
components:
  schemas:
    Owner:
      type: object
      required: [name]
      properties:
        id:
          type: integer
          format: int64
          readOnly: true
        name:
          type: string
          maxLength: 120
        email:
          type: string
          format: email
    Pet:
      type: object
      description: A pet for sale
      required: [name, owner]
      properties:
        name:
          type: string
        status:
          $ref: '#/components/schemas/PetStatus'
        birthday:
          type: string
          format: date
        owner:
          $ref: '#/components/schemas/Owner'
        tags:
          type: array
          items:
            $ref: '#/components/schemas/Tag'
    Tag:
      type: object
      properties:
        id:
          type: string
          format: uuid
        label:
          type: string
        pets:
          type: array
          items:
            $ref: '#/components/schemas/Pet'
    PetStatus:
      type: string
      enum: [available, sold]
"##;

    #[test]
    fn test_schemas_become_tables() {
        let schema = parse_openapi(PETSTORE, "petstore.yaml").unwrap();
        let names: Vec<_> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["owners", "pets", "tags", "pets_tags"]);
    }

    #[test]
    fn test_property_types() {
        let schema = parse_openapi(PETSTORE, "petstore.yaml").unwrap();
        let owners = schema.table("owners").unwrap();
        let id = owners.column("id").unwrap();
        assert_eq!(id.ty, ColumnType::BigInt);
        assert!(id.primary_key && id.auto_increment);
        assert_eq!(
            owners.column("name").unwrap().ty,
            ColumnType::Varchar(Some(120))
        );
        assert!(!owners.column("name").unwrap().nullable);
        assert!(owners.column("email").unwrap().nullable);
    }

    #[test]
    fn test_ref_becomes_foreign_key() {
        let schema = parse_openapi(PETSTORE, "petstore.yaml").unwrap();
        let pets = schema.table("pets").unwrap();
        let owner_id = pets.column("owner_id").unwrap();
        assert_eq!(owner_id.ty, ColumnType::BigInt);
        assert!(!owner_id.nullable);
        assert_eq!(pets.foreign_keys[0].ref_table, "owners");
        assert_eq!(pets.comment.as_deref(), Some("A pet for sale"));
    }

    #[test]
    fn test_enum_schema_is_inlined() {
        let schema = parse_openapi(PETSTORE, "petstore.yaml").unwrap();
        let pets = schema.table("pets").unwrap();
        assert_eq!(
            pets.column("status").unwrap().ty,
            ColumnType::Enum(vec!["available".into(), "sold".into()])
        );
        assert!(schema.table("pet_statuses").is_none());
    }

    #[test]
    fn test_missing_id_is_synthesized() {
        let schema = parse_openapi(PETSTORE, "petstore.yaml").unwrap();
        let pets = schema.table("pets").unwrap();
        assert_eq!(pets.columns[0].name, "id");
        assert_eq!(pets.primary_key, vec!["id"]);
        assert!(pets.columns[0].auto_increment);
    }

    #[test]
    fn test_array_refs_synthesize_one_junction() {
        let schema = parse_openapi(PETSTORE, "petstore.yaml").unwrap();
        let junction = schema.table("pets_tags").unwrap();
        assert_eq!(junction.origin, TableOrigin::Synthesized);
        let columns: Vec<_> = junction.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["pet_id", "tag_id"]);
        assert_eq!(junction.columns[1].ty, ColumnType::Uuid);
        assert!(junction.is_junction());
    }

    #[test]
    fn test_json_document_and_all_of() {
        let doc = r##"{
          "swagger": "2.0",
          "definitions": {
            "Audited": {
              "type": "object",
              "properties": {
                "created_at": { "type": "string", "format": "date-time", "readOnly": true }
              }
            },
            "Invoice": {
              "allOf": [
                { "$ref": "#/definitions/Audited" },
                {
                  "type": "object",
                  "required": ["total"],
                  "properties": {
                    "id": { "type": "integer" },
                    "total": { "type": "number", "format": "double" },
                    "paid": { "type": "boolean", "default": false }
                  }
                }
              ]
            }
          }
        }"##;
        let schema = parse_openapi(doc, "api.json").unwrap();
        assert_eq!(schema.tables.len(), 1);
        let invoices = schema.table("invoices").unwrap();
        let columns: Vec<_> = invoices.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["created_at", "id", "total", "paid"]);
        assert!(invoices.column("created_at").unwrap().read_only);
        assert_eq!(invoices.column("id").unwrap().ty, ColumnType::Integer);
        assert_eq!(
            invoices.column("paid").unwrap().default.as_deref(),
            Some("false")
        );
    }

    #[test]
    fn test_self_referencing_array() {
        let doc = r##"
components:
  schemas:
    User:
      type: object
      properties:
        id: { type: integer, format: int64 }
        friends:
          type: array
          items: { $ref: '#/components/schemas/User' }
"##;
        let schema = parse_openapi(doc, "users.yaml").unwrap();
        let junction = schema.table("users_friends").unwrap();
        let columns: Vec<_> = junction.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(columns, vec!["user_id", "friend_id"]);
    }

    #[test]
    fn test_unresolved_ref() {
        let doc = r##"
components:
  schemas:
    Post:
      type: object
      properties:
        author: { $ref: '#/components/schemas/Author' }
"##;
        let err = parse_openapi(doc, "api.yaml").unwrap_err();
        assert!(matches!(*err, Error::UnresolvedRef { .. }));
    }

    #[test]
    fn test_cyclic_all_of_is_an_error() {
        let doc = r##"
components:
  schemas:
    Animal:
      allOf:
        - $ref: '#/components/schemas/Pet'
    Pet:
      allOf:
        - $ref: '#/components/schemas/Animal'
    Owner:
      type: object
      properties:
        id: { type: integer }
        pet: { $ref: '#/components/schemas/Animal' }
"##;
        let err = parse_openapi(doc, "pets.yaml").unwrap_err();
        assert!(matches!(*err, Error::OpenApi { .. }));
        assert!(err.to_string().starts_with("cyclic allOf composition"));
    }

    #[test]
    fn test_missing_components() {
        let err = parse_openapi("openapi: 3.0.0\n", "api.yaml").unwrap_err();
        assert_eq!(
            err.to_string(),
            "document has no 'components.schemas' section"
        );
    }

    #[test]
    fn test_syntax_error_has_location() {
        let err = parse_openapi("{ \"components\": ", "api.json").unwrap_err();
        assert!(matches!(*err, Error::Document { span: Some(_), .. }));
    }
}
