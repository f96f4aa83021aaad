//! Naming and SQL helpers shared by the generated files.

use crudforge_codegen::{ComputedData, CrudSql, RUST_NAMING, SqlDialect, TypeMapper};
use crudforge_ir::{ColumnType, DomainModel, Entity, Features, Field, Relation};

use crate::type_mapper::RustTypeMapper;

/// Everything a file generator needs to know about the project.
#[derive(Debug, Clone, Copy)]
pub struct RustProject<'a> {
    pub model: &'a DomainModel,
    pub computed: &'a ComputedData,
    pub dialect: SqlDialect,
    pub types: RustTypeMapper,
}

impl<'a> RustProject<'a> {
    pub fn new(model: &'a DomainModel, computed: &'a ComputedData) -> Self {
        Self {
            model,
            computed,
            dialect: SqlDialect::new(model.meta.database),
            types: RustTypeMapper,
        }
    }

    pub fn features(&self) -> Features {
        self.model.meta.features
    }

    /// Library crate name as written in `use` paths.
    pub fn crate_name(&self) -> String {
        self.model.meta.snake_name()
    }

    /// Entities that have a key to address rows by.
    pub fn entities(&self) -> impl Iterator<Item = (&'a Entity, &'a Field)> {
        self.model
            .entities
            .iter()
            .filter_map(|e| e.id_field().map(|key| (e, key)))
    }

    pub fn field_name(&self, field: &Field) -> String {
        RUST_NAMING.field_name(&field.name)
    }

    /// Attribute mapping an escaped field back to its column, if needed.
    pub fn rename_attr(&self, field: &Field) -> Option<String> {
        RUST_NAMING
            .field_is_reserved(&field.name)
            .then(|| format!("sqlx(rename = \"{}\")", field.name))
    }

    pub fn field_type(&self, field: &Field) -> String {
        self.types.map_field(field)
    }

    /// `.bind(...)` argument for `field` read from `owner`.
    pub fn bind_arg(&self, owner: &str, field: &Field) -> String {
        let access = format!("{}.{}", owner, self.field_name(field));
        if self.types.is_copy(&field.ty) {
            access
        } else {
            format!("&{}", access)
        }
    }

    /// Argument passing the key `id` along while keeping it usable afterwards.
    pub fn key_arg(&self, key: &Field) -> &'static str {
        if self.types.is_copy(&key.ty) {
            "id"
        } else {
            "id.clone()"
        }
    }

    /// Expression generating a key of this type in Rust, for keys the
    /// database cannot hand back after an insert.
    pub fn client_key_expr(&self, key: &Field) -> Option<&'static str> {
        match key.ty {
            ColumnType::Uuid => Some("uuid::Uuid::new_v4()"),
            ColumnType::Char(_) | ColumnType::Varchar(_) | ColumnType::Text => {
                Some("uuid::Uuid::new_v4().to_string()")
            }
            _ => None,
        }
    }

    pub fn needs_uuid_crate(&self) -> bool {
        self.computed.uses_uuid
            || self.entities().any(|(entity, key)| {
                CrudSql::new(self.dialect, entity, key).client_key()
                    && self.client_key_expr(key).is_some()
            })
    }

    pub fn target(&self, relation: &Relation) -> Option<&'a Entity> {
        self.model.entity(&relation.target)
    }

    /// Rust type of a target entity column, falling back to `i64`.
    pub fn column_type(&self, entity: &Entity, column: &str) -> String {
        entity
            .field(column)
            .map(|f| self.types.map_type(&f.ty))
            .unwrap_or_else(|| "i64".to_string())
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, compile_sql};
    use crudforge_schema::Target;

    use super::*;

    fn blog() -> (DomainModel, ComputedData) {
        let ctx = compile_sql(BLOG_SQL, Target::RustAxum).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        (model, computed)
    }

    #[test]
    fn test_bind_arg_borrows_non_copy() {
        let (model, computed) = blog();
        let project = RustProject::new(&model, &computed);
        let post = model.entity("Post").unwrap();
        assert_eq!(project.bind_arg("input", post.field("title").unwrap()), "&input.title");
        assert_eq!(project.bind_arg("input", post.field("author_id").unwrap()), "input.author_id");
    }
}
