//! Naming and lookup helpers shared by the generated files.

use crudforge_codegen::{ComputedData, SqlDialect, TYPESCRIPT_NAMING, TypeMapper};
use crudforge_ir::{ColumnType, DomainModel, Entity, Features, Field, Relation, RelationKind};

use crate::type_mapper::TypeScriptTypeMapper;

/// Everything a file generator needs to know about the project.
#[derive(Debug, Clone, Copy)]
pub struct TsProject<'a> {
    pub model: &'a DomainModel,
    pub computed: &'a ComputedData,
    pub dialect: SqlDialect,
    pub types: TypeScriptTypeMapper,
}

impl<'a> TsProject<'a> {
    pub fn new(model: &'a DomainModel, computed: &'a ComputedData) -> Self {
        Self {
            model,
            computed,
            dialect: SqlDialect::new(model.meta.database),
            types: TypeScriptTypeMapper,
        }
    }

    pub fn features(&self) -> Features {
        self.model.meta.features
    }

    /// Entities that have a key to address rows by.
    pub fn entities(&self) -> impl Iterator<Item = (&'a Entity, &'a Field)> {
        self.model
            .entities
            .iter()
            .filter_map(|e| e.id_field().map(|key| (e, key)))
    }

    pub fn target(&self, relation: &Relation) -> Option<&'a Entity> {
        self.model.entity(&relation.target)
    }

    /// Property name of a column.
    pub fn prop(&self, field: &Field) -> String {
        TYPESCRIPT_NAMING.field_name(&field.name)
    }

    /// Property of `entity` backed by `column`, falling back to the
    /// camel-cased column name.
    pub fn prop_of(&self, entity: &Entity, column: &str) -> String {
        entity
            .field(column)
            .map(|f| self.prop(f))
            .unwrap_or_else(|| TYPESCRIPT_NAMING.field_name(column))
    }

    pub fn field_type(&self, field: &Field) -> String {
        self.types.map_field(field)
    }

    /// Whether the column holds a password hash that must never be returned.
    pub fn is_secret(&self, entity: &Entity, field: &Field) -> bool {
        entity
            .password_field()
            .is_some_and(|p| p.name == field.name)
    }

    /// Password column the service hashes before storing, when auth is on.
    pub fn hashed_field(&self, entity: &'a Entity) -> Option<&'a Field> {
        if !self.features().auth {
            return None;
        }
        let auth = self.model.auth_entity()?;
        if auth.name != entity.name {
            return None;
        }
        entity.password_field()
    }

    /// Directory of an entity's files under `src/`.
    pub fn dir(&self, entity: &Entity) -> String {
        entity.kebab_name()
    }

    /// Import path of another entity's file from inside an entity directory.
    pub fn sibling_import(&self, entity: &Entity, suffix: &str) -> String {
        format!("../{0}/{0}.{1}", self.dir(entity), suffix)
    }

    /// Route parameter type of a key column.
    pub fn key_type(&self, entity: &Entity, column: &str) -> &'static str {
        match entity.field(column).map(|f| &f.ty) {
            Some(ty) if ty.is_numeric() => "number",
            Some(_) => "string",
            None => "number",
        }
    }

    /// Pipe parsing a route parameter of this column.
    pub fn key_pipe(&self, entity: &Entity, column: &str) -> Option<&'static str> {
        match entity.field(column).map(|f| &f.ty) {
            Some(ty) if ty.is_integer() => Some("ParseIntPipe"),
            Some(ColumnType::Uuid) => Some("ParseUUIDPipe"),
            Some(_) => None,
            None => Some("ParseIntPipe"),
        }
    }

    /// The relation on the other side of `relation`, declared on its target.
    pub fn inverse(&self, entity: &Entity, relation: &Relation) -> Option<&'a Relation> {
        let target = self.target(relation)?;
        target.relations.iter().find(|other| {
            other.target == entity.name
                && match relation.kind {
                    RelationKind::ManyToOne => {
                        other.kind == RelationKind::OneToMany
                            && other.remote_column == relation.local_column
                    }
                    RelationKind::OneToMany => {
                        other.kind == RelationKind::ManyToOne
                            && other.local_column == relation.remote_column
                    }
                    RelationKind::ManyToMany => match (&relation.junction, &other.junction) {
                        (Some(ours), Some(theirs)) => {
                            other.kind == RelationKind::ManyToMany
                                && ours.table == theirs.table
                                && ours.local_column == theirs.remote_column
                        }
                        _ => false,
                    },
                }
        })
    }

    /// Whether this side of a many-to-many declares the `@JoinTable`.
    ///
    /// The left column of the junction table owns the relation.
    pub fn owns_junction(&self, relation: &Relation) -> bool {
        let Some(junction) = &relation.junction else {
            return false;
        };
        self.model
            .junctions
            .iter()
            .find(|j| j.table == junction.table)
            .is_some_and(|j| j.left.column == junction.local_column)
    }

    /// Relations TypeORM can traverse from this side.
    ///
    /// One-to-many and the inverse side of many-to-many need the relation
    /// declared on the target too.
    pub fn navigable(&self, entity: &Entity, relation: &Relation) -> Option<&'a Entity> {
        let target = self.target(relation)?;
        let needs_inverse = match relation.kind {
            RelationKind::ManyToOne => false,
            RelationKind::OneToMany => true,
            RelationKind::ManyToMany => !self.owns_junction(relation),
        };
        if needs_inverse && self.inverse(entity, relation).is_none() {
            return None;
        }
        Some(target)
    }

    /// Find-options `where` matching the key against `value`.
    pub fn key_where(&self, key: &Field, value: &str) -> String {
        let prop = self.prop(key);
        if prop == value {
            format!("{{ {} }}", prop)
        } else {
            format!("{{ {}: {} }}", prop, value)
        }
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, compile_sql};
    use crudforge_schema::Target;

    use super::*;

    fn blog() -> (DomainModel, ComputedData) {
        let ctx = compile_sql(BLOG_SQL, Target::TypescriptNestjs).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        (model, computed)
    }

    #[test]
    fn test_inverse_relations() {
        let (model, computed) = blog();
        let project = TsProject::new(&model, &computed);
        let post = model.entity("Post").unwrap();
        let user = model.entity("User").unwrap();

        let author = post.relations.iter().find(|r| r.name == "author").unwrap();
        let posts = project.inverse(post, author).unwrap();
        assert_eq!(posts.target, "Post");
        assert_eq!(project.inverse(user, posts).unwrap().name, "author");

        let tags = post.relations.iter().find(|r| r.name == "tags").unwrap();
        assert_eq!(project.inverse(post, tags).unwrap().name, "posts");
        assert!(project.owns_junction(tags));
    }

    #[test]
    fn test_props_and_keys() {
        let (model, computed) = blog();
        let project = TsProject::new(&model, &computed);
        let post = model.entity("Post").unwrap();
        assert_eq!(project.prop(post.field("author_id").unwrap()), "authorId");
        assert_eq!(project.key_type(post, "id"), "number");
        assert_eq!(project.key_pipe(post, "id"), Some("ParseIntPipe"));
        assert_eq!(project.sibling_import(post, "entity"), "../post/post.entity");
        assert_eq!(project.key_where(post.id_field().unwrap(), "id"), "{ id }");
        assert_eq!(project.key_where(post.id_field().unwrap(), "saved.id"), "{ id: saved.id }");
    }

    #[test]
    fn test_secret_field() {
        let (model, computed) = blog();
        let project = TsProject::new(&model, &computed);
        let user = model.entity("User").unwrap();
        assert!(project.is_secret(user, user.field("password_hash").unwrap()));
        assert!(!project.is_secret(user, user.field("email").unwrap()));
        // auth is off in the default features
        assert!(project.hashed_field(user).is_none());
    }
}
