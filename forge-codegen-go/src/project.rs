//! Naming and lookup helpers shared by the generated files.

use crudforge_codegen::{ComputedData, CrudSql, GO_NAMING, SqlDialect, TypeMapper};
use crudforge_core::{singularize, to_pascal_case};
use crudforge_ir::{ColumnType, DomainModel, Entity, Features, Field, Relation, RelationKind};
use crudforge_schema::Target;

use crate::type_mapper::GoTypeMapper;

/// HTTP router the handlers are written against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Gin,
    Chi,
}

impl Flavor {
    pub fn from_target(target: Target) -> Option<Self> {
        match target {
            Target::GoGin => Some(Flavor::Gin),
            Target::GoChi => Some(Flavor::Chi),
            _ => None,
        }
    }

    pub fn target(&self) -> Target {
        match self {
            Flavor::Gin => Target::GoGin,
            Flavor::Chi => Target::GoChi,
        }
    }

    /// Module path and version of the router package.
    pub fn requirement(&self) -> (&'static str, &'static str) {
        match self {
            Flavor::Gin => ("github.com/gin-gonic/gin", "v1.10.0"),
            Flavor::Chi => ("github.com/go-chi/chi/v5", "v5.1.0"),
        }
    }
}

const INITIALISMS: &[&str] = &[
    "api", "html", "http", "id", "ip", "json", "sql", "uri", "url", "uuid", "xml",
];

/// Exported Go identifier for a column, with Go initialisms
/// (`author_id` -> `AuthorID`, `avatar_url` -> `AvatarURL`).
pub fn go_name(column: &str) -> String {
    let snake = crudforge_core::to_snake_case(column);
    let name: String = snake
        .split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            if INITIALISMS.contains(&part) {
                part.to_ascii_uppercase()
            } else {
                to_pascal_case(part)
            }
        })
        .collect();
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        format!("F{}", name)
    } else {
        name
    }
}

/// Everything a file generator needs to know about the project.
#[derive(Debug, Clone, Copy)]
pub struct GoProject<'a> {
    pub model: &'a DomainModel,
    pub computed: &'a ComputedData,
    pub dialect: SqlDialect,
    pub types: GoTypeMapper,
    pub flavor: Flavor,
}

impl<'a> GoProject<'a> {
    pub fn new(model: &'a DomainModel, computed: &'a ComputedData, flavor: Flavor) -> Self {
        Self {
            model,
            computed,
            dialect: SqlDialect::new(model.meta.database),
            types: GoTypeMapper,
            flavor,
        }
    }

    pub fn features(&self) -> Features {
        self.model.meta.features
    }

    /// Module path declared in go.mod.
    pub fn module(&self) -> String {
        self.model.meta.kebab_name()
    }

    /// Import path of a package under `internal/`.
    pub fn internal(&self, package: &str) -> String {
        format!("{}/internal/{}", self.module(), package)
    }

    /// Entities that have a key to address rows by.
    pub fn entities(&self) -> impl Iterator<Item = (&'a Entity, &'a Field)> {
        self.model
            .entities
            .iter()
            .filter_map(|e| e.id_field().map(|key| (e, key)))
    }

    /// The related entity, when it has a repository of its own.
    pub fn target(&self, relation: &Relation) -> Option<&'a Entity> {
        self.model
            .entity(&relation.target)
            .filter(|e| e.id_field().is_some())
    }

    /// Target of a relation that gets a route. Many-to-many needs its junction.
    pub fn navigable(&self, relation: &Relation) -> Option<&'a Entity> {
        if relation.kind == RelationKind::ManyToMany && relation.junction.is_none() {
            return None;
        }
        self.target(relation)
    }

    pub fn field_name(&self, field: &Field) -> String {
        go_name(&field.name)
    }

    pub fn field_type(&self, field: &Field) -> String {
        self.types.map_field(field)
    }

    /// Unexported local variable for an entity (`post`, `blogPost`).
    pub fn var(&self, entity: &Entity) -> String {
        GO_NAMING.field_name(&entity.name)
    }

    /// Go type of the column addressed by a route parameter.
    pub fn key_type(&self, entity: &Entity, column: &str) -> String {
        entity
            .field(column)
            .map(|f| self.types.map_type(&f.ty))
            .unwrap_or_else(|| "int64".into())
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

    pub fn sql(&self, entity: &'a Entity, key: &'a Field) -> CrudSql<'a> {
        CrudSql::new(self.dialect, entity, key)
    }

    /// Whether any generated file imports github.com/google/uuid.
    pub fn needs_uuid(&self) -> bool {
        self.entities()
            .any(|(e, key)| key.ty == ColumnType::Uuid || self.sql(e, key).client_key())
    }
}

/// Repository method names of a relation: lookup, link and unlink.
pub fn relation_methods(relation: &Relation) -> [String; 3] {
    let singular = to_pascal_case(&singularize(&relation.name));
    [
        relation.pascal_name(),
        format!("Add{}", singular),
        format!("Remove{}", singular),
    ]
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, compile_sql};

    use super::*;

    #[test]
    fn test_go_names() {
        assert_eq!(go_name("id"), "ID");
        assert_eq!(go_name("author_id"), "AuthorID");
        assert_eq!(go_name("avatar_url"), "AvatarURL");
        assert_eq!(go_name("display_name"), "DisplayName");
    }

    #[test]
    fn test_flavor_from_target() {
        assert_eq!(Flavor::from_target(Target::GoChi), Some(Flavor::Chi));
        assert_eq!(Flavor::from_target(Target::RustAxum), None);
        assert_eq!(Flavor::Gin.target(), Target::GoGin);
    }

    #[test]
    fn test_project_lookups() {
        let ctx = compile_sql(BLOG_SQL, Target::GoGin).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Gin);
        let post = model.entity("Post").unwrap();

        assert_eq!(project.module(), "blog");
        assert_eq!(project.internal("models"), "blog/internal/models");
        assert_eq!(project.key_type(post, "id"), "int64");
        assert_eq!(project.field_type(post.field("created_at").unwrap()), "time.Time");
        assert!(!project.needs_uuid());

        let tags = post.relations.iter().find(|r| r.name == "tags").unwrap();
        assert_eq!(relation_methods(tags), ["Tags", "AddTag", "RemoveTag"]);
    }

    #[test]
    fn test_uuid_keys_need_uuid_package() {
        let ctx = compile_sql(PRODUCT_SQL, Target::GoChi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Chi);
        assert!(project.needs_uuid());
    }
}
