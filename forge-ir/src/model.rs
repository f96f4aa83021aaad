//! Domain model consumed by the generators.
//!
//! Produced by lowering a [`ParsedSchema`](crate::ParsedSchema): junction
//! tables are folded into many-to-many relations and every foreign key is
//! visible from both ends.

use crudforge_core::{to_camel_case, to_kebab_case, to_pascal_case, to_snake_case};
use serde::{Deserialize, Serialize};

use crate::{ColumnType, DatabaseKind};

/// The full model handed to a generator.
#[derive(Debug, Clone, Serialize)]
pub struct DomainModel {
    pub meta: ProjectMeta,
    /// Entities in source order.
    pub entities: Vec<Entity>,
    pub junctions: Vec<JunctionTable>,
}

impl DomainModel {
    /// Look up an entity by type name.
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.iter().find(|e| e.name == name)
    }

    /// The entity used as credential store by generated auth, if any.
    ///
    /// An entity named `User` qualifies when it has an `email` column and a
    /// `password_hash` or `password` column.
    pub fn auth_entity(&self) -> Option<&Entity> {
        let user = self.entity("User")?;
        let has_email = user.field("email").is_some();
        let has_password = user.password_field().is_some();
        (has_email && has_password).then_some(user)
    }
}

/// Project-level metadata.
#[derive(Debug, Clone, Serialize)]
pub struct ProjectMeta {
    /// Project name as configured (`blog-api`).
    pub name: String,
    /// Dotted package namespace (`com.example.blog`), used by JVM targets.
    pub package: String,
    pub version: String,
    pub description: Option<String>,
    pub database: DatabaseKind,
    pub features: Features,
}

impl ProjectMeta {
    /// Name usable as a module/crate identifier (`blog_api`).
    pub fn snake_name(&self) -> String {
        to_snake_case(&self.name)
    }

    pub fn kebab_name(&self) -> String {
        to_kebab_case(&self.name)
    }

    pub fn pascal_name(&self) -> String {
        to_pascal_case(&self.name)
    }
}

/// Optional feature flags that gate which files are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Features {
    /// JWT login/register endpoints and a guard on mutating routes.
    pub auth: bool,
    /// Per-client token bucket middleware.
    pub rate_limit: bool,
    /// Storage adapter plus an upload endpoint.
    pub file_storage: bool,
    /// API tests per entity.
    pub tests: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            auth: false,
            rate_limit: false,
            file_storage: false,
            tests: true,
        }
    }
}

/// A CRUD entity backed by one table.
#[derive(Debug, Clone, Serialize)]
pub struct Entity {
    /// Singular PascalCase type name (`BlogPost`).
    pub name: String,
    /// Table name as declared (`blog_posts`).
    pub table: String,
    /// Plural snake_case collection name (`blog_posts`).
    pub plural: String,
    pub fields: Vec<Field>,
    pub primary_key: Vec<String>,
    pub relations: Vec<Relation>,
    pub description: Option<String>,
}

impl Entity {
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields
            .iter()
            .find(|f| f.name.eq_ignore_ascii_case(name))
    }

    /// First primary key field; lookups by id use it.
    pub fn id_field(&self) -> Option<&Field> {
        self.primary_key.first().and_then(|k| self.field(k))
    }

    /// Fields accepted on create: everything the database does not supply.
    pub fn insertable_fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter().filter(|f| !f.generated)
    }

    /// Fields accepted on update: insertable fields minus the key.
    pub fn updatable_fields(&self) -> impl Iterator<Item = &Field> {
        self.insertable_fields().filter(|f| !f.primary_key)
    }

    pub fn relations_of(&self, kind: RelationKind) -> impl Iterator<Item = &Relation> {
        self.relations.iter().filter(move |r| r.kind == kind)
    }

    pub fn password_field(&self) -> Option<&Field> {
        self.field("password_hash").or_else(|| self.field("password"))
    }

    /// Singular snake_case name (`blog_post`), used for file stems.
    pub fn file_stem(&self) -> String {
        to_snake_case(&self.name)
    }

    pub fn camel_name(&self) -> String {
        to_camel_case(&self.name)
    }

    pub fn kebab_name(&self) -> String {
        to_kebab_case(&self.name)
    }

    pub fn plural_pascal(&self) -> String {
        to_pascal_case(&self.plural)
    }

    /// URL path segment for the collection (`blog-posts`).
    pub fn route(&self) -> String {
        to_kebab_case(&self.plural)
    }
}

/// A column as seen by the application.
#[derive(Debug, Clone, Serialize)]
pub struct Field {
    /// Column name (snake_case as declared).
    pub name: String,
    pub ty: ColumnType,
    pub nullable: bool,
    pub primary_key: bool,
    pub unique: bool,
    /// Supplied by the database (identity, serial, clock or uuid default).
    pub generated: bool,
    pub default: Option<String>,
    pub references: Option<FieldReference>,
    pub description: Option<String>,
}

impl Field {
    pub fn camel_name(&self) -> String {
        to_camel_case(&self.name)
    }

    pub fn pascal_name(&self) -> String {
        to_pascal_case(&self.name)
    }

    /// Whether a create request must supply the value.
    pub fn required_on_create(&self) -> bool {
        !self.nullable && !self.generated && self.default.is_none()
    }
}

/// Target of a foreign key column.
#[derive(Debug, Clone, Serialize)]
pub struct FieldReference {
    pub entity: String,
    pub table: String,
    pub column: String,
}

/// Relation cardinality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    ManyToOne,
    OneToMany,
    ManyToMany,
}

/// A navigable relation from one entity to another.
#[derive(Debug, Clone, Serialize)]
pub struct Relation {
    pub kind: RelationKind,
    /// Accessor name in snake_case (`author`, `comments`, `tags`).
    pub name: String,
    /// Target entity type name.
    pub target: String,
    pub target_table: String,
    /// Column on this entity's table: the FK column for many-to-one,
    /// the key column otherwise.
    pub local_column: String,
    /// Column on the target's table: its key for many-to-one and
    /// many-to-many, the FK column for one-to-many.
    pub remote_column: String,
    pub junction: Option<JunctionRef>,
}

impl Relation {
    pub fn camel_name(&self) -> String {
        to_camel_case(&self.name)
    }

    pub fn pascal_name(&self) -> String {
        to_pascal_case(&self.name)
    }

    pub fn route(&self) -> String {
        to_kebab_case(&self.name)
    }
}

/// How a many-to-many relation traverses its junction.
#[derive(Debug, Clone, Serialize)]
pub struct JunctionRef {
    pub table: String,
    /// Junction column pointing at the owning entity.
    pub local_column: String,
    /// Junction column pointing at the target entity.
    pub remote_column: String,
}

/// A detected (or synthesized) many-to-many link table.
#[derive(Debug, Clone, Serialize)]
pub struct JunctionTable {
    pub table: String,
    pub left: JunctionSide,
    pub right: JunctionSide,
    /// Created from OpenAPI cross-references rather than declared.
    pub synthesized: bool,
}

/// One end of a junction.
#[derive(Debug, Clone, Serialize)]
pub struct JunctionSide {
    pub column: String,
    pub column_type: ColumnType,
    pub entity: String,
    pub table: String,
    pub ref_column: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, ty: ColumnType) -> Field {
        Field {
            name: name.to_string(),
            ty,
            nullable: false,
            primary_key: false,
            unique: false,
            generated: false,
            default: None,
            references: None,
            description: None,
        }
    }

    fn user() -> Entity {
        let mut id = field("id", ColumnType::BigInt);
        id.primary_key = true;
        id.generated = true;
        Entity {
            name: "User".into(),
            table: "users".into(),
            plural: "users".into(),
            fields: vec![
                id,
                field("email", ColumnType::Varchar(Some(255))),
                field("password_hash", ColumnType::Text),
            ],
            primary_key: vec!["id".into()],
            relations: vec![],
            description: None,
        }
    }

    #[test]
    fn test_insertable_and_updatable_fields() {
        let entity = user();
        let insertable: Vec<_> = entity.insertable_fields().map(|f| f.name.as_str()).collect();
        assert_eq!(insertable, vec!["email", "password_hash"]);
        assert_eq!(entity.updatable_fields().count(), 2);
        assert_eq!(entity.id_field().unwrap().name, "id");
    }

    #[test]
    fn test_names() {
        let mut entity = user();
        entity.name = "BlogPost".into();
        entity.plural = "blog_posts".into();
        assert_eq!(entity.file_stem(), "blog_post");
        assert_eq!(entity.camel_name(), "blogPost");
        assert_eq!(entity.route(), "blog-posts");
        assert_eq!(entity.plural_pascal(), "BlogPosts");
    }

    #[test]
    fn test_auth_entity_requires_credentials() {
        let meta = ProjectMeta {
            name: "blog".into(),
            package: "com.example.blog".into(),
            version: "0.1.0".into(),
            description: None,
            database: DatabaseKind::Postgres,
            features: Features::default(),
        };
        let mut model = DomainModel {
            meta,
            entities: vec![user()],
            junctions: vec![],
        };
        assert!(model.auth_entity().is_some());

        model.entities[0].fields.retain(|f| f.name != "password_hash");
        assert!(model.auth_entity().is_none());
    }

    #[test]
    fn test_features_default_enables_tests_only() {
        let features = Features::default();
        assert!(features.tests);
        assert!(!features.auth && !features.rate_limit && !features.file_storage);
    }

    #[test]
    fn test_required_on_create() {
        let mut f = field("title", ColumnType::Text);
        assert!(f.required_on_create());
        f.default = Some("'untitled'".into());
        assert!(!f.required_on_create());
    }
}
