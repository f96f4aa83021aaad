//! Naming, package and lookup helpers shared by the generated files.

use std::path::{Path, PathBuf};

use crudforge_codegen::{ComputedData, ImportCollector, JAVA_NAMING, SqlDialect, TypeMapper};
use crudforge_core::{singularize, to_pascal_case};
use crudforge_ir::{
    ColumnType, DatabaseKind, DomainModel, Entity, Features, Field, Relation, RelationKind,
};

use crate::{java_file::add_class, type_mapper::JavaTypeMapper};

/// Everything a file generator needs to know about the project.
#[derive(Debug, Clone, Copy)]
pub struct JavaProject<'a> {
    pub model: &'a DomainModel,
    pub computed: &'a ComputedData,
    pub dialect: SqlDialect,
    pub types: JavaTypeMapper,
}

impl<'a> JavaProject<'a> {
    pub fn new(model: &'a DomainModel, computed: &'a ComputedData) -> Self {
        Self {
            model,
            computed,
            dialect: SqlDialect::new(model.meta.database),
            types: JavaTypeMapper,
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

    /// The related entity, when it is mapped with an `@Id`.
    pub fn target(&self, relation: &Relation) -> Option<&'a Entity> {
        self.model
            .entity(&relation.target)
            .filter(|e| e.id_field().is_some())
    }

    /// Root package of the application (`com.example.blog`).
    pub fn base_package(&self) -> &'a str {
        &self.model.meta.package
    }

    /// Package below the root (`com.example.blog.common`).
    pub fn package(&self, name: &str) -> String {
        format!("{}.{}", self.base_package(), name)
    }

    /// Package holding everything about one entity.
    pub fn entity_package(&self, entity: &Entity) -> String {
        self.package(&JAVA_NAMING.safe_name(&entity.file_stem().replace('_', "")))
    }

    /// Fully qualified name of a class in an entity's package.
    pub fn entity_class(&self, entity: &Entity, suffix: &str) -> String {
        format!("{}.{}{}", self.entity_package(entity), entity.name, suffix)
    }

    /// `src/main/java/<package path>/<Class>.java`
    pub fn source_path(&self, base: &Path, package: &str, class: &str) -> PathBuf {
        java_path(base.join("src").join("main").join("java"), package, class)
    }

    /// `src/test/java/<package path>/<Class>.java`
    pub fn test_path(&self, base: &Path, package: &str, class: &str) -> PathBuf {
        java_path(base.join("src").join("test").join("java"), package, class)
    }

    /// Application class name (`BlogApplication`).
    pub fn application_class(&self) -> String {
        format!("{}Application", self.model.meta.pascal_name())
    }

    /// JDBC URL of a local database, with credentials in the query string.
    pub fn jdbc_url(&self, database: &str) -> String {
        match self.model.meta.database {
            DatabaseKind::Postgres => format!(
                "jdbc:postgresql://localhost:5432/{database}?user=postgres&password=postgres"
            ),
            DatabaseKind::Mysql => {
                format!("jdbc:mysql://localhost:3306/{database}?user=root&password=root")
            }
            DatabaseKind::Sqlite => format!("jdbc:sqlite:{database}.db"),
        }
    }

    /// Field name of a column.
    pub fn prop(&self, field: &Field) -> String {
        JAVA_NAMING.field_name(&field.name)
    }

    pub fn prop_of(&self, entity: &Entity, column: &str) -> String {
        entity
            .field(column)
            .map(|f| self.prop(f))
            .unwrap_or_else(|| JAVA_NAMING.field_name(column))
    }

    /// Field name of a relation's association (`author`, `tags`).
    pub fn relation_prop(&self, relation: &Relation) -> String {
        JAVA_NAMING.field_name(&relation.name)
    }

    /// Getter/setter stem of a field (`createdAt` -> `CreatedAt`).
    pub fn accessor(&self, field: &Field) -> String {
        upper_first(&self.prop(field))
    }

    pub fn field_type(&self, field: &Field) -> String {
        self.types.map_field(field)
    }

    /// Java type of the column addressed by a route parameter.
    pub fn key_type(&self, entity: &Entity, column: &str) -> String {
        entity
            .field(column)
            .map(|f| self.types.map_type(&f.ty))
            .unwrap_or_else(|| "Long".into())
    }

    /// Import whatever a field's type needs.
    pub fn use_type(&self, imports: &mut ImportCollector, ty: &ColumnType) {
        if let Some(fqcn) = self.types.import_for(ty) {
            add_class(imports, fqcn);
        }
    }

    /// Column name inside a JPA annotation, backtick-quoted when the
    /// database reserves it.
    pub fn column_name(&self, name: &str) -> String {
        if self.dialect.ident(name) == name {
            name.to_string()
        } else {
            format!("`{name}`")
        }
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

    /// Target of a relation that gets a route and a repository query.
    /// Many-to-many needs its junction.
    pub fn navigable(&self, relation: &Relation) -> Option<&'a Entity> {
        if relation.kind == RelationKind::ManyToMany && relation.junction.is_none() {
            return None;
        }
        self.target(relation)
    }

    /// Path variable naming the other side of a link (`tags` -> `tagId`).
    pub fn related_param(&self, relation: &Relation) -> String {
        format!("{}Id", JAVA_NAMING.field_name(&singularize(&relation.name)))
    }
}

/// Repository method names of a relation: lookup, link and unlink.
pub fn relation_methods(relation: &Relation) -> [String; 3] {
    let one = to_pascal_case(&singularize(&relation.name));
    [
        format!("find{}", relation.pascal_name()),
        format!("add{one}"),
        format!("remove{one}"),
    ]
}

pub fn upper_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn java_path(root: PathBuf, package: &str, class: &str) -> PathBuf {
    package
        .split('.')
        .fold(root, |path, part| path.join(part))
        .join(format!("{class}.java"))
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, compile_sql};
    use crudforge_schema::Target;

    use super::*;

    fn blog() -> (DomainModel, ComputedData) {
        let ctx = compile_sql(BLOG_SQL, Target::JavaSpring).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        (model, computed)
    }

    #[test]
    fn test_packages_and_paths() {
        let (model, computed) = blog();
        let project = JavaProject::new(&model, &computed);
        let post = model.entity("Post").unwrap();

        assert_eq!(project.base_package(), "com.example.blog");
        assert_eq!(project.entity_package(post), "com.example.blog.post");
        assert_eq!(project.entity_class(post, "Mapper"), "com.example.blog.post.PostMapper");
        assert_eq!(project.application_class(), "BlogApplication");
        assert_eq!(
            project.source_path(Path::new(""), "com.example.blog.post", "Post"),
            Path::new("src/main/java/com/example/blog/post/Post.java")
        );
    }

    #[test]
    fn test_fields_and_relations() {
        let (model, computed) = blog();
        let project = JavaProject::new(&model, &computed);
        let post = model.entity("Post").unwrap();
        let created = post.field("created_at").unwrap();

        assert_eq!(project.prop(created), "createdAt");
        assert_eq!(project.accessor(created), "CreatedAt");
        assert_eq!(project.key_type(post, "id"), "Long");

        let tags = post.relations.iter().find(|r| r.name == "tags").unwrap();
        assert!(project.owns_junction(tags));
        assert_eq!(project.inverse(post, tags).unwrap().name, "posts");
        assert_eq!(project.related_param(tags), "tagId");
        assert_eq!(relation_methods(tags), ["findTags", "addTag", "removeTag"]);
    }

    #[test]
    fn test_reserved_names() {
        let ctx = compile_sql(
            "CREATE TABLE flags (id SERIAL PRIMARY KEY, \"default\" TEXT NOT NULL, \"order\" INT);",
            Target::JavaSpring,
        )
        .unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = JavaProject::new(&model, &computed);
        let flag = model.entity("Flag").unwrap();

        assert_eq!(project.prop(flag.field("default").unwrap()), "default_");
        assert_eq!(project.accessor(flag.field("default").unwrap()), "Default_");
        assert_eq!(project.column_name("order"), "`order`");
        assert_eq!(project.column_name("title"), "title");
    }
}
