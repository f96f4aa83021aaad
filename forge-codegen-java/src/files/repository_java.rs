use std::path::{Path, PathBuf};

use crudforge_codegen::{CodeBuilder, CredentialStore};
use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{Entity, Field, Relation, RelationKind};

use crate::{
    java_file::{JavaFile, add_class, quote},
    project::{JavaProject, relation_methods},
};

/// `<entity>/<Entity>Repository.java`: Spring Data repository with a query
/// per navigable relation.
pub struct RepositoryJava<'a> {
    project: JavaProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> RepositoryJava<'a> {
    pub fn new(project: JavaProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    pub fn class_name(entity: &Entity) -> String {
        format!("{}Repository", entity.name)
    }

    /// JPQL expression for this entity's `column` of the row `:id`.
    fn own_value(&self, column: &str) -> String {
        if column == self.key.name {
            ":id".to_string()
        } else {
            format!(
                "(select o.{} from {} o where o.{} = :id)",
                self.project.prop_of(self.entity, column),
                self.entity.name,
                self.project.prop(self.key)
            )
        }
    }

    /// Native SQL for the same value.
    fn own_sql(&self, column: &str) -> String {
        if column == self.key.name {
            ":id".to_string()
        } else {
            let d = self.project.dialect;
            format!(
                "(SELECT {} FROM {} WHERE {} = :id)",
                d.ident(column),
                d.ident(&self.entity.table),
                d.ident(&self.key.name)
            )
        }
    }

    fn lookup(&self, relation: &Relation, target: &Entity, key_type: &str, method: &str) -> String {
        let p = self.project;
        let t = &target.name;
        let order = target
            .id_field()
            .map(|k| p.prop(k))
            .unwrap_or_else(|| p.prop_of(target, &relation.remote_column));
        let (query, result) = match relation.kind {
            RelationKind::ManyToOne => (
                format!(
                    "select e.{} from {} e where e.{} = :id",
                    p.relation_prop(relation),
                    self.entity.name,
                    p.prop(self.key)
                ),
                format!("Optional<{t}>"),
            ),
            RelationKind::OneToMany => (
                format!(
                    "select t from {t} t where t.{} = {} order by t.{order}",
                    p.prop_of(target, &relation.remote_column),
                    self.own_value(&relation.local_column)
                ),
                format!("List<{t}>"),
            ),
            RelationKind::ManyToMany => (
                format!(
                    "select t from {} e join e.{} t where e.{} = :id order by t.{order}",
                    self.entity.name,
                    p.relation_prop(relation),
                    p.prop(self.key)
                ),
                format!("List<{t}>"),
            ),
        };
        format!(
            "@Query({})\n{result} {method}(@Param(\"id\") {key_type} id);",
            quote(&query)
        )
    }

    fn links(
        &self,
        relation: &Relation,
        target: &Entity,
        key_type: &str,
        [add, remove]: [&str; 2],
    ) -> Option<String> {
        let junction = relation.junction.as_ref()?;
        let d = self.project.dialect;
        let other = self.project.related_param(relation);
        let other_type = self.project.key_type(target, &relation.remote_column);
        let table = d.ident(&junction.table);
        let local = d.ident(&junction.local_column);
        let remote = d.ident(&junction.remote_column);
        let own = self.own_sql(&relation.local_column);
        let params = format!(
            "@Param(\"id\") {key_type} id, @Param(\"{other}\") {other_type} {other}"
        );
        let insert = format!("INSERT INTO {table} ({local}, {remote}) VALUES ({own}, :{other})");
        let delete = format!("DELETE FROM {table} WHERE {local} = {own} AND {remote} = :{other}");
        Some(format!(
            "@Modifying\n@Transactional\n@Query(value = {}, nativeQuery = true)\nvoid {add}({params});\n\n@Modifying\n@Transactional\n@Query(value = {}, nativeQuery = true)\nint {remove}({params});",
            quote(&insert),
            quote(&delete)
        ))
    }

    fn credential_lookup(&self) -> Option<String> {
        if !self.project.features().auth {
            return None;
        }
        let store = CredentialStore::resolve(self.project.model);
        let entity = store.entity.filter(|e| e.name == self.entity.name)?;
        let email = self.project.prop_of(entity, &store.email_column);
        Some(format!(
            "@Query(\"select e from {} e where e.{email} = :email\")\nOptional<{}> findByEmail(@Param(\"email\") String email);",
            entity.name, entity.name
        ))
    }
}

impl GeneratedFile for RepositoryJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project.source_path(
            base,
            &self.project.entity_package(self.entity),
            &Self::class_name(self.entity),
        )
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let p = self.project;
        let key_type = p.key_type(entity, &self.key.name);
        let mut file = JavaFile::new(p.entity_package(entity))
            .import("org.springframework.data.jpa.repository.JpaRepository");
        p.use_type(file.imports_mut(), &self.key.ty);

        let mut methods = Vec::new();
        for relation in &entity.relations {
            let Some(target) = p.navigable(relation) else {
                continue;
            };
            if target.name != entity.name {
                add_class(file.imports_mut(), &p.entity_class(target, ""));
            }
            let imports = file.imports_mut();
            add_class(imports, "org.springframework.data.jpa.repository.Query");
            add_class(imports, "org.springframework.data.repository.query.Param");
            add_class(
                imports,
                if relation.kind == RelationKind::ManyToOne {
                    "java.util.Optional"
                } else {
                    "java.util.List"
                },
            );

            let [lookup, add, remove] = relation_methods(relation);
            methods.push(self.lookup(relation, target, &key_type, &lookup));
            if relation.kind == RelationKind::ManyToMany {
                if let Some(target_key) = target.field(&relation.remote_column) {
                    p.use_type(file.imports_mut(), &target_key.ty);
                }
                if let Some(links) = self.links(relation, target, &key_type, [add.as_str(), remove.as_str()]) {
                    let imports = file.imports_mut();
                    add_class(imports, "org.springframework.data.jpa.repository.Modifying");
                    add_class(imports, "org.springframework.transaction.annotation.Transactional");
                    methods.push(links);
                }
            }
        }
        if let Some(lookup) = self.credential_lookup() {
            let imports = file.imports_mut();
            add_class(imports, "java.util.Optional");
            add_class(imports, "org.springframework.data.jpa.repository.Query");
            add_class(imports, "org.springframework.data.repository.query.Param");
            methods.push(lookup);
        }

        let header = format!(
            "public interface {} extends JpaRepository<{}, {key_type}> {{",
            Self::class_name(entity),
            entity.name
        );
        let body = CodeBuilder::java()
            .block_with_close(&header, "}", |b| {
                methods
                    .iter()
                    .fold(b, |b, method| b.blank().lines(method))
            })
            .build();
        file.raw(body).render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, all_features, compile_sql, compile_sql_with};
    use crudforge_ir::Features;
    use crudforge_schema::Target;

    use super::*;

    fn render(name: &str, features: Features) -> String {
        let ctx = compile_sql_with(BLOG_SQL, Target::JavaSpring, features).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let entity = model.entity(name).unwrap();
        RepositoryJava::new(JavaProject::new(&model, &computed), entity, entity.id_field().unwrap())
            .render()
    }

    #[test]
    fn test_relation_queries() {
        let out = render("Post", Features::default());
        assert!(out.contains("public interface PostRepository extends JpaRepository<Post, Long> {\n"));
        assert!(out.contains(
            "    @Query(\"select e.author from Post e where e.id = :id\")\n    Optional<User> findAuthor(@Param(\"id\") Long id);\n"
        ));
        assert!(out.contains(
            "    @Query(\"select t from Comment t where t.postId = :id order by t.id\")\n    List<Comment> findComments(@Param(\"id\") Long id);\n"
        ));
        assert!(out.contains(
            "    @Query(\"select t from Post e join e.tags t where e.id = :id order by t.id\")\n"
        ));
        assert!(out.contains(
            "    @Query(value = \"INSERT INTO post_tags (post_id, tag_id) VALUES (:id, :tagId)\", nativeQuery = true)\n    void addTag(@Param(\"id\") Long id, @Param(\"tagId\") Integer tagId);\n"
        ));
        assert!(out.contains("    int removeTag(@Param(\"id\") Long id, @Param(\"tagId\") Integer tagId);\n"));
        assert!(!out.contains("findByEmail"));
    }

    #[test]
    fn test_credential_lookup() {
        let out = render("User", all_features());
        assert!(out.contains(
            "    @Query(\"select e from User e where e.email = :email\")\n    Optional<User> findByEmail(@Param(\"email\") String email);\n"
        ));
        assert!(!render("Post", all_features()).contains("findByEmail"));
    }

    #[test]
    fn test_uuid_key() {
        let ctx = compile_sql(crudforge_codegen::testing::PRODUCT_SQL, Target::JavaSpring).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let product = model.entity("Product").unwrap();
        let out = RepositoryJava::new(
            JavaProject::new(&model, &computed),
            product,
            product.id_field().unwrap(),
        )
        .render();
        assert!(out.contains("public interface ProductRepository extends JpaRepository<Product, UUID> {\n"));
        assert!(out.contains("import java.util.UUID;\n"));
    }
}
