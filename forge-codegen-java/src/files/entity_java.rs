use std::path::{Path, PathBuf};

use crudforge_codegen::CodeBuilder;
use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{ColumnType, DatabaseKind, Entity, Field, Relation, RelationKind};

use crate::{
    java_file::{JavaFile, quote},
    project::{JavaProject, upper_first},
};

/// `<entity>/<Entity>.java`: the JPA entity.
///
/// Foreign keys stay scalar fields that requests write; the associations
/// beside them are read-only views used by repository queries.
pub struct EntityJava<'a> {
    project: JavaProject<'a>,
    entity: &'a Entity,
}

impl<'a> EntityJava<'a> {
    pub fn new(project: JavaProject<'a>, entity: &'a Entity) -> Self {
        Self { project, entity }
    }

    fn column(&self, file: &mut JavaFile, field: &Field) -> String {
        let mut attrs = vec![format!("name = {}", quote(&self.project.column_name(&field.name)))];
        if !field.primary_key {
            if !field.nullable {
                attrs.push("nullable = false".into());
            }
            if field.unique {
                attrs.push("unique = true".into());
            }
        }
        attrs.extend(self.project.types.column_attributes(&field.ty));
        if field.generated && !field.primary_key {
            attrs.push("insertable = false".into());
            attrs.push("updatable = false".into());
        }
        add(file, "jakarta.persistence.Column");
        format!("@Column({})", attrs.join(", "))
    }

    fn annotations(&self, file: &mut JavaFile, field: &Field) -> Vec<String> {
        let mut out = Vec::new();
        if field.primary_key {
            add(file, "jakarta.persistence.Id");
            out.push("@Id".to_string());
            if field.generated {
                let strategy = if field.ty == ColumnType::Uuid {
                    "UUID"
                } else {
                    "IDENTITY"
                };
                add(file, "jakarta.persistence.GeneratedValue");
                add(file, "jakarta.persistence.GenerationType");
                out.push(format!("@GeneratedValue(strategy = GenerationType.{strategy})"));
            }
        }
        out.push(self.column(file, field));
        if let Some(default) = field.default.as_ref().filter(|_| !field.primary_key) {
            add(file, "org.hibernate.annotations.ColumnDefault");
            out.push(format!("@ColumnDefault({})", quote(default)));
        }
        match field.ty {
            ColumnType::Json => {
                add(file, "org.hibernate.annotations.JdbcTypeCode");
                add(file, "org.hibernate.type.SqlTypes");
                out.push("@JdbcTypeCode(SqlTypes.JSON)".into());
            }
            ColumnType::Uuid if self.project.model.meta.database != DatabaseKind::Postgres => {
                add(file, "org.hibernate.annotations.JdbcTypeCode");
                add(file, "org.hibernate.type.SqlTypes");
                out.push("@JdbcTypeCode(SqlTypes.CHAR)".into());
            }
            _ => {}
        }
        out
    }

    /// `@JoinColumn` for a column of this or the target table, naming the
    /// referenced column when it is not the target's key.
    fn join_column(&self, name: &str, target: &Entity, referenced: &str, read_only: bool) -> String {
        let mut attrs = vec![format!("name = {}", quote(&self.project.column_name(name)))];
        if target.id_field().is_some_and(|key| key.name != referenced) {
            attrs.push(format!(
                "referencedColumnName = {}",
                quote(&self.project.column_name(referenced))
            ));
        }
        if read_only {
            attrs.push("insertable = false".into());
            attrs.push("updatable = false".into());
        }
        format!("@JoinColumn({})", attrs.join(", "))
    }

    /// Field declaration of one relation, with its Java type.
    fn association(
        &self,
        file: &mut JavaFile,
        relation: &Relation,
        target: &Entity,
    ) -> Option<(Vec<String>, String)> {
        let entity = self.entity;
        if target.name != entity.name {
            add(file, &self.project.entity_class(target, ""));
        }
        let inverse = self.project.inverse(entity, relation);
        let class = &target.name;

        match relation.kind {
            RelationKind::ManyToOne => {
                add(file, "jakarta.persistence.ManyToOne");
                add(file, "jakarta.persistence.FetchType");
                add(file, "jakarta.persistence.JoinColumn");
                Some((
                    vec![
                        "@ManyToOne(fetch = FetchType.LAZY)".into(),
                        self.join_column(&relation.local_column, target, &relation.remote_column, true),
                    ],
                    class.clone(),
                ))
            }
            RelationKind::OneToMany => {
                add(file, "jakarta.persistence.OneToMany");
                add(file, "java.util.List");
                let annotations = match inverse {
                    Some(inverse) => vec![format!(
                        "@OneToMany(mappedBy = {})",
                        quote(&self.project.relation_prop(inverse))
                    )],
                    None => {
                        add(file, "jakarta.persistence.JoinColumn");
                        vec![
                            "@OneToMany".into(),
                            self.join_column(&relation.remote_column, entity, &relation.local_column, true),
                        ]
                    }
                };
                add(file, "java.util.ArrayList");
                Some((annotations, format!("List<{class}>")))
            }
            RelationKind::ManyToMany => {
                let junction = relation.junction.as_ref()?;
                add(file, "jakarta.persistence.ManyToMany");
                add(file, "java.util.Set");
                add(file, "java.util.HashSet");
                let annotations = match inverse.filter(|_| !self.project.owns_junction(relation)) {
                    Some(inverse) => vec![format!(
                        "@ManyToMany(mappedBy = {})",
                        quote(&self.project.relation_prop(inverse))
                    )],
                    None => {
                        add(file, "jakarta.persistence.JoinTable");
                        add(file, "jakarta.persistence.JoinColumn");
                        vec![
                            "@ManyToMany".into(),
                            format!(
                                "@JoinTable(\n        name = {},\n        joinColumns = {},\n        inverseJoinColumns = {})",
                                quote(&self.project.column_name(&junction.table)),
                                self.join_column(&junction.local_column, entity, &relation.local_column, false),
                                self.join_column(&junction.remote_column, target, &relation.remote_column, false),
                            ),
                        ]
                    }
                };
                Some((annotations, format!("Set<{class}>")))
            }
        }
    }
}

fn add(file: &mut JavaFile, fqcn: &str) {
    crate::java_file::add_class(file.imports_mut(), fqcn);
}

impl GeneratedFile for EntityJava<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        self.project.source_path(
            base,
            &self.project.entity_package(self.entity),
            &self.entity.name,
        )
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let entity = self.entity;
        let mut file = JavaFile::new(self.project.entity_package(entity)).import_all([
            "jakarta.persistence.Entity",
            "jakarta.persistence.Table",
            "org.hibernate.annotations.DynamicInsert",
        ]);

        let mut body = CodeBuilder::java();
        if let Some(description) = &entity.description {
            body = body.jsdoc(description);
        }
        body = body
            .line("@Entity")
            .line(&format!(
                "@Table(name = {})",
                quote(&self.project.column_name(&entity.table))
            ))
            .line("@DynamicInsert")
            .block_with_close(&format!("public class {} {{", entity.name), "}", |mut b| {
                let mut accessors = Vec::new();
                for field in &entity.fields {
                    self.project.use_type(file.imports_mut(), &field.ty);
                    let prop = self.project.prop(field);
                    let ty = self.project.field_type(field);
                    b = b.blank();
                    if let Some(description) = &field.description {
                        b = b.jsdoc(description);
                    }
                    for annotation in self.annotations(&mut file, field) {
                        b = b.line(&annotation);
                    }
                    b = b.line(&format!("private {ty} {prop};"));
                    accessors.push((ty, prop, true));
                }
                for relation in &entity.relations {
                    let Some(target) = self.project.target(relation) else {
                        continue;
                    };
                    let Some((annotations, ty)) = self.association(&mut file, relation, target) else {
                        continue;
                    };
                    let prop = self.project.relation_prop(relation);
                    b = b.blank();
                    for annotation in annotations {
                        b = b.lines(&annotation);
                    }
                    let init = match relation.kind {
                        RelationKind::ManyToOne => "",
                        RelationKind::OneToMany => " = new ArrayList<>()",
                        RelationKind::ManyToMany => " = new HashSet<>()",
                    };
                    b = b.line(&format!("private {ty} {prop}{init};"));
                    accessors.push((ty, prop, false));
                }

                for (ty, prop, writable) in accessors {
                    let stem = upper_first(&prop);
                    b = b.blank().block_with_close(
                        &format!("public {ty} get{stem}() {{"),
                        "}",
                        |b| b.line(&format!("return {prop};")),
                    );
                    if writable {
                        b = b.blank().block_with_close(
                            &format!("public void set{stem}({ty} {prop}) {{"),
                            "}",
                            |b| b.line(&format!("this.{prop} = {prop};")),
                        );
                    }
                }
                b
            });

        file.raw(body.build()).render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, compile_sql};
    use crudforge_schema::Target;

    use super::*;

    fn render(sql: &str, name: &str) -> String {
        let ctx = compile_sql(sql, Target::JavaSpring).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let entity = model.entity(name).unwrap();
        EntityJava::new(JavaProject::new(&model, &computed), entity).render()
    }

    #[test]
    fn test_post_entity() {
        let out = render(BLOG_SQL, "Post");
        assert!(out.starts_with("package com.example.blog.post;\n\nimport com.example.blog.comment.Comment;\n"));
        assert!(out.contains("@Entity\n@Table(name = \"posts\")\n@DynamicInsert\npublic class Post {\n"));
        assert!(out.contains(
            "    @Id\n    @GeneratedValue(strategy = GenerationType.IDENTITY)\n    @Column(name = \"id\")\n    private Long id;\n"
        ));
        assert!(out.contains("    @Column(name = \"title\", nullable = false, length = 200)\n    private String title;\n"));
        assert!(out.contains(
            "    @Column(name = \"created_at\", nullable = false, insertable = false, updatable = false)\n    @ColumnDefault(\"now()\")\n    private OffsetDateTime createdAt;\n"
        ));
        assert!(out.contains("    public void setAuthorId(Long authorId) {\n        this.authorId = authorId;\n    }\n"));
    }

    #[test]
    fn test_post_associations() {
        let out = render(BLOG_SQL, "Post");
        assert!(out.contains(
            "    @ManyToOne(fetch = FetchType.LAZY)\n    @JoinColumn(name = \"author_id\", insertable = false, updatable = false)\n    private User author;\n"
        ));
        assert!(out.contains("    @OneToMany(mappedBy = \"post\")\n    private List<Comment> comments = new ArrayList<>();\n"));
        assert!(out.contains(
            "    @ManyToMany\n    @JoinTable(\n            name = \"post_tags\",\n            joinColumns = @JoinColumn(name = \"post_id\"),\n            inverseJoinColumns = @JoinColumn(name = \"tag_id\"))\n    private Set<Tag> tags = new HashSet<>();\n"
        ));
        assert!(out.contains("    public User getAuthor() {\n"));
        assert!(!out.contains("setAuthor("));
    }

    #[test]
    fn test_inverse_many_to_many() {
        let out = render(BLOG_SQL, "Tag");
        assert!(out.contains("    @ManyToMany(mappedBy = \"tags\")\n    private Set<Post> posts = new HashSet<>();\n"));
        assert!(!out.contains("@JoinTable"));
    }

    #[test]
    fn test_uuid_and_json_columns() {
        let out = render(PRODUCT_SQL, "Product");
        assert!(out.contains("    @GeneratedValue(strategy = GenerationType.UUID)\n"));
        assert!(out.contains("    @Column(name = \"price\", nullable = false, precision = 10, scale = 2)\n"));
        assert!(out.contains("    @JdbcTypeCode(SqlTypes.JSON)\n    private JsonNode attributes;\n"));
        assert!(out.contains("import java.util.UUID;\n"));
    }
}
