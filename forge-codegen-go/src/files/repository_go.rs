use std::path::{Path, PathBuf};

use crudforge_codegen::{Bind, CrudSql, Statement};
use crudforge_core::{FileRules, GeneratedFile, singularize, to_camel_case};
use crudforge_ir::{Entity, Field, Relation, RelationKind};

use crate::{
    go_file::{GoFile, GoFunc, GoStruct, quote},
    project::{GoProject, relation_methods},
};

/// `internal/repository/repository.go`: scanning helpers shared by every
/// repository.
pub struct RepositoryBaseGo;

impl GeneratedFile for RepositoryBaseGo {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal").join("repository").join("repository.go")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        GoFile::new("repository")
            .doc("Package repository holds the SQL of every table.")
            .import("database/sql")
            .import("errors")
            .raw("type scanner interface {\n\tScan(dest ...any) error\n}")
            .add(
                &GoFunc::new(
                    "collect[T any](rows *sql.Rows, scan func(scanner) (T, error)) ([]T, error)",
                )
                .doc("collect scans and closes rows. The result is never nil, so an empty\nlist encodes as [].")
                .body(
                    "defer rows.Close()\nout := []T{}\nfor rows.Next() {\n\titem, err := scan(rows)\n\tif err != nil {\n\t\treturn nil, err\n\t}\n\tout = append(out, item)\n}\nreturn out, rows.Err()",
                ),
            )
            .add(
                &GoFunc::new("one[T any](row *sql.Row, scan func(scanner) (T, error)) (*T, error)")
                    .doc("one scans a single row. A missing row is (nil, nil).")
                    .body(
                        "item, err := scan(row)\nif errors.Is(err, sql.ErrNoRows) {\n\treturn nil, nil\n}\nif err != nil {\n\treturn nil, err\n}\nreturn &item, nil",
                    ),
            )
            .render()
    }
}

/// `internal/repository/<entity>.go`: the SQL for one table.
pub struct RepositoryGo<'a> {
    project: GoProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> RepositoryGo<'a> {
    pub fn new(project: GoProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    /// Repository type of an entity (`PostRepository`).
    pub fn type_name(entity: &Entity) -> String {
        format!("{}Repository", entity.name)
    }

    /// Parameter holding the key of the related row in link/unlink methods.
    pub fn related_param(relation: &Relation) -> String {
        format!("{}ID", to_camel_case(&singularize(&relation.name)))
    }

    fn sql(&self) -> CrudSql<'a> {
        self.project.sql(self.entity, self.key)
    }

    fn name(&self) -> &str {
        &self.entity.name
    }

    fn model(&self) -> String {
        format!("models.{}", self.name())
    }

    fn scan_fn(entity: &Entity) -> String {
        format!("scan{}", entity.name)
    }

    fn key_type(&self) -> String {
        self.project.key_type(self.entity, &self.key.name)
    }

    /// What the log and error messages call this entity (`blog post`).
    fn noun(&self) -> String {
        self.entity.file_stem().replace('_', " ")
    }

    fn receiver(&self, signature: String) -> GoFunc {
        GoFunc::new(format!("(r *{}) {}", Self::type_name(self.entity), signature))
    }

    /// Query arguments after the context, in placeholder order.
    fn args(&self, statement: &Statement<'_>, related: &str) -> String {
        let mut args = vec!["ctx".to_string(), quote(&statement.sql)];
        args.extend(statement.binds.iter().map(|bind| match bind {
            Bind::Limit => "limit".to_string(),
            Bind::Offset => "offset".to_string(),
            Bind::Key => "id".to_string(),
            Bind::Field(field) => format!("in.{}", self.project.field_name(field)),
            Bind::Related => related.to_string(),
        }));
        args.join(", ")
    }

    fn wrap(&self, verb: &str) -> String {
        format!("fmt.Errorf(\"{} {}: %w\", err)", verb, self.noun())
    }

    fn scan(&self) -> GoFunc {
        let targets: Vec<String> = self
            .entity
            .fields
            .iter()
            .map(|f| format!("&m.{}", self.project.field_name(f)))
            .collect();
        GoFunc::new(format!(
            "{}(row scanner) ({}, error)",
            Self::scan_fn(self.entity),
            self.model()
        ))
        .body(format!(
            "var m {}\nerr := row.Scan({})\nreturn m, err",
            self.model(),
            targets.join(", ")
        ))
    }

    fn list(&self) -> GoFunc {
        let statement = self.sql().list();
        self.receiver(format!(
            "List(ctx context.Context, limit, offset int64) ([]{}, error)",
            self.model()
        ))
        .body(format!(
            "rows, err := r.db.QueryContext({})\nif err != nil {{\n\treturn nil, {}\n}}\nreturn collect(rows, {})",
            self.args(&statement, ""),
            format!(
                "fmt.Errorf(\"list {}: %w\", err)",
                self.entity.plural.replace('_', " ")
            ),
            Self::scan_fn(self.entity)
        ))
    }

    fn get(&self) -> GoFunc {
        let statement = self.sql().get();
        self.receiver(format!(
            "Get(ctx context.Context, id {}) (*{}, error)",
            self.key_type(),
            self.model()
        ))
        .doc("Get returns nil when no row has the key.")
        .body(format!(
            "return one(r.db.QueryRowContext({}), {})",
            self.args(&statement, ""),
            Self::scan_fn(self.entity)
        ))
    }

    /// Key of the row just inserted, for databases without `RETURNING`.
    fn inserted_key(&self) -> String {
        if self.key.generated && self.key.ty.is_integer() {
            match self.key_type().as_str() {
                "int64" => "id".to_string(),
                other => format!("{other}(id)"),
            }
        } else if self.sql().client_key() {
            "id".to_string()
        } else if self.project.types.is_nilable(&self.key.ty) {
            format!("in.{}", self.project.field_name(self.key))
        } else {
            format!("*in.{}", self.project.field_name(self.key))
        }
    }

    fn create(&self, file: &mut GoFile) -> GoFunc {
        let sql = self.sql();
        let statement = sql.insert();
        let signature = format!(
            "Create(ctx context.Context, in models.Create{}) (*{}, error)",
            self.name(),
            self.model()
        );

        let body = if sql.returns() {
            format!(
                "row, err := {}(r.db.QueryRowContext({}))\nif err != nil {{\n\treturn nil, {}\n}}\nreturn &row, nil",
                Self::scan_fn(self.entity),
                self.args(&statement, ""),
                self.wrap("create")
            )
        } else if sql.client_key() {
            file.imports_mut().add_module("github.com/google/uuid");
            format!(
                "id := uuid.NewString()\nif _, err := r.db.ExecContext({}); err != nil {{\n\treturn nil, {}\n}}\nreturn r.Get(ctx, id)",
                self.args(&statement, ""),
                self.wrap("create")
            )
        } else if self.key.generated && self.key.ty.is_integer() {
            format!(
                "res, err := r.db.ExecContext({})\nif err != nil {{\n\treturn nil, {}\n}}\nid, err := res.LastInsertId()\nif err != nil {{\n\treturn nil, {}\n}}\nreturn r.Get(ctx, {})",
                self.args(&statement, ""),
                self.wrap("create"),
                self.wrap("create"),
                self.inserted_key()
            )
        } else {
            format!(
                "if _, err := r.db.ExecContext({}); err != nil {{\n\treturn nil, {}\n}}\nreturn r.Get(ctx, {})",
                self.args(&statement, ""),
                self.wrap("create"),
                self.inserted_key()
            )
        };
        self.receiver(signature).body(body)
    }

    fn update(&self) -> GoFunc {
        let sql = self.sql();
        let Some(statement) = sql.update() else {
            return self
                .receiver(format!(
                    "Update(ctx context.Context, id {}, _ models.Update{}) (*{}, error)",
                    self.key_type(),
                    self.name(),
                    self.model()
                ))
                .body("return r.Get(ctx, id)");
        };

        let body = if sql.returns() {
            format!(
                "row, err := one(r.db.QueryRowContext({}), {})\nif err != nil {{\n\treturn nil, {}\n}}\nreturn row, nil",
                self.args(&statement, ""),
                Self::scan_fn(self.entity),
                self.wrap("update")
            )
        } else {
            format!(
                "if _, err := r.db.ExecContext({}); err != nil {{\n\treturn nil, {}\n}}\nreturn r.Get(ctx, id)",
                self.args(&statement, ""),
                self.wrap("update")
            )
        };
        self.receiver(format!(
            "Update(ctx context.Context, id {}, in models.Update{}) (*{}, error)",
            self.key_type(),
            self.name(),
            self.model()
        ))
        .doc("Update leaves absent fields unchanged and returns nil when no row has the key.")
        .body(body)
    }

    fn delete(&self) -> GoFunc {
        let statement = self.sql().delete();
        self.receiver(format!(
            "Delete(ctx context.Context, id {}) (bool, error)",
            self.key_type()
        ))
        .doc("Delete reports whether a row was removed.")
        .body(format!(
            "res, err := r.db.ExecContext({})\nif err != nil {{\n\treturn false, {}\n}}\nn, err := res.RowsAffected()\nif err != nil {{\n\treturn false, err\n}}\nreturn n > 0, nil",
            self.args(&statement, ""),
            self.wrap("delete")
        ))
    }

    fn relation(&self, relation: &Relation, target: &Entity) -> Vec<GoFunc> {
        let Some(sql) = self.sql().relation(relation, target) else {
            return Vec::new();
        };
        let [lookup_name, add_name, remove_name] = relation_methods(relation);
        let target_model = format!("models.{}", target.name);
        let scan = Self::scan_fn(target);
        let lookup = &sql.lookup;
        let what = relation.name.replace('_', " ");

        if relation.kind == RelationKind::ManyToOne {
            return vec![
                self.receiver(format!(
                    "{lookup_name}(ctx context.Context, id {}) (*{target_model}, error)",
                    self.key_type()
                ))
                .body(format!(
                    "return one(r.db.QueryRowContext({}), {scan})",
                    self.args(lookup, "")
                )),
            ];
        }

        let mut funcs = vec![
            self.receiver(format!(
                "{lookup_name}(ctx context.Context, id {}) ([]{target_model}, error)",
                self.key_type()
            ))
            .body(format!(
                "rows, err := r.db.QueryContext({})\nif err != nil {{\n\treturn nil, fmt.Errorf(\"list {what}: %w\", err)\n}}\nreturn collect(rows, {scan})",
                self.args(lookup, "")
            )),
        ];

        if let (Some(link), Some(unlink)) = (&sql.link, &sql.unlink) {
            let other = Self::related_param(relation);
            let other_ty = self.project.key_type(target, &relation.remote_column);
            let one = singularize(&what);
            funcs.push(
                self.receiver(format!(
                    "{add_name}(ctx context.Context, id {}, {other} {other_ty}) error",
                    self.key_type()
                ))
                .body(format!(
                    "if _, err := r.db.ExecContext({}); err != nil {{\n\treturn fmt.Errorf(\"add {one}: %w\", err)\n}}\nreturn nil",
                    self.args(link, &other)
                )),
            );
            funcs.push(
                self.receiver(format!(
                    "{remove_name}(ctx context.Context, id {}, {other} {other_ty}) (bool, error)",
                    self.key_type()
                ))
                .doc(format!("{remove_name} reports whether the link existed."))
                .body(format!(
                    "res, err := r.db.ExecContext({})\nif err != nil {{\n\treturn false, fmt.Errorf(\"remove {one}: %w\", err)\n}}\nn, err := res.RowsAffected()\nif err != nil {{\n\treturn false, err\n}}\nreturn n > 0, nil",
                    self.args(unlink, &other)
                )),
            );
        }
        funcs
    }
}

impl GeneratedFile for RepositoryGo<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("internal")
            .join("repository")
            .join(format!("{}.go", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let name = Self::type_name(self.entity);
        let mut file = GoFile::new("repository")
            .import("context")
            .import("database/sql")
            .import("fmt")
            .import(&self.project.internal("models"));

        let create = self.create(&mut file);
        let mut file = file
            .add(&GoStruct::new(&name).field("db", "*sql.DB"))
            .add(
                &GoFunc::new(format!("New{name}(db *sql.DB) *{name}"))
                    .body(format!("return &{name}{{db: db}}")),
            )
            .add(&self.scan())
            .add(&self.list())
            .add(&self.get())
            .add(&create)
            .add(&self.update())
            .add(&self.delete());

        for relation in &self.entity.relations {
            let Some(target) = self.project.navigable(relation) else {
                continue;
            };
            for func in self.relation(relation, target) {
                file = file.add(&func);
            }
        }
        file.render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, compile_sql};
    use crudforge_ir::DatabaseKind;
    use crudforge_schema::Target;

    use super::*;
    use crate::project::Flavor;

    #[test]
    fn test_post_repository_postgres() {
        let ctx = compile_sql(BLOG_SQL, Target::GoGin).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Gin);
        let post = model.entity("Post").unwrap();
        let out = RepositoryGo::new(project, post, post.id_field().unwrap()).render();

        assert!(out.contains("\t\"blog/internal/models\"\n)"));
        assert!(out.contains("func NewPostRepository(db *sql.DB) *PostRepository {"));
        assert!(out.contains(
            "return one(r.db.QueryRowContext(ctx, \"SELECT id, author_id, title, body, published, created_at FROM posts WHERE id = $1\", id), scanPost)"
        ));
        assert!(out.contains("row, err := scanPost(r.db.QueryRowContext(ctx, \"INSERT INTO posts"));
        assert!(out.contains("in.AuthorID, in.Title, in.Body, in.Published)"));
        assert!(out.contains("func (r *PostRepository) Author(ctx context.Context, id int64) (*models.User, error) {"));
        assert!(out.contains("func (r *PostRepository) AddTag(ctx context.Context, id int64, tagID int32) error {"));
        assert!(out.contains("return collect(rows, scanTag)"));
        assert!(!out.contains("uuid"));
    }

    #[test]
    fn test_mysql_uuid_key_generated_in_go() {
        let ctx = compile_sql(PRODUCT_SQL, Target::GoChi).unwrap();
        let (_, mut model, computed) = ctx.into_parts().unwrap();
        model.meta.database = DatabaseKind::Mysql;
        let project = GoProject::new(&model, &computed, Flavor::Chi);
        let product = model.entity("Product").unwrap();
        let out = RepositoryGo::new(project, product, product.id_field().unwrap()).render();

        assert!(out.contains("\t\"github.com/google/uuid\"\n"));
        assert!(out.contains("id := uuid.NewString()"));
        assert!(out.contains("VALUES (?, ?, ?, ?, ?)\", id, in.Sku"));
        assert!(out.contains("func (r *ProductRepository) Get(ctx context.Context, id string)"));
    }

    #[test]
    fn test_mysql_integer_key_read_back() {
        let ctx = compile_sql(BLOG_SQL, Target::GoGin).unwrap();
        let (_, mut model, computed) = ctx.into_parts().unwrap();
        model.meta.database = DatabaseKind::Mysql;
        let project = GoProject::new(&model, &computed, Flavor::Gin);
        let tag = model.entity("Tag").unwrap();
        let out = RepositoryGo::new(project, tag, tag.id_field().unwrap()).render();

        assert!(out.contains("id, err := res.LastInsertId()"));
        assert!(out.contains("return r.Get(ctx, int32(id))"));
    }

    #[test]
    fn test_base_helpers() {
        let out = RepositoryBaseGo.render();
        assert!(out.contains("func collect[T any](rows *sql.Rows"));
        assert!(out.contains("out := []T{}"));
    }
}
