use std::path::{Path, PathBuf};

use crudforge_codegen::{Bind, CrudSql, Statement};
use crudforge_core::{FileRules, GeneratedFile, singularize, to_snake_case};
use crudforge_ir::{Entity, Field, Relation, RelationKind};

use crate::{
    ast::{Fn, Param},
    project::RustProject,
    render::RustFile,
};

/// `src/repositories/<entity>.rs`: the SQL for one table.
pub struct RepositoryRs<'a> {
    project: RustProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

/// Render a string literal holding SQL, raw when it contains quotes.
fn sql_literal(sql: &str) -> String {
    if sql.contains('"') {
        format!("r#\"{}\"#", sql)
    } else {
        format!("\"{}\"", sql)
    }
}

/// A sqlx query expression, one chained call per line.
///
/// With a `let` prefix the continuation lines are indented one level.
fn chain(prefix: &str, head: &str, sql: &str, binds: &[String], tail: &[&str]) -> String {
    let pad = if prefix.is_empty() { "" } else { "    " };
    let mut lines = vec![
        format!("{prefix}{head}("),
        format!("{pad}    {},", sql_literal(sql)),
        format!("{pad})"),
    ];
    lines.extend(binds.iter().map(|b| format!("{pad}.bind({b})")));
    lines.extend(tail.iter().map(|t| format!("{pad}.{t}")));
    lines.join("\n")
}

/// Repository function names for a relation, accessor first.
pub fn relation_fns(relation: &Relation) -> Vec<String> {
    let name = to_snake_case(&relation.name);
    match relation.kind {
        RelationKind::ManyToOne => vec![format!("get_{}", name)],
        RelationKind::OneToMany => vec![format!("list_{}", name)],
        RelationKind::ManyToMany => {
            let one = singularize(&name);
            vec![
                format!("list_{}", name),
                format!("add_{}", one),
                format!("remove_{}", one),
            ]
        }
    }
}

impl<'a> RepositoryRs<'a> {
    pub fn new(project: RustProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }

    fn name(&self) -> &str {
        &self.entity.name
    }

    fn sql(&self) -> CrudSql<'a> {
        CrudSql::new(self.project.dialect, self.entity, self.key)
    }

    fn key_type(&self) -> String {
        self.project.column_type(self.entity, &self.key.name)
    }

    fn key_param(&self) -> Param {
        Param::new("id", self.key_type())
    }

    fn key_bind(&self) -> String {
        if self.project.types.is_copy(&self.key.ty) {
            "id".to_string()
        } else {
            "&id".to_string()
        }
    }

    /// `.bind(...)` arguments of a statement.
    fn binds(&self, statement: &Statement<'_>, related: &str) -> Vec<String> {
        statement
            .binds
            .iter()
            .map(|bind| match bind {
                Bind::Limit => "limit".to_string(),
                Bind::Offset => "offset".to_string(),
                Bind::Key => self.key_bind(),
                Bind::Field(field) => self.project.bind_arg("input", field),
                Bind::Related => related.to_string(),
            })
            .collect()
    }

    fn base_fn(&self, name: &str) -> Fn {
        Fn::new(name).async_().param(Param::new("db", "&DbPool"))
    }

    fn list(&self) -> Fn {
        let statement = self.sql().list();
        self.base_fn("list")
            .param(Param::new("limit", "i64"))
            .param(Param::new("offset", "i64"))
            .returns(format!("Result<Vec<{}>, sqlx::Error>", self.name()))
            .body(chain(
                "",
                &format!("sqlx::query_as::<_, {}>", self.name()),
                &statement.sql,
                &self.binds(&statement, ""),
                &["fetch_all(db)", "await"],
            ))
    }

    fn get(&self) -> Fn {
        let statement = self.sql().get();
        self.base_fn("get")
            .param(self.key_param())
            .returns(format!("Result<Option<{}>, sqlx::Error>", self.name()))
            .body(chain(
                "",
                &format!("sqlx::query_as::<_, {}>", self.name()),
                &statement.sql,
                &self.binds(&statement, ""),
                &["fetch_optional(db)", "await"],
            ))
    }

    /// Key value to read back after a MySQL insert.
    fn inserted_key(&self) -> String {
        if self.key.generated && self.key.ty.is_integer() {
            format!("result.last_insert_id() as {}", self.key_type())
        } else if self.sql().client_key() {
            "id".to_string()
        } else if self.project.types.is_copy(&self.key.ty) {
            format!("input.{}", self.project.field_name(self.key))
        } else {
            format!("input.{}.clone()", self.project.field_name(self.key))
        }
    }

    fn create(&self) -> Fn {
        let sql = self.sql();
        let statement = sql.insert();
        let binds = self.binds(&statement, "");
        let setup = match self.project.client_key_expr(self.key) {
            Some(expr) if sql.client_key() => format!("let id = {};\n", expr),
            _ => String::new(),
        };

        let body = if sql.returns() {
            chain(
                "",
                &format!("sqlx::query_as::<_, {}>", self.name()),
                &statement.sql,
                &binds,
                &["fetch_one(db)", "await"],
            )
        } else {
            format!(
                "{}\nget(db, {}).await?.ok_or(sqlx::Error::RowNotFound)",
                chain("let result = ", "sqlx::query", &statement.sql, &binds, &["execute(db)", "await?;"]),
                self.inserted_key()
            )
        };

        self.base_fn("create")
            .param(Param::new("input", format!("&Create{}", self.name())))
            .returns(format!("Result<{}, sqlx::Error>", self.name()))
            .body(format!("{}{}", setup, body))
    }

    fn update(&self) -> Fn {
        let sql = self.sql();
        let func = self
            .base_fn("update")
            .param(self.key_param())
            .returns(format!("Result<Option<{}>, sqlx::Error>", self.name()));

        let Some(statement) = sql.update() else {
            return func
                .param(Param::new("_input", format!("&Update{}", self.name())))
                .body("get(db, id).await");
        };
        let binds = self.binds(&statement, "");
        let body = if sql.returns() {
            chain(
                "",
                &format!("sqlx::query_as::<_, {}>", self.name()),
                &statement.sql,
                &binds,
                &["fetch_optional(db)", "await"],
            )
        } else {
            format!(
                "{}\nget(db, id).await",
                chain("", "sqlx::query", &statement.sql, &binds, &["execute(db)", "await?;"])
            )
        };
        func.param(Param::new("input", format!("&Update{}", self.name())))
            .body(body)
    }

    fn delete(&self) -> Fn {
        let statement = self.sql().delete();
        self.base_fn("delete")
            .doc("Returns false when no row matched.")
            .param(self.key_param())
            .returns("Result<bool, sqlx::Error>")
            .body(format!(
                "{}\nOk(result.rows_affected() > 0)",
                chain(
                    "let result = ",
                    "sqlx::query",
                    &statement.sql,
                    &self.binds(&statement, ""),
                    &["execute(db)", "await?;"]
                )
            ))
    }

    fn relation(&self, relation: &Relation, target: &Entity) -> Vec<Fn> {
        let Some(sql) = self.sql().relation(relation, target) else {
            return Vec::new();
        };
        let names = relation_fns(relation);
        let target_name = &target.name;
        let query_as = format!("sqlx::query_as::<_, {}>", target_name);
        let lookup = &sql.lookup;

        match relation.kind {
            RelationKind::ManyToOne => vec![self
                .base_fn(&names[0])
                .param(self.key_param())
                .returns(format!("Result<Option<{}>, sqlx::Error>", target_name))
                .body(chain(
                    "",
                    &query_as,
                    &lookup.sql,
                    &self.binds(lookup, ""),
                    &["fetch_optional(db)", "await"],
                ))],
            RelationKind::OneToMany => vec![self
                .base_fn(&names[0])
                .param(self.key_param())
                .returns(format!("Result<Vec<{}>, sqlx::Error>", target_name))
                .body(chain(
                    "",
                    &query_as,
                    &lookup.sql,
                    &self.binds(lookup, ""),
                    &["fetch_all(db)", "await"],
                ))],
            RelationKind::ManyToMany => {
                let (Some(link), Some(unlink)) = (&sql.link, &sql.unlink) else {
                    return Vec::new();
                };
                let other = format!("{}_id", singularize(&to_snake_case(&relation.name)));
                let other_ty = self.project.column_type(target, &relation.remote_column);
                let other_bind = if target
                    .field(&relation.remote_column)
                    .is_some_and(|f| self.project.types.is_copy(&f.ty))
                {
                    other.clone()
                } else {
                    format!("&{}", other)
                };

                vec![
                    self.base_fn(&names[0])
                        .param(self.key_param())
                        .returns(format!("Result<Vec<{}>, sqlx::Error>", target_name))
                        .body(chain(
                            "",
                            &query_as,
                            &lookup.sql,
                            &self.binds(lookup, ""),
                            &["fetch_all(db)", "await"],
                        )),
                    self.base_fn(&names[1])
                        .param(self.key_param())
                        .param(Param::new(&other, &other_ty))
                        .returns("Result<(), sqlx::Error>")
                        .body(format!(
                            "{}\nOk(())",
                            chain(
                                "",
                                "sqlx::query",
                                &link.sql,
                                &self.binds(link, &other_bind),
                                &["execute(db)", "await?;"]
                            )
                        )),
                    self.base_fn(&names[2])
                        .doc("Returns false when the link did not exist.")
                        .param(self.key_param())
                        .param(Param::new(&other, &other_ty))
                        .returns("Result<bool, sqlx::Error>")
                        .body(format!(
                            "{}\nOk(result.rows_affected() > 0)",
                            chain(
                                "let result = ",
                                "sqlx::query",
                                &unlink.sql,
                                &self.binds(unlink, &other_bind),
                                &["execute(db)", "await?;"]
                            )
                        )),
                ]
            }
        }
    }
}

impl GeneratedFile for RepositoryRs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src")
            .join("repositories")
            .join(format!("{}.rs", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let stem = self.entity.file_stem();
        let mut file = RustFile::new();
        {
            let imports = file.imports_mut();
            imports.add("crate::db", "DbPool");
            let models = format!("crate::models::{}", stem);
            imports.add(&models, &format!("Create{}", self.name()));
            imports.add(&models, self.name());
            imports.add(&models, &format!("Update{}", self.name()));
        }

        let mut file = file
            .add(&self.list())
            .add(&self.get())
            .add(&self.create())
            .add(&self.update())
            .add(&self.delete());

        for relation in &self.entity.relations {
            let Some(target) = self.project.target(relation) else {
                continue;
            };
            file.imports_mut()
                .add(&format!("crate::models::{}", target.file_stem()), &target.name);
            for func in self.relation(relation, target) {
                file = file.add(&func);
            }
        }
        file.render()
    }
}
