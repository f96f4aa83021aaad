//! CRUD statements of one entity, shared by the targets that hand-write SQL.

use crudforge_ir::{ColumnType, Entity, Field, Relation, RelationKind};

use super::SqlDialect;

/// A value a statement binds, in placeholder order.
#[derive(Debug, Clone, Copy)]
pub enum Bind<'a> {
    Limit,
    Offset,
    /// The key of the row being addressed.
    Key,
    /// A column value from the create or update input.
    Field(&'a Field),
    /// The key of the related row in a link/unlink statement.
    Related,
}

#[derive(Debug, Clone)]
pub struct Statement<'a> {
    pub sql: String,
    pub binds: Vec<Bind<'a>>,
}

impl<'a> Statement<'a> {
    fn new(sql: String, binds: Vec<Bind<'a>>) -> Self {
        Self { sql, binds }
    }
}

/// Statements behind one relation route.
#[derive(Debug, Clone)]
pub struct RelationSql<'a> {
    /// Fetches the related row (many-to-one) or rows.
    pub lookup: Statement<'a>,
    /// Many-to-many only.
    pub link: Option<Statement<'a>>,
    /// Many-to-many only.
    pub unlink: Option<Statement<'a>>,
}

/// Builds the repository SQL of an entity addressed by `key`.
#[derive(Debug, Clone, Copy)]
pub struct CrudSql<'a> {
    dialect: SqlDialect,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> CrudSql<'a> {
    pub fn new(dialect: SqlDialect, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            dialect,
            entity,
            key,
        }
    }

    /// Whether insert and update return the row themselves.
    pub fn returns(&self) -> bool {
        self.dialect.supports_returning()
    }

    /// Whether the application must generate the key before inserting.
    ///
    /// Without `RETURNING`, only auto-increment integers can be read back;
    /// other database-generated keys are made client side instead.
    pub fn client_key(&self) -> bool {
        !self.returns()
            && self.key.generated
            && !self.key.ty.is_integer()
            && matches!(
                self.key.ty,
                ColumnType::Uuid | ColumnType::Char(_) | ColumnType::Varchar(_) | ColumnType::Text
            )
    }

    pub fn table(&self, entity: &Entity) -> String {
        self.dialect.ident(&entity.table)
    }

    /// Quoted, comma-separated column list.
    pub fn select_list(&self, entity: &Entity) -> String {
        self.dialect
            .column_list(entity.fields.iter().map(|f| f.name.as_str()))
    }

    fn qualified_select_list(&self, entity: &Entity, alias: &str) -> String {
        entity
            .fields
            .iter()
            .map(|f| format!("{}.{}", alias, self.dialect.ident(&f.name)))
            .collect::<Vec<_>>()
            .join(", ")
    }

    fn ident(&self, name: &str) -> String {
        self.dialect.ident(name)
    }

    fn ph(&self, n: usize) -> String {
        self.dialect.placeholder(n)
    }

    /// SQL expression yielding `column` of the row whose key is bound at `n`.
    ///
    /// Relations usually join on the key itself, in which case this is the
    /// bare placeholder.
    pub fn column_of_key(&self, column: &str, n: usize) -> String {
        let placeholder = self.ph(n);
        if column.eq_ignore_ascii_case(&self.key.name) {
            placeholder
        } else {
            format!(
                "(SELECT {} FROM {} WHERE {} = {})",
                self.ident(column),
                self.table(self.entity),
                self.ident(&self.key.name),
                placeholder
            )
        }
    }

    pub fn list(&self) -> Statement<'a> {
        Statement::new(
            format!(
                "SELECT {} FROM {} ORDER BY {} LIMIT {} OFFSET {}",
                self.select_list(self.entity),
                self.table(self.entity),
                self.ident(&self.key.name),
                self.ph(1),
                self.ph(2)
            ),
            vec![Bind::Limit, Bind::Offset],
        )
    }

    pub fn get(&self) -> Statement<'a> {
        Statement::new(
            format!(
                "SELECT {} FROM {} WHERE {} = {}",
                self.select_list(self.entity),
                self.table(self.entity),
                self.ident(&self.key.name),
                self.ph(1)
            ),
            vec![Bind::Key],
        )
    }

    /// Insert of the create input, with `RETURNING` where supported.
    ///
    /// Omitted columns with a default fall back to it through `COALESCE`.
    /// A client-generated key is bound first.
    pub fn insert(&self) -> Statement<'a> {
        let mut columns = Vec::new();
        let mut values = Vec::new();
        let mut binds = Vec::new();
        if self.client_key() {
            columns.push(self.ident(&self.key.name));
            values.push(self.ph(1));
            binds.push(Bind::Key);
        }
        for field in self.entity.insertable_fields() {
            let placeholder = self.ph(binds.len() + 1);
            let value = match &field.default {
                Some(default) => format!("COALESCE({}, {})", placeholder, default),
                None => placeholder,
            };
            columns.push(self.ident(&field.name));
            values.push(value);
            binds.push(Bind::Field(field));
        }

        let table = self.table(self.entity);
        let mut sql = if columns.is_empty() {
            if self.returns() {
                format!("INSERT INTO {} DEFAULT VALUES", table)
            } else {
                format!("INSERT INTO {} () VALUES ()", table)
            }
        } else {
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                columns.join(", "),
                values.join(", ")
            )
        };
        if self.returns() {
            sql.push_str(&format!(" RETURNING {}", self.select_list(self.entity)));
        }
        Statement::new(sql, binds)
    }

    /// Partial update: absent input fields keep their value through
    /// `COALESCE`. None when the entity has nothing to update.
    pub fn update(&self) -> Option<Statement<'a>> {
        let fields: Vec<&'a Field> = self.entity.updatable_fields().collect();
        if fields.is_empty() {
            return None;
        }
        let assignments: Vec<String> = fields
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let column = self.ident(&f.name);
                format!("{column} = COALESCE({}, {column})", self.ph(i + 1))
            })
            .collect();
        let mut sql = format!(
            "UPDATE {} SET {} WHERE {} = {}",
            self.table(self.entity),
            assignments.join(", "),
            self.ident(&self.key.name),
            self.ph(fields.len() + 1)
        );
        if self.returns() {
            sql.push_str(&format!(" RETURNING {}", self.select_list(self.entity)));
        }
        let mut binds: Vec<Bind<'a>> = fields.into_iter().map(Bind::Field).collect();
        binds.push(Bind::Key);
        Some(Statement::new(sql, binds))
    }

    pub fn delete(&self) -> Statement<'a> {
        Statement::new(
            format!(
                "DELETE FROM {} WHERE {} = {}",
                self.table(self.entity),
                self.ident(&self.key.name),
                self.ph(1)
            ),
            vec![Bind::Key],
        )
    }

    /// Statements for a relation route. None for a many-to-many relation
    /// without a junction.
    pub fn relation(&self, relation: &Relation, target: &Entity) -> Option<RelationSql<'a>> {
        let target_key = target
            .id_field()
            .map(|f| f.name.as_str())
            .unwrap_or(relation.remote_column.as_str());
        let own = self.column_of_key(&relation.local_column, 1);

        let sql = match relation.kind {
            RelationKind::ManyToOne => RelationSql {
                lookup: Statement::new(
                    format!(
                        "SELECT {} FROM {} WHERE {} = (SELECT {} FROM {} WHERE {} = {})",
                        self.select_list(target),
                        self.table(target),
                        self.ident(&relation.remote_column),
                        self.ident(&relation.local_column),
                        self.table(self.entity),
                        self.ident(&self.key.name),
                        self.ph(1)
                    ),
                    vec![Bind::Key],
                ),
                link: None,
                unlink: None,
            },
            RelationKind::OneToMany => RelationSql {
                lookup: Statement::new(
                    format!(
                        "SELECT {} FROM {} WHERE {} = {} ORDER BY {}",
                        self.select_list(target),
                        self.table(target),
                        self.ident(&relation.remote_column),
                        own,
                        self.ident(target_key)
                    ),
                    vec![Bind::Key],
                ),
                link: None,
                unlink: None,
            },
            RelationKind::ManyToMany => {
                let junction = relation.junction.as_ref()?;
                let link = self.ident(&junction.table);
                let near = self.ident(&junction.local_column);
                let far = self.ident(&junction.remote_column);
                RelationSql {
                    lookup: Statement::new(
                        format!(
                            "SELECT {} FROM {} t JOIN {} j ON j.{} = t.{} WHERE j.{} = {} ORDER BY t.{}",
                            self.qualified_select_list(target, "t"),
                            self.table(target),
                            link,
                            far,
                            self.ident(&relation.remote_column),
                            near,
                            own,
                            self.ident(target_key)
                        ),
                        vec![Bind::Key],
                    ),
                    link: Some(Statement::new(
                        format!(
                            "INSERT INTO {} ({}, {}) VALUES ({}, {})",
                            link,
                            near,
                            far,
                            own,
                            self.ph(2)
                        ),
                        vec![Bind::Key, Bind::Related],
                    )),
                    unlink: Some(Statement::new(
                        format!(
                            "DELETE FROM {} WHERE {} = {} AND {} = {}",
                            link,
                            near,
                            own,
                            far,
                            self.ph(2)
                        ),
                        vec![Bind::Key, Bind::Related],
                    )),
                }
            }
        };
        Some(sql)
    }
}

#[cfg(test)]
mod tests {
    use crudforge_ir::DatabaseKind;
    use crudforge_schema::Target;

    use super::*;
    use crate::testing::{BLOG_SQL, PRODUCT_SQL, compile_sql};

    #[test]
    fn test_post_statements_postgres() {
        let ctx = compile_sql(BLOG_SQL, Target::RustAxum).unwrap();
        let model = ctx.model.as_ref().unwrap();
        let post = model.entity("Post").unwrap();
        let sql = CrudSql::new(SqlDialect::new(DatabaseKind::Postgres), post, post.id_field().unwrap());

        assert_eq!(
            sql.get().sql,
            "SELECT id, author_id, title, body, published, created_at FROM posts WHERE id = $1"
        );
        let insert = sql.insert();
        assert!(insert
            .sql
            .starts_with("INSERT INTO posts (author_id, title, body, published) VALUES ($1, $2, $3, COALESCE($4, "));
        assert!(insert.sql.contains(" RETURNING id, author_id"));
        assert_eq!(insert.binds.len(), 4);

        let update = sql.update().unwrap();
        assert!(update.sql.contains("title = COALESCE($2, title)"));
        assert!(matches!(update.binds.last(), Some(Bind::Key)));
    }

    #[test]
    fn test_many_to_many_statements() {
        let ctx = compile_sql(BLOG_SQL, Target::RustAxum).unwrap();
        let model = ctx.model.as_ref().unwrap();
        let post = model.entity("Post").unwrap();
        let tag = model.entity("Tag").unwrap();
        let tags = post.relations.iter().find(|r| r.name == "tags").unwrap();
        let sql = CrudSql::new(SqlDialect::new(DatabaseKind::Mysql), post, post.id_field().unwrap());

        let relation = sql.relation(tags, tag).unwrap();
        assert_eq!(
            relation.lookup.sql,
            "SELECT t.id, t.name FROM tags t JOIN post_tags j ON j.tag_id = t.id WHERE j.post_id = ? ORDER BY t.id"
        );
        assert_eq!(
            relation.link.unwrap().sql,
            "INSERT INTO post_tags (post_id, tag_id) VALUES (?, ?)"
        );
    }

    #[test]
    fn test_mysql_uuid_key_is_client_generated() {
        let ctx = compile_sql(PRODUCT_SQL, Target::RustAxum).unwrap();
        let model = ctx.model.as_ref().unwrap();
        let product = model.entity("Product").unwrap();
        let key = product.id_field().unwrap();

        let mysql = CrudSql::new(SqlDialect::new(DatabaseKind::Mysql), product, key);
        assert!(mysql.client_key());
        let insert = mysql.insert();
        assert!(insert.sql.starts_with("INSERT INTO products (id, sku"));
        assert!(!insert.sql.contains("RETURNING"));
        assert!(matches!(insert.binds[0], Bind::Key));

        let pg = CrudSql::new(SqlDialect::new(DatabaseKind::Postgres), product, key);
        assert!(!pg.client_key());
    }
}
