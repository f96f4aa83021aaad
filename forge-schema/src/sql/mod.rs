//! SQL DDL parsing.
//!
//! Understands the table-defining subset of Postgres, MySQL and SQLite DDL:
//! `CREATE TABLE`, `ALTER TABLE ... ADD`, `CREATE TYPE ... AS ENUM` and
//! `COMMENT ON`. Other statements are skipped.

mod lexer;
mod parser;
mod types;

use crudforge_ir::{ParsedSchema, SchemaFormat};

use crate::{Result, error::SourceContext};

/// Parse SQL DDL into tables.
pub fn parse_sql(src: &str, filename: &str) -> Result<ParsedSchema> {
    let ctx = SourceContext::new(src, filename);
    let tokens = lexer::tokenize(&ctx)?;
    let schema = ParsedSchema::new(filename, SchemaFormat::Sql);
    let schema = parser::Parser::new(&ctx, tokens, schema).parse()?;
    tracing::debug!(
        source = filename,
        tables = schema.tables.len(),
        "parsed SQL schema"
    );
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use crudforge_ir::{ColumnType, ReferentialAction, TableOrigin};

    use super::*;

    const BLOG: &str = r#"
        -- Blog schema
        CREATE TYPE post_status AS ENUM ('draft', 'published');

        CREATE TABLE IF NOT EXISTS public.users (
            id BIGSERIAL PRIMARY KEY,
            email VARCHAR(255) NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT now()
        );

        CREATE TABLE posts (
            id BIGSERIAL PRIMARY KEY,
            author_id BIGINT NOT NULL REFERENCES users (id) ON DELETE CASCADE,
            title VARCHAR(200) NOT NULL,
            body TEXT,
            status post_status NOT NULL DEFAULT 'draft'::post_status,
            price NUMERIC(10, 2)
        );

        CREATE TABLE tags (
            id SERIAL PRIMARY KEY,
            name TEXT NOT NULL
        );

        CREATE TABLE post_tags (
            post_id BIGINT NOT NULL,
            tag_id INTEGER NOT NULL,
            PRIMARY KEY (post_id, tag_id),
            CONSTRAINT fk_post FOREIGN KEY (post_id) REFERENCES posts (id),
            FOREIGN KEY (tag_id) REFERENCES tags (id) ON DELETE CASCADE
        );

        CREATE INDEX idx_posts_author ON posts (author_id);
        COMMENT ON TABLE posts IS 'Blog posts';
        COMMENT ON COLUMN posts.title IS 'Headline';
    "#;

    #[test]
    fn test_parse_blog_schema() {
        let schema = parse_sql(BLOG, "schema.sql").unwrap();
        let names: Vec<_> = schema.tables.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["users", "posts", "tags", "post_tags"]);
    }

    #[test]
    fn test_column_attributes() {
        let schema = parse_sql(BLOG, "schema.sql").unwrap();
        let users = schema.table("users").unwrap();

        let id = users.column("id").unwrap();
        assert_eq!(id.ty, ColumnType::BigInt);
        assert!(id.primary_key && id.auto_increment && !id.nullable);

        let email = users.column("email").unwrap();
        assert_eq!(email.ty, ColumnType::Varchar(Some(255)));
        assert!(email.unique && !email.nullable);

        let created = users.column("created_at").unwrap();
        assert_eq!(created.ty, ColumnType::TimestampTz);
        assert_eq!(created.default.as_deref(), Some("now()"));
        assert!(created.is_database_generated());
        assert_eq!(users.primary_key, vec!["id"]);
    }

    #[test]
    fn test_inline_references() {
        let schema = parse_sql(BLOG, "schema.sql").unwrap();
        let posts = schema.table("posts").unwrap();
        let fk = &posts.foreign_keys[0];
        assert_eq!(fk.columns, vec!["author_id"]);
        assert_eq!(fk.ref_table, "users");
        assert_eq!(fk.ref_columns, vec!["id"]);
        assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
    }

    #[test]
    fn test_enum_types_and_casts() {
        let schema = parse_sql(BLOG, "schema.sql").unwrap();
        let status = schema.table("posts").unwrap().column("status").unwrap();
        assert_eq!(
            status.ty,
            ColumnType::Enum(vec!["draft".into(), "published".into()])
        );
        assert_eq!(status.default.as_deref(), Some("'draft'::post_status"));
    }

    #[test]
    fn test_decimal_precision() {
        let schema = parse_sql(BLOG, "schema.sql").unwrap();
        let price = schema.table("posts").unwrap().column("price").unwrap();
        assert_eq!(
            price.ty,
            ColumnType::Decimal {
                precision: Some(10),
                scale: Some(2)
            }
        );
        assert!(price.nullable);
    }

    #[test]
    fn test_table_constraints_and_junction() {
        let schema = parse_sql(BLOG, "schema.sql").unwrap();
        let link = schema.table("post_tags").unwrap();
        assert_eq!(link.primary_key, vec!["post_id", "tag_id"]);
        assert_eq!(link.foreign_keys.len(), 2);
        assert_eq!(link.foreign_keys[0].name.as_deref(), Some("fk_post"));
        assert!(link.is_junction());
    }

    #[test]
    fn test_comments() {
        let schema = parse_sql(BLOG, "schema.sql").unwrap();
        let posts = schema.table("posts").unwrap();
        assert_eq!(posts.comment.as_deref(), Some("Blog posts"));
        assert_eq!(
            posts.column("title").unwrap().comment.as_deref(),
            Some("Headline")
        );
    }

    #[test]
    fn test_origin_span_covers_statement() {
        let schema = parse_sql(BLOG, "schema.sql").unwrap();
        let TableOrigin::Ddl { offset, len } = schema.table("tags").unwrap().origin else {
            panic!("expected DDL origin");
        };
        let text = &BLOG[offset..offset + len];
        assert!(text.starts_with("CREATE TABLE tags"));
        assert!(text.ends_with(')'));
    }

    #[test]
    fn test_mysql_dialect() {
        let sql = r#"
            CREATE TABLE `orders` (
              `id` INT UNSIGNED NOT NULL AUTO_INCREMENT,
              `customer_id` INT UNSIGNED NOT NULL,
              `paid` TINYINT(1) NOT NULL DEFAULT 0,
              `placed_at` DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP ON UPDATE CURRENT_TIMESTAMP,
              `note` LONGTEXT COMMENT 'free text',
              PRIMARY KEY (`id`),
              KEY `idx_customer` (`customer_id`),
              UNIQUE KEY `uq_note` (`note`(20))
            ) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4 COMMENT='Customer orders';
        "#;
        let schema = parse_sql(sql, "mysql.sql").unwrap();
        let orders = schema.table("orders").unwrap();
        assert!(orders.column("id").unwrap().auto_increment);
        assert_eq!(orders.column("paid").unwrap().ty, ColumnType::Boolean);
        assert_eq!(
            orders.column("placed_at").unwrap().ty,
            ColumnType::Timestamp
        );
        assert_eq!(
            orders.column("note").unwrap().comment.as_deref(),
            Some("free text")
        );
        assert_eq!(orders.unique_constraints, vec![vec!["note".to_string()]]);
        assert_eq!(orders.comment.as_deref(), Some("Customer orders"));
        assert_eq!(orders.primary_key, vec!["id"]);
    }

    #[test]
    fn test_sqlite_dialect() {
        let sql = r#"
            CREATE TABLE notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                body TEXT NOT NULL,
                archived BOOLEAN DEFAULT FALSE
            ) WITHOUT ROWID;
        "#;
        let schema = parse_sql(sql, "sqlite.sql").unwrap();
        let notes = schema.table("notes").unwrap();
        assert!(notes.column("id").unwrap().auto_increment);
        assert_eq!(
            notes.column("archived").unwrap().default.as_deref(),
            Some("FALSE")
        );
    }

    #[test]
    fn test_identity_and_alter_table() {
        let sql = r#"
            CREATE TABLE authors (id INT GENERATED ALWAYS AS IDENTITY, name TEXT);
            CREATE TABLE books (id INT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY, author_id INT);
            ALTER TABLE authors ADD CONSTRAINT authors_pkey PRIMARY KEY (id);
            ALTER TABLE ONLY public.books
                ADD CONSTRAINT books_author_fk FOREIGN KEY (author_id) REFERENCES authors (id) ON DELETE SET NULL;
            ALTER TABLE books ADD COLUMN isbn VARCHAR(13) UNIQUE;
            ALTER TABLE books OWNER TO postgres;
        "#;
        let schema = parse_sql(sql, "schema.sql").unwrap();
        let authors = schema.table("authors").unwrap();
        assert_eq!(authors.primary_key, vec!["id"]);
        assert!(authors.column("id").unwrap().auto_increment);

        let books = schema.table("books").unwrap();
        assert_eq!(books.foreign_keys.len(), 1);
        assert_eq!(
            books.foreign_keys[0].on_delete,
            Some(ReferentialAction::SetNull)
        );
        assert!(books.column("isbn").unwrap().unique);
    }

    #[test]
    fn test_other_statements_skipped() {
        let sql = r#"
            SET statement_timeout = 0;
            CREATE EXTENSION IF NOT EXISTS "uuid-ossp";
            CREATE FUNCTION touch() RETURNS trigger AS $$ BEGIN NEW.updated_at = now(); RETURN NEW; END; $$ LANGUAGE plpgsql;
            CREATE TABLE t (id UUID PRIMARY KEY DEFAULT gen_random_uuid(), tags TEXT[]);
            INSERT INTO t (id) VALUES ('x');
        "#;
        let schema = parse_sql(sql, "schema.sql").unwrap();
        assert_eq!(schema.tables.len(), 1);
        let t = &schema.tables[0];
        assert_eq!(t.column("id").unwrap().ty, ColumnType::Uuid);
        assert_eq!(t.column("tags").unwrap().ty, ColumnType::Json);
    }

    #[test]
    fn test_columns_named_like_keywords() {
        let sql = "CREATE TABLE settings (key TEXT PRIMARY KEY, index INT, check BOOLEAN);";
        let schema = parse_sql(sql, "schema.sql").unwrap();
        let names: Vec<_> = schema.tables[0]
            .columns
            .iter()
            .map(|c| c.name.as_str())
            .collect();
        assert_eq!(names, vec!["key", "index", "check"]);
    }

    #[test]
    fn test_unquoted_names_fold_to_lowercase() {
        let sql = r#"CREATE TABLE BlogPosts (Id INT PRIMARY KEY, "AuthorName" TEXT);"#;
        let schema = parse_sql(sql, "schema.sql").unwrap();
        let table = &schema.tables[0];
        assert_eq!(table.name, "blogposts");
        let names: Vec<_> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "AuthorName"]);
        assert_eq!(table.primary_key, vec!["id"]);
    }

    #[test]
    fn test_unknown_column_in_constraint() {
        let sql = "CREATE TABLE t (id INT, PRIMARY KEY (ident));";
        let err = parse_sql(sql, "schema.sql").unwrap_err();
        assert_eq!(err.to_string(), "unknown column 'ident' in table 't'");
    }

    #[test]
    fn test_missing_type_is_error() {
        let err = parse_sql("CREATE TABLE t (id);", "schema.sql").unwrap_err();
        assert_eq!(err.to_string(), "expected column type, found ')'");
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = parse_sql("CREATE TABLE t (id INT, name TEXT", "schema.sql").unwrap_err();
        assert_eq!(err.to_string(), "unbalanced parentheses in table 't'");
    }

    #[test]
    fn test_alter_unknown_table() {
        let sql = "ALTER TABLE ghosts ADD CONSTRAINT pk PRIMARY KEY (id);";
        let err = parse_sql(sql, "schema.sql").unwrap_err();
        assert_eq!(err.to_string(), "ALTER TABLE references unknown table 'ghosts'");
    }
}
