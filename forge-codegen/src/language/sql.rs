//! SQL text for targets that query without an ORM (sqlx, database/sql).

use crudforge_ir::DatabaseKind;

/// Words that must be quoted when used as table or column names.
const SQL_RESERVED: &[&str] = &[
    "all", "and", "as", "by", "case", "check", "column", "constraint", "create", "default",
    "delete", "desc", "distinct", "from", "grant", "group", "having", "in", "index", "insert",
    "into", "join", "key", "limit", "not", "null", "offset", "on", "or", "order", "primary",
    "references", "select", "table", "to", "union", "unique", "update", "user", "values",
    "where",
];

/// Placeholder, quoting and RETURNING rules of one database.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlDialect {
    database: DatabaseKind,
}

impl SqlDialect {
    pub fn new(database: DatabaseKind) -> Self {
        Self { database }
    }

    pub fn database(&self) -> DatabaseKind {
        self.database
    }

    /// Bind placeholder for the 1-based parameter `n` (`$1` or `?`).
    pub fn placeholder(&self, n: usize) -> String {
        match self.database {
            DatabaseKind::Postgres => format!("${}", n),
            DatabaseKind::Mysql | DatabaseKind::Sqlite => "?".to_string(),
        }
    }

    /// Quote an identifier unless the database would read it back unchanged.
    ///
    /// Reserved words, names with uppercase letters (Postgres folds unquoted
    /// names to lowercase) and anything outside `[a-z0-9_]` are quoted.
    pub fn ident(&self, name: &str) -> String {
        let plain = name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
            && !name.starts_with(|c: char| c.is_ascii_digit());
        if plain && !SQL_RESERVED.contains(&name) {
            return name.to_string();
        }
        match self.database {
            DatabaseKind::Mysql => format!("`{}`", name),
            DatabaseKind::Postgres | DatabaseKind::Sqlite => format!("\"{}\"", name),
        }
    }

    /// Whether `INSERT/UPDATE ... RETURNING` is available.
    pub fn supports_returning(&self) -> bool {
        !matches!(self.database, DatabaseKind::Mysql)
    }

    /// Comma-separated, quoted column list.
    pub fn column_list<'a>(&self, columns: impl IntoIterator<Item = &'a str>) -> String {
        columns
            .into_iter()
            .map(|c| self.ident(c))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Placeholders `start..start + count`, comma-separated.
    pub fn placeholders(&self, start: usize, count: usize) -> String {
        (start..start + count)
            .map(|n| self.placeholder(n))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        let pg = SqlDialect::new(DatabaseKind::Postgres);
        assert_eq!(pg.placeholders(1, 3), "$1, $2, $3");
        let my = SqlDialect::new(DatabaseKind::Mysql);
        assert_eq!(my.placeholders(4, 2), "?, ?");
    }

    #[test]
    fn test_reserved_identifiers_are_quoted() {
        let pg = SqlDialect::new(DatabaseKind::Postgres);
        assert_eq!(pg.ident("user"), "\"user\"");
        assert_eq!(pg.ident("posts"), "posts");
        assert_eq!(SqlDialect::new(DatabaseKind::Mysql).ident("order"), "`order`");
    }

    #[test]
    fn test_case_sensitive_identifiers_are_quoted() {
        let pg = SqlDialect::new(DatabaseKind::Postgres);
        assert_eq!(pg.ident("BlogPost"), "\"BlogPost\"");
        assert_eq!(pg.ident("post-tags"), "\"post-tags\"");
        assert_eq!(pg.ident("2fa_codes"), "\"2fa_codes\"");
        assert_eq!(pg.ident("blog_posts"), "blog_posts");
        assert_eq!(pg.column_list(["authorId", "title"]), "\"authorId\", title");
        let my = SqlDialect::new(DatabaseKind::Mysql);
        assert_eq!(my.ident("UserID"), "`UserID`");
        assert_eq!(pg.column_list(["id", "group"]), "id, \"group\"");
    }

    #[test]
    fn test_returning_support() {
        assert!(SqlDialect::new(DatabaseKind::Sqlite).supports_returning());
        assert!(!SqlDialect::new(DatabaseKind::Mysql).supports_returning());
    }
}
