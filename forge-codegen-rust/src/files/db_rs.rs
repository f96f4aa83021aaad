use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::DatabaseKind;

/// `src/db.rs`: the connection pool.
pub struct DbRs {
    pub database: DatabaseKind,
}

impl GeneratedFile for DbRs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("db.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let (module, pool, options) = match self.database {
            DatabaseKind::Postgres => ("postgres", "PgPool", "PgPoolOptions"),
            DatabaseKind::Mysql => ("mysql", "MySqlPool", "MySqlPoolOptions"),
            DatabaseKind::Sqlite => ("sqlite", "SqlitePool", "SqlitePoolOptions"),
        };
        format!(
            r#"use sqlx::{module}::{{{pool}, {options}}};

pub type DbPool = {pool};

pub async fn connect(url: &str) -> Result<DbPool, sqlx::Error> {{
    {options}::new().max_connections(10).connect(url).await
}}
"#
        )
    }
}
