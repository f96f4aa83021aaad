use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

use crate::project::RustProject;

/// The main.rs entry point
pub struct MainRs<'a> {
    project: RustProject<'a>,
}

impl<'a> MainRs<'a> {
    pub fn new(project: RustProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for MainRs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("main.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        format!(
            r#"use std::net::SocketAddr;

use {krate}::{{config::Config, db, routes, state::AppState}};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {{
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let pool = db::connect(&config.database_url).await?;
    let addr = config.bind_addr;
    let app = routes::app(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;
    Ok(())
}}
"#,
            krate = self.project.crate_name()
        )
    }
}
