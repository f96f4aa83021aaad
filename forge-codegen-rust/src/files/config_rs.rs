use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::Features;

/// `src/config.rs`: settings read from the environment.
pub struct ConfigRs {
    pub features: Features,
}

impl ConfigRs {
    /// `(field, type, from_env expression, test value)` for each setting beyond
    /// the database URL.
    fn settings(&self) -> Vec<(&'static str, &'static str, &'static str, &'static str)> {
        let mut settings = vec![(
            "bind_addr",
            "SocketAddr",
            "parsed(\"BIND_ADDR\", \"0.0.0.0:3000\")?",
            "SocketAddr::from(([127, 0, 0, 1], 0))",
        )];
        if self.features.auth {
            settings.push(("jwt_secret", "String", "required(\"JWT_SECRET\")?", "\"test-secret\".to_string()"));
            settings.push(("jwt_ttl_secs", "u64", "parsed(\"JWT_TTL_SECS\", \"3600\")?", "3600"));
        }
        if self.features.rate_limit {
            settings.push((
                "rate_limit_capacity",
                "u32",
                "parsed(\"RATE_LIMIT_CAPACITY\", \"100\")?",
                "10_000",
            ));
            settings.push((
                "rate_limit_refill_per_sec",
                "u32",
                "parsed(\"RATE_LIMIT_REFILL_PER_SEC\", \"10\")?",
                "10_000",
            ));
        }
        if self.features.file_storage {
            settings.push((
                "upload_dir",
                "PathBuf",
                "parsed(\"UPLOAD_DIR\", \"uploads\")?",
                "std::env::temp_dir().join(\"uploads\")",
            ));
        }
        settings
    }
}

impl GeneratedFile for ConfigRs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("config.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let settings = self.settings();
        let imports = if self.features.file_storage {
            "use std::{net::SocketAddr, path::PathBuf, str::FromStr};"
        } else {
            "use std::{net::SocketAddr, str::FromStr};"
        };
        let fields: String = settings
            .iter()
            .map(|(name, ty, _, _)| format!("    pub {}: {},\n", name, ty))
            .collect();
        let from_env: String = settings
            .iter()
            .map(|(name, _, expr, _)| format!("            {}: {},\n", name, expr))
            .collect();
        let for_tests: String = settings
            .iter()
            .map(|(name, _, _, value)| format!("            {}: {},\n", name, value))
            .collect();

        format!(
            r#"{imports}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Config {{
    pub database_url: String,
{fields}}}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {{
    #[error("missing environment variable {{0}}")]
    Missing(&'static str),
    #[error("invalid value for {{name}}: {{value}}")]
    Invalid {{ name: &'static str, value: String }},
}}

impl Config {{
    pub fn from_env() -> Result<Self, ConfigError> {{
        Ok(Self {{
            database_url: required("DATABASE_URL")?,
{from_env}        }})
    }}

    /// Settings for integration tests: defaults everywhere except the database.
    pub fn for_tests(database_url: impl Into<String>) -> Self {{
        Self {{
            database_url: database_url.into(),
{for_tests}        }}
    }}
}}

fn required(name: &'static str) -> Result<String, ConfigError> {{
    std::env::var(name).map_err(|_| ConfigError::Missing(name))
}}

fn parsed<T: FromStr>(name: &'static str, default: &str) -> Result<T, ConfigError> {{
    let value = std::env::var(name).unwrap_or_else(|_| default.to_string());
    value.parse().map_err(|_| ConfigError::Invalid {{ name, value }})
}}
"#
        )
    }
}
