use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{DatabaseKind, Features};

/// `src/config.ts`: typed settings read from the environment.
pub struct ConfigTs {
    pub features: Features,
}

impl ConfigTs {
    /// Interface members and their initializers, per enabled feature.
    fn settings(&self) -> Vec<(&'static str, &'static str)> {
        let mut settings = vec![
            ("port: number", "port: numberOr('PORT', 3000)"),
            ("databaseUrl: string", "databaseUrl: required('DATABASE_URL')"),
        ];
        if self.features.auth {
            settings.push(("jwtSecret: string", "jwtSecret: required('JWT_SECRET')"));
            settings.push(("jwtTtlSecs: number", "jwtTtlSecs: numberOr('JWT_TTL_SECS', 3600)"));
        }
        if self.features.rate_limit {
            settings.push((
                "rateLimitCapacity: number",
                "rateLimitCapacity: numberOr('RATE_LIMIT_CAPACITY', 100)",
            ));
            settings.push((
                "rateLimitRefillPerSec: number",
                "rateLimitRefillPerSec: numberOr('RATE_LIMIT_REFILL_PER_SEC', 10)",
            ));
        }
        if self.features.file_storage {
            settings.push((
                "uploadDir: string",
                "uploadDir: process.env.UPLOAD_DIR ?? 'uploads'",
            ));
        }
        settings
    }
}

impl GeneratedFile for ConfigTs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("config.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let settings = self.settings();
        let members: Vec<String> = settings.iter().map(|(m, _)| format!("  {};", m)).collect();
        let values: Vec<String> = settings.iter().map(|(_, v)| format!("    {},", v)).collect();
        format!(
            r#"export interface AppConfig {{
{members}
}}

function required(name: string): string {{
  const value = process.env[name];
  if (!value) {{
    throw new Error(`${{name}} must be set`);
  }}
  return value;
}}

function numberOr(name: string, fallback: number): number {{
  const raw = process.env[name];
  if (raw === undefined || raw === '') {{
    return fallback;
  }}
  const value = Number(raw);
  if (!Number.isFinite(value)) {{
    throw new Error(`${{name}} must be a number, got '${{raw}}'`);
  }}
  return value;
}}

/** Reads the settings from `process.env`; throws when one is missing or malformed. */
export function loadConfig(): AppConfig {{
  return {{
{values}
  }};
}}
"#,
            members = members.join("\n"),
            values = values.join("\n"),
        )
    }
}

/// `src/database.ts`: TypeORM connection options for the configured database.
pub struct DatabaseTs {
    pub database: DatabaseKind,
}

impl GeneratedFile for DatabaseTs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("database.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let options = match self.database {
            // BIGINT keys come back as numbers rather than strings
            DatabaseKind::Postgres => "    type: 'postgres',\n    url: config.databaseUrl,\n    parseInt8: true,",
            DatabaseKind::Mysql => {
                "    type: 'mysql',\n    url: config.databaseUrl,\n    supportBigNumbers: true,\n    bigNumberStrings: false,"
            }
            DatabaseKind::Sqlite => {
                "    type: 'sqlite',\n    database: config.databaseUrl.replace(/^sqlite:(\\/\\/)?/, ''),"
            }
        };
        format!(
            r#"import {{ TypeOrmModuleOptions }} from '@nestjs/typeorm';

import {{ AppConfig }} from './config';

/** The schema is owned by your migrations; TypeORM never alters it. */
export function databaseOptions(config: AppConfig): TypeOrmModuleOptions {{
  return {{
{options}
    autoLoadEntities: true,
    synchronize: false,
  }};
}}
"#
        )
    }
}
