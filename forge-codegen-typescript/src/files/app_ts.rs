//! Bootstrap and root module.

use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

use crate::{ast::Class, code_file::CodeFile, project::TsProject};

/// `src/main.ts`: loads the environment and starts the HTTP server.
pub struct MainTs;

impl GeneratedFile for MainTs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("main.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        CodeFile::new()
            .import_module("dotenv/config")
            .import("@nestjs/common", "Logger")
            .import("@nestjs/core", "NestFactory")
            .import("./app.module", "AppModule")
            .import("./app.setup", "configureApp")
            .import("./config", "loadConfig")
            .raw(
                r#"async function bootstrap(): Promise<void> {
  const config = loadConfig();
  const app = await NestFactory.create(AppModule);
  configureApp(app);
  await app.listen(config.port);
  Logger.log(`listening on port ${config.port}`, 'Bootstrap');
}

void bootstrap();"#,
            )
            .render()
    }
}

/// `src/app.setup.ts`: global pipes and filters, shared with the e2e tests.
pub struct AppSetupTs;

impl GeneratedFile for AppSetupTs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("app.setup.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        CodeFile::new()
            .import_all("@nestjs/common", ["INestApplication", "ValidationPipe"])
            .import("./common/query-failed.filter", "QueryFailedFilter")
            .raw(
                r#"export function configureApp(app: INestApplication): void {
  app.useGlobalPipes(
    new ValidationPipe({ whitelist: true, forbidNonWhitelisted: true, transform: true }),
  );
  app.useGlobalFilters(new QueryFailedFilter());
}"#,
            )
            .render()
    }
}

/// `src/app.module.ts`: the root module wiring every entity module.
pub struct AppModuleTs<'a> {
    project: TsProject<'a>,
}

impl<'a> AppModuleTs<'a> {
    pub fn new(project: TsProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for AppModuleTs<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("app.module.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let features = self.project.features();
        let mut file = CodeFile::new()
            .import("@nestjs/common", "Module")
            .import("@nestjs/typeorm", "TypeOrmModule")
            .import("./config", "loadConfig")
            .import("./database", "databaseOptions");

        let mut imports = vec![
            "TypeOrmModule.forRootAsync({ useFactory: () => databaseOptions(loadConfig()) })"
                .to_string(),
        ];
        if features.auth {
            file = file.import("./auth/auth.module", "AuthModule");
            imports.push("AuthModule".into());
        }
        if features.file_storage {
            file = file.import("./storage/storage.module", "StorageModule");
            imports.push("StorageModule".into());
        }
        for (entity, _) in self.project.entities() {
            let module = format!("{}Module", entity.name);
            let dir = self.project.dir(entity);
            file = file.import(&format!("./{0}/{0}.module", dir), &module);
            imports.push(module);
        }

        let mut options = format!(
            "Module({{\n  imports: [\n{}\n  ],",
            imports
                .iter()
                .map(|i| format!("    {},", i))
                .collect::<Vec<_>>()
                .join("\n")
        );
        if features.rate_limit {
            file = file
                .import("@nestjs/core", "APP_GUARD")
                .import("./rate-limit/throttle.guard", "ThrottleGuard");
            options.push_str("\n  providers: [{ provide: APP_GUARD, useClass: ThrottleGuard }],");
        }
        options.push_str("\n})");

        file.add(&Class::new("AppModule").decorator(options)).render()
    }
}
