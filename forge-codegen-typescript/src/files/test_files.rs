//! End-to-end tests under `test/`, run with jest and supertest.

use std::path::{Path, PathBuf};

use crudforge_codegen::generation::samples::{
    SampleSource, missing_key_literal, sample_plan, update_sample,
};
use crudforge_core::{FileRules, GeneratedFile, Overwrite, to_camel_case};
use crudforge_ir::{ColumnType, Entity, Field};

use crate::project::TsProject;

/// `test/jest-e2e.json`
pub struct JestConfig;

impl GeneratedFile for JestConfig {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("test").join("jest-e2e.json")
    }

    fn rules(&self) -> FileRules {
        FileRules {
            overwrite: Overwrite::Always,
            header: None,
        }
    }

    fn render(&self) -> String {
        r#"{
  "rootDir": ".",
  "moduleFileExtensions": ["js", "json", "ts"],
  "testEnvironment": "node",
  "testRegex": ".e2e-spec.ts$",
  "transform": {
    "^.+\\.ts$": [
      "ts-jest",
      {
        "tsconfig": {
          "module": "commonjs",
          "target": "ES2021",
          "strict": true,
          "esModuleInterop": true,
          "experimentalDecorators": true,
          "emitDecoratorMetadata": true,
          "skipLibCheck": true
        }
      }
    ]
  }
}
"#
        .to_string()
    }
}

/// `test/helpers.ts`: app bootstrap, unique values and row factories.
pub struct TestHelpers<'a> {
    project: TsProject<'a>,
}

impl<'a> TestHelpers<'a> {
    pub fn new(project: TsProject<'a>) -> Self {
        Self { project }
    }

    /// Factory function name for an entity (`createBlogPost`).
    pub fn factory_name(entity: &Entity) -> String {
        format!("create{}", entity.name)
    }

    /// Expression producing a fresh value for a unique column.
    fn unique_expr(field: &Field) -> String {
        let max = field.ty.max_length().map(|n| n as usize);
        match &field.ty {
            ColumnType::Uuid => "uniqueUuid()".to_string(),
            ty if ty.is_integer() => "uniqueNumber()".to_string(),
            _ if field.name.to_ascii_lowercase().contains("email") => format!(
                "`${{unique('user', {})}}@example.com`",
                max.map(|n| n.saturating_sub(12).clamp(1, 32)).unwrap_or(32)
            ),
            _ => {
                let prefix: String = field.name.chars().take(4).collect();
                format!("unique('{}', {})", prefix, max.unwrap_or(32).min(32))
            }
        }
    }

    fn factory(&self, entity: &Entity) -> String {
        let plan = sample_plan(self.project.model, self.project.computed, entity);
        let mut setup = String::new();
        let mut fields = Vec::new();
        for (field, source) in &plan {
            let value = match source {
                SampleSource::Parent {
                    binding,
                    entity: parent,
                    column,
                } => {
                    let binding = match to_camel_case(binding).as_str() {
                        "app" | "token" => format!("{}Row", binding),
                        other => other.to_string(),
                    };
                    setup.push_str(&format!(
                        "  const {binding} = await {}(app, token);\n",
                        Self::factory_name(parent)
                    ));
                    format!("{binding}.{}", self.project.prop_of(parent, column))
                }
                SampleSource::Unique => Self::unique_expr(field),
                SampleSource::Literal(value) => value.to_string(),
            };
            fields.push(format!("    {}: {},", self.project.prop(field), value));
        }
        let body = if fields.is_empty() {
            "{}".to_string()
        } else {
            format!("{{\n{}\n  }}", fields.join("\n"))
        };
        format!(
            r#"export async function {name}(app: INestApplication, token?: string): Promise<Row> {{
{setup}  const res = await withToken(request(app.getHttpServer()).post('/{route}'), token).send({body});
  expect(res.status).toBe(201);
  return res.body;
}}
"#,
            name = Self::factory_name(entity),
            route = entity.route(),
        )
    }

    fn token_fn(&self) -> &'static str {
        if self.project.features().auth {
            r#"/** Registers a fresh user and returns its bearer token. */
export async function token(app: INestApplication): Promise<string | undefined> {
  const res = await request(app.getHttpServer())
    .post('/auth/register')
    .send({ email: `${unique('user', 32)}@example.com`, password: 'password123' });
  expect(res.status).toBe(201);
  return res.body.accessToken;
}
"#
        } else {
            "/** Writes are open; no token is needed. */\nexport async function token(_app: INestApplication): Promise<string | undefined> {\n  return undefined;\n}\n"
        }
    }
}

impl GeneratedFile for TestHelpers<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("test").join("helpers.ts")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let features = self.project.features();
        let mut env = String::new();
        if features.auth {
            env.push_str("  process.env.JWT_SECRET ??= 'test-secret';\n");
        }
        if features.rate_limit {
            env.push_str("  process.env.RATE_LIMIT_CAPACITY ??= '100000';\n");
        }
        let factories: Vec<String> = self
            .project
            .entities()
            .map(|(entity, _)| self.factory(entity))
            .collect();

        format!(
            r#"import {{ INestApplication }} from '@nestjs/common';
import {{ Test }} from '@nestjs/testing';
import request from 'supertest';

import {{ AppModule }} from '../src/app.module';
import {{ configureApp }} from '../src/app.setup';

// eslint-disable-next-line @typescript-eslint/no-explicit-any
export type Row = Record<string, any>;

/** Set when TEST_DATABASE_URL points at a database the suites may write to. */
export const hasDatabase = Boolean(process.env.TEST_DATABASE_URL);

/** The app wired to TEST_DATABASE_URL. */
export async function createApp(): Promise<INestApplication> {{
  process.env.DATABASE_URL = process.env.TEST_DATABASE_URL;
{env}  const moduleRef = await Test.createTestingModule({{ imports: [AppModule] }}).compile();
  const app = moduleRef.createNestApplication();
  configureApp(app);
  await app.init();
  return app;
}}

export function withToken(req: request.Test, token?: string): request.Test {{
  return token ? req.set('Authorization', `Bearer ${{token}}`) : req;
}}

let counter = 0;

function nextSeed(): number {{
  counter += 1;
  return Date.now() * 1000 + (counter % 1000);
}}

/** A value no earlier run produced, at most `maxLen` characters. */
export function unique(prefix: string, maxLen: number): string {{
  const tail = nextSeed().toString(16).slice(-maxLen);
  return prefix.slice(0, maxLen - tail.length) + tail;
}}

export function uniqueNumber(): number {{
  return (nextSeed() % 1_000_000_000) + 1;
}}

export function uniqueUuid(): string {{
  const tail = (nextSeed() % 0xffffffffffff).toString(16).padStart(12, '0');
  return `00000000-0000-4000-8000-${{tail}}`;
}}

{token}
{factories}"#,
            token = self.token_fn(),
            factories = factories.join("\n"),
        )
    }
}

/// `test/<entity>.e2e-spec.ts`: CRUD round trip against a live database.
pub struct EntityE2eTest<'a> {
    project: TsProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> EntityE2eTest<'a> {
    pub fn new(project: TsProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }
}

impl GeneratedFile for EntityE2eTest<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("test")
            .join(format!("{}.e2e-spec.ts", self.project.dir(self.entity)))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let route = self.entity.route();
        let key = self.project.prop(self.key);
        let label = self.entity.kebab_name().replace('-', " ");
        let factory = TestHelpers::factory_name(self.entity);
        let missing = missing_key_literal(self.key);
        let auth = self.project.features().auth;

        let update_block = match update_sample(self.entity) {
            Some((field, value)) => {
                let prop = self.project.prop(field);
                format!(
                    r#"
    res = await withToken(server().put(`/{route}/${{id}}`), auth).send({{ {prop}: {value} }});
    expect(res.status).toBe(200);
    expect(res.body.{prop}).toEqual({value});
"#
                )
            }
            None => String::new(),
        };
        let auth_test = if auth {
            format!(
                r#"
  it('rejects writes without a token', async () => {{
    const res = await server().post('/{route}').send({{}});
    expect(res.status).toBe(401);
  }});
"#
            )
        } else {
            String::new()
        };

        format!(
            r#"import {{ INestApplication }} from '@nestjs/common';
import request from 'supertest';

import {{ {factory}, createApp, hasDatabase, token, withToken }} from './helpers';

(hasDatabase ? describe : describe.skip)('{label} API', () => {{
  let app: INestApplication;
  let auth: string | undefined;
  const server = () => request(app.getHttpServer());

  beforeAll(async () => {{
    app = await createApp();
    auth = await token(app);
  }});

  afterAll(async () => {{
    await app?.close();
  }});

  it('creates, reads, updates and deletes', async () => {{
    const created = await {factory}(app, auth);
    const id = created.{key};

    let res = await server().get(`/{route}/${{id}}`);
    expect(res.status).toBe(200);
    expect(res.body.{key}).toEqual(id);

    res = await server().get('/{route}?limit=5');
    expect(res.status).toBe(200);
    expect(res.body.length).toBeLessThanOrEqual(5);
{update_block}
    res = await withToken(server().delete(`/{route}/${{id}}`), auth);
    expect(res.status).toBe(204);

    res = await server().get(`/{route}/${{id}}`);
    expect(res.status).toBe(404);
  }});

  it('answers 404 for a missing row', async () => {{
    const res = await server().get('/{route}/{missing}');
    expect(res.status).toBe(404);
  }});
{auth_test}}});
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::{
        ComputedData,
        testing::{BLOG_SQL, all_features, compile_sql, compile_sql_with},
    };
    use crudforge_ir::{DomainModel, Features};
    use crudforge_schema::Target;

    use super::*;

    fn blog(features: Option<Features>) -> (DomainModel, ComputedData) {
        let ctx = match features {
            Some(features) => compile_sql_with(BLOG_SQL, Target::TypescriptNestjs, features),
            None => compile_sql(BLOG_SQL, Target::TypescriptNestjs),
        }
        .unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        (model, computed)
    }

    #[test]
    fn test_factories_create_parents_first() {
        let (model, computed) = blog(None);
        let content = TestHelpers::new(TsProject::new(&model, &computed)).render();
        assert!(content.contains("export async function createPost(app: INestApplication, token?: string)"));
        assert!(content.contains("  const author = await createUser(app, token);\n"));
        assert!(content.contains("    authorId: author.id,"));
        assert!(content.contains("    email: `${unique('user', 32)}@example.com`,"));
        assert!(content.contains("Writes are open"));
    }

    #[test]
    fn test_helpers_register_when_auth_enabled() {
        let (model, computed) = blog(Some(all_features()));
        let content = TestHelpers::new(TsProject::new(&model, &computed)).render();
        assert!(content.contains(".post('/auth/register')"));
        assert!(content.contains("process.env.JWT_SECRET ??= 'test-secret';"));
        assert!(content.contains("process.env.RATE_LIMIT_CAPACITY ??= '100000';"));
    }

    #[test]
    fn test_entity_spec() {
        let (model, computed) = blog(Some(all_features()));
        let project = TsProject::new(&model, &computed);
        let post = model.entity("Post").unwrap();
        let test = EntityE2eTest::new(project, post, post.id_field().unwrap());
        let content = test.render();

        assert!(content.contains("(hasDatabase ? describe : describe.skip)('post API'"));
        assert!(content.contains("server().put(`/posts/${id}`), auth).send({ title: \"updated\" })"));
        assert!(content.contains("server().get('/posts/2147483000')"));
        assert!(content.contains("expect(res.status).toBe(401);"));
        assert_eq!(
            test.path(Path::new("")),
            PathBuf::from("test/post.e2e-spec.ts")
        );
    }
}
