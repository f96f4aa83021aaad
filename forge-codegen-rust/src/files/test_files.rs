use std::path::{Path, PathBuf};

use crudforge_codegen::generation::samples::{
    SampleSource, missing_key_literal, sample_plan, update_sample,
};
use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{ColumnType, Entity, Field};

use crate::project::RustProject;

/// `tests/common/mod.rs`: app bootstrap, request helper and row factories.
pub struct TestCommon<'a> {
    project: RustProject<'a>,
}

impl<'a> TestCommon<'a> {
    pub fn new(project: RustProject<'a>) -> Self {
        Self { project }
    }

    /// Expression producing a fresh value for a unique column.
    fn unique_expr(field: &Field) -> String {
        let max = field.ty.max_length().map(|n| n as usize);
        match &field.ty {
            ColumnType::Uuid => "unique_uuid()".to_string(),
            ty if ty.is_integer() => "unique_number()".to_string(),
            _ if field.name.to_ascii_lowercase().contains("email") => format!(
                "format!(\"{{}}@example.com\", unique(\"user\", {}))",
                max.map(|n| n.saturating_sub(12).clamp(1, 32)).unwrap_or(32)
            ),
            _ => {
                let prefix: String = field.name.chars().take(4).collect();
                format!("unique(\"{}\", {})", prefix, max.unwrap_or(32).min(32))
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
                    let binding = match binding.as_str() {
                        "app" | "token" => format!("{binding}_row"),
                        _ => binding.clone(),
                    };
                    setup.push_str(&format!(
                        "    let {binding} = create_{}(app, token).await;\n",
                        parent.file_stem()
                    ));
                    format!("{binding}[\"{column}\"]")
                }
                SampleSource::Unique => Self::unique_expr(field),
                SampleSource::Literal(value) => value.to_string(),
            };
            fields.push(format!("            \"{}\": {},", field.name, value));
        }
        let body = if fields.is_empty() {
            "Some(json!({}))".to_string()
        } else {
            format!("Some(json!({{\n{}\n        }}))", fields.join("\n"))
        };
        format!(
            r#"pub async fn create_{stem}(app: &Router, token: Option<&str>) -> Value {{
{setup}    let (status, body) = send(
        app,
        "POST",
        "/{route}",
        {body},
        token,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create {stem}: {{body}}");
    body
}}
"#,
            stem = entity.file_stem(),
            route = entity.route(),
        )
    }

    fn token_fn(&self) -> &'static str {
        if self.project.features().auth {
            r#"/// Registers a fresh user and returns its bearer token.
pub async fn token(app: &Router) -> Option<String> {
    let email = format!("{}@example.com", unique("user", 32));
    let (status, body) = send(
        app,
        "POST",
        "/auth/register",
        Some(json!({ "email": email, "password": "password123" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register: {body}");
    body["access_token"].as_str().map(str::to_string)
}
"#
        } else {
            "/// Writes are open; no token is needed.\npub async fn token(_app: &Router) -> Option<String> {\n    None\n}\n"
        }
    }
}

impl GeneratedFile for TestCommon<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("tests").join("common").join("mod.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let factories: Vec<String> = self
            .project
            .entities()
            .map(|(entity, _)| self.factory(entity))
            .collect();

        format!(
            r#"#![allow(dead_code)]

use std::{{
    sync::atomic::{{AtomicU64, Ordering}},
    time::{{SystemTime, UNIX_EPOCH}},
}};

use axum::{{
    body::Body,
    http::{{Request, StatusCode}},
    Router,
}};
use http_body_util::BodyExt;
use {krate}::{{config::Config, db, routes, state::AppState}};
use serde_json::{{json, Value}};
use tower::ServiceExt;

/// The app wired to TEST_DATABASE_URL, or None when it is unset.
pub async fn app() -> Option<Router> {{
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = db::connect(&url)
        .await
        .expect("failed to connect to TEST_DATABASE_URL");
    Some(routes::app(AppState::new(pool, Config::for_tests(url))))
}}

pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {{
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(token) = token {{
        request = request.header("authorization", format!("Bearer {{token}}"));
    }}
    let request = match body {{
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string())),
        None => request.body(Body::empty()),
    }}
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}}

/// Key of a returned row as a path segment.
pub fn key(body: &Value, column: &str) -> String {{
    match &body[column] {{
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }}
}}

fn next_seed() -> u64 {{
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or_default();
    nanos.wrapping_add(COUNTER.fetch_add(1, Ordering::Relaxed))
}}

/// A value no earlier run produced, at most `max_len` characters.
pub fn unique(prefix: &str, max_len: usize) -> String {{
    let tail = format!("{{:x}}", next_seed());
    let tail = &tail[tail.len().saturating_sub(max_len)..];
    let head: String = prefix.chars().take(max_len - tail.len()).collect();
    format!("{{head}}{{tail}}")
}}

pub fn unique_number() -> i64 {{
    (next_seed() % 1_000_000_000) as i64 + 1
}}

pub fn unique_uuid() -> String {{
    format!("00000000-0000-4000-8000-{{:012x}}", next_seed() & 0xffff_ffff_ffff)
}}

{token}
{factories}"#,
            krate = self.project.crate_name(),
            token = self.token_fn(),
            factories = factories.join("\n"),
        )
    }
}

/// `tests/<entity>_api.rs`: CRUD round trip against a live database.
pub struct EntityApiTest<'a> {
    project: RustProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> EntityApiTest<'a> {
    pub fn new(project: RustProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }
}

impl GeneratedFile for EntityApiTest<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("tests")
            .join(format!("{}_api.rs", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let stem = self.entity.file_stem();
        let route = self.entity.route();
        let key = &self.key.name;
        let auth = self.project.features().auth;
        let update = update_sample(self.entity);
        let needs_json = update.is_some() || auth;

        let update_block = match &update {
            Some((field, value)) => format!(
                r#"
    let (status, body) = common::send(
        &app,
        "PUT",
        &format!("/{route}/{{id}}"),
        Some(json!({{ "{name}": {value} }})),
        token,
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{{body}}");
    assert_eq!(body["{name}"], json!({value}));
"#,
                name = field.name,
            ),
            None => String::new(),
        };

        let auth_test = if auth {
            format!(
                r#"
#[tokio::test]
async fn {stem}_writes_require_token() {{
    let Some(app) = common::app().await else {{
        return;
    }};
    let (status, _) = common::send(&app, "POST", "/{route}", Some(json!({{}})), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}}
"#
            )
        } else {
            String::new()
        };

        format!(
            r#"mod common;

use axum::http::StatusCode;
{json_import}
#[tokio::test]
async fn {stem}_crud() {{
    let Some(app) = common::app().await else {{
        eprintln!("TEST_DATABASE_URL is not set; skipping");
        return;
    }};
    let token = common::token(&app).await;
    let token = token.as_deref();

    let created = common::create_{stem}(&app, token).await;
    let id = common::key(&created, "{key}");

    let (status, body) = common::send(&app, "GET", &format!("/{route}/{{id}}"), None, None).await;
    assert_eq!(status, StatusCode::OK, "{{body}}");
    assert_eq!(body["{key}"], created["{key}"]);

    let (status, body) = common::send(&app, "GET", "/{route}?limit=5", None, None).await;
    assert_eq!(status, StatusCode::OK, "{{body}}");
    assert!(body.as_array().is_some_and(|rows| rows.len() <= 5));
{update_block}
    let (status, _) = common::send(&app, "DELETE", &format!("/{route}/{{id}}"), None, token).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = common::send(&app, "GET", &format!("/{route}/{{id}}"), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}}

#[tokio::test]
async fn {stem}_missing_is_not_found() {{
    let Some(app) = common::app().await else {{
        return;
    }};
    let (status, _) = common::send(&app, "GET", "/{route}/{missing}", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}}
{auth_test}"#,
            json_import = if needs_json { "use serde_json::json;\n" } else { "" },
            missing = missing_key_literal(self.key),
        )
    }
}
