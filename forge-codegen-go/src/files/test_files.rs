use std::path::{Path, PathBuf};

use crudforge_codegen::{
    GO_NAMING,
    generation::samples::{SampleSource, missing_key_literal, sample_plan, update_sample},
};
use crudforge_core::{FileRules, GeneratedFile, to_pascal_case};
use crudforge_ir::{ColumnType, Entity, Field};
use serde_json::Value;

use crate::{go_file::quote, project::GoProject};

/// Names the factories already use for their parameters.
const TAKEN: &[&str] = &["t", "h", "token", "rec", "body"];

/// Go literal for a JSON sample inside a `map[string]any`.
fn go_literal(value: &Value) -> String {
    match value {
        Value::Null => "nil".into(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote(s),
        Value::Array(items) => format!(
            "[]any{{{}}}",
            items.iter().map(go_literal).collect::<Vec<_>>().join(", ")
        ),
        Value::Object(map) => format!(
            "map[string]any{{{}}}",
            map.iter()
                .map(|(k, v)| format!("{}: {}", quote(k), go_literal(v)))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// How a row's value prints through `fmt.Sprint` after a UseNumber decode.
fn printed(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn factory_name(entity: &Entity) -> String {
    format!("create{}", entity.name)
}

/// `tests/helpers_test.go`: server bootstrap, request helper and row factories.
pub struct TestHelpersGo<'a> {
    project: GoProject<'a>,
}

impl<'a> TestHelpersGo<'a> {
    pub fn new(project: GoProject<'a>) -> Self {
        Self { project }
    }

    fn unique_expr(field: &Field) -> String {
        let max = field.ty.max_length().map(|n| n as usize);
        match &field.ty {
            ColumnType::Uuid => "uniqueUUID()".to_string(),
            ty if ty.is_integer() => "uniqueNumber()".to_string(),
            _ if field.name.to_ascii_lowercase().contains("email") => format!(
                "unique(\"user\", {}) + \"@example.com\"",
                max.map(|n| n.saturating_sub(12).clamp(1, 32)).unwrap_or(32)
            ),
            _ => {
                let prefix: String = field.name.chars().take(4).collect();
                format!("unique({}, {})", quote(&prefix), max.unwrap_or(32).min(32))
            }
        }
    }

    fn binding(name: &str) -> String {
        let var = GO_NAMING.field_name(name);
        if TAKEN.contains(&var.as_str()) {
            format!("{var}Row")
        } else {
            var
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
                    let var = Self::binding(binding);
                    setup.push_str(&format!(
                        "\t{var} := {}(t, h, token)\n",
                        factory_name(parent)
                    ));
                    format!("{var}[{}]", quote(column))
                }
                SampleSource::Unique => Self::unique_expr(field),
                // []byte travels as base64
                SampleSource::Literal(_) if field.ty == ColumnType::Binary => quote("AQID"),
                SampleSource::Literal(value) => go_literal(value),
            };
            fields.push(format!("\t\t{}: {},", quote(&field.name), value));
        }
        let body = if fields.is_empty() {
            "map[string]any{}".to_string()
        } else {
            format!("map[string]any{{\n{}\n\t}}", fields.join("\n"))
        };
        format!(
            r#"func {name}(t *testing.T, h http.Handler, token string) map[string]any {{
	t.Helper()
{setup}	rec := send(t, h, http.MethodPost, "/{route}", {body}, token)
	expect(t, rec, http.StatusCreated)
	return decode[map[string]any](t, rec)
}}"#,
            name = factory_name(entity),
            route = entity.route(),
        )
    }

    fn token_fn(&self) -> &'static str {
        if self.project.features().auth {
            r#"// authToken registers a fresh user and returns its bearer token.
func authToken(t *testing.T, h http.Handler) string {
	t.Helper()
	email := unique("user", 32) + "@example.com"
	rec := send(t, h, http.MethodPost, "/auth/register", map[string]any{"email": email, "password": "password123"}, "")
	expect(t, rec, http.StatusCreated)
	body := decode[map[string]any](t, rec)
	return fmt.Sprint(body["access_token"])
}"#
        } else {
            "// authToken is empty: writes are open.\nfunc authToken(t *testing.T, _ http.Handler) string {\n\tt.Helper()\n\treturn \"\"\n}"
        }
    }

    fn config(&self) -> String {
        let features = self.project.features();
        let mut fields = vec![("Addr", "\":0\""), ("DatabaseURL", "url")];
        if features.auth {
            fields.push(("JWTSecret", "\"test-secret\""));
            fields.push(("JWTTTL", "time.Hour"));
        }
        if features.rate_limit {
            fields.push(("RateLimitCapacity", "1_000_000"));
            fields.push(("RateLimitRefillPerSec", "1_000_000"));
        }
        if features.file_storage {
            fields.push(("UploadDir", "t.TempDir()"));
        }
        let width = fields.iter().map(|(name, _)| name.len() + 1).max().unwrap_or(0);
        fields
            .iter()
            .map(|(name, value)| format!("\t\t{:width$} {value},", format!("{name}:")))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl GeneratedFile for TestHelpersGo<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("tests").join("helpers_test.go")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let project = self.project;
        let factories: Vec<String> = project
            .entities()
            .map(|(entity, _)| self.factory(entity))
            .collect();

        format!(
            r#"package tests

import (
	"bytes"
	"encoding/json"
	"fmt"
	"net/http"
	"net/http/httptest"
	"os"
	"strconv"
	"sync/atomic"
	"testing"
	"time"

	"{config}"
	"{db}"
	"{router}"
)

// newServer wires the API to TEST_DATABASE_URL, skipping the test when it is
// unset.
func newServer(t *testing.T) http.Handler {{
	t.Helper()
	url := os.Getenv("TEST_DATABASE_URL")
	if url == "" {{
		t.Skip("TEST_DATABASE_URL is not set")
	}}
	conn, err := db.Open(url)
	if err != nil {{
		t.Fatalf("connect: %v", err)
	}}
	t.Cleanup(func() {{ conn.Close() }})

	cfg := config.Config{{
{fields}
	}}
	h, err := router.New(cfg, conn)
	if err != nil {{
		t.Fatalf("router: %v", err)
	}}
	return h
}}

func send(t *testing.T, h http.Handler, method, path string, body any, token string) *httptest.ResponseRecorder {{
	t.Helper()
	var payload bytes.Buffer
	if body != nil {{
		if err := json.NewEncoder(&payload).Encode(body); err != nil {{
			t.Fatalf("encode body: %v", err)
		}}
	}}
	req := httptest.NewRequest(method, path, &payload)
	req.Header.Set("Content-Type", "application/json")
	if token != "" {{
		req.Header.Set("Authorization", "Bearer "+token)
	}}
	rec := httptest.NewRecorder()
	h.ServeHTTP(rec, req)
	return rec
}}

func expect(t *testing.T, rec *httptest.ResponseRecorder, status int) {{
	t.Helper()
	if rec.Code != status {{
		t.Fatalf("status %d, want %d: %s", rec.Code, status, rec.Body.String())
	}}
}}

func decode[T any](t *testing.T, rec *httptest.ResponseRecorder) T {{
	t.Helper()
	var out T
	dec := json.NewDecoder(rec.Body)
	dec.UseNumber()
	if err := dec.Decode(&out); err != nil {{
		t.Fatalf("decode response: %v", err)
	}}
	return out
}}

// key renders a row's key column as a path segment.
func key(row map[string]any, column string) string {{
	return fmt.Sprint(row[column])
}}

var counter atomic.Uint64

func nextSeed() uint64 {{
	return uint64(time.Now().UnixNano()) + counter.Add(1)
}}

// unique returns a value no earlier run produced, at most maxLen bytes.
func unique(prefix string, maxLen int) string {{
	tail := strconv.FormatUint(nextSeed(), 16)
	if len(tail) > maxLen {{
		tail = tail[len(tail)-maxLen:]
	}}
	if len(prefix) > maxLen-len(tail) {{
		prefix = prefix[:maxLen-len(tail)]
	}}
	return prefix + tail
}}

func uniqueNumber() int64 {{
	return int64(nextSeed()%1_000_000_000) + 1
}}

func uniqueUUID() string {{
	return fmt.Sprintf("00000000-0000-4000-8000-%012x", nextSeed()&0xffffffffffff)
}}

{token}

{factories}
"#,
            config = project.internal("config"),
            db = project.internal("db"),
            router = project.internal("router"),
            fields = self.config(),
            token = self.token_fn(),
            factories = factories.join("\n\n"),
        )
    }
}

/// `tests/<entity>_test.go`: CRUD round trip against a live database.
pub struct EntityTestGo<'a> {
    project: GoProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> EntityTestGo<'a> {
    pub fn new(project: GoProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }
}

impl GeneratedFile for EntityTestGo<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("tests")
            .join(format!("{}_test.go", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let name = to_pascal_case(&self.entity.name);
        let route = self.entity.route();
        let key = quote(&self.key.name);

        let update = update_sample(self.entity);
        let update_block = match &update {
            Some((field, value)) => format!(
                r#"
	rec = send(t, h, http.MethodPut, "/{route}/"+id, map[string]any{{{column}: {literal}}}, token)
	expect(t, rec, http.StatusOK)
	if got := fmt.Sprint(decode[map[string]any](t, rec)[{column}]); got != {want} {{
		t.Fatalf("{field} = %s after update", got)
	}}
"#,
                column = quote(&field.name),
                literal = go_literal(value),
                want = quote(&printed(value)),
                field = field.name,
            ),
            None => String::new(),
        };

        let auth_test = if self.project.features().auth {
            format!(
                r#"
func Test{name}WritesRequireToken(t *testing.T) {{
	h := newServer(t)
	rec := send(t, h, http.MethodPost, "/{route}", map[string]any{{}}, "")
	expect(t, rec, http.StatusUnauthorized)
}}
"#
            )
        } else {
            String::new()
        };

        format!(
            r#"package tests

import (
{fmt}	"net/http"
	"testing"
)

func Test{name}CRUD(t *testing.T) {{
	h := newServer(t)
	token := authToken(t, h)

	created := {factory}(t, h, token)
	id := key(created, {key})

	rec := send(t, h, http.MethodGet, "/{route}/"+id, nil, "")
	expect(t, rec, http.StatusOK)
	if got := key(decode[map[string]any](t, rec), {key}); got != id {{
		t.Fatalf("fetched %s, want %s", got, id)
	}}

	rec = send(t, h, http.MethodGet, "/{route}?limit=5", nil, "")
	expect(t, rec, http.StatusOK)
	if rows := decode[[]map[string]any](t, rec); len(rows) > 5 {{
		t.Fatalf("limit=5 returned %d rows", len(rows))
	}}
{update_block}
	rec = send(t, h, http.MethodDelete, "/{route}/"+id, nil, token)
	expect(t, rec, http.StatusNoContent)

	rec = send(t, h, http.MethodGet, "/{route}/"+id, nil, "")
	expect(t, rec, http.StatusNotFound)
}}

func Test{name}MissingIsNotFound(t *testing.T) {{
	h := newServer(t)
	rec := send(t, h, http.MethodGet, "/{route}/{missing}", nil, "")
	expect(t, rec, http.StatusNotFound)
}}
{auth_test}"#,
            fmt = if update.is_some() { "\t\"fmt\"\n" } else { "" },
            factory = factory_name(self.entity),
            missing = missing_key_literal(self.key),
        )
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, all_features, compile_sql, compile_sql_with};
    use crudforge_schema::Target;
    use serde_json::json;

    use super::*;
    use crate::project::Flavor;

    #[test]
    fn test_go_literals() {
        assert_eq!(go_literal(&json!("a")), "\"a\"");
        assert_eq!(go_literal(&json!([1, 2])), "[]any{1, 2}");
        assert_eq!(go_literal(&json!({"key": "value"})), "map[string]any{\"key\": \"value\"}");
    }

    #[test]
    fn test_factories_create_parents_first() {
        let ctx = compile_sql_with(BLOG_SQL, Target::GoGin, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = TestHelpersGo::new(GoProject::new(&model, &computed, Flavor::Gin)).render();

        assert!(out.contains("\tauthor := createUser(t, h, token)\n"));
        assert!(out.contains("\t\t\"author_id\": author[\"id\"],\n"));
        assert!(out.contains("\t\t\"email\": unique(\"user\", 32) + \"@example.com\",\n"));
        assert!(out.contains("\t\tJWTSecret:             \"test-secret\",\n"));
        assert!(out.contains("func authToken(t *testing.T, h http.Handler) string {"));
    }

    #[test]
    fn test_entity_test_round_trip() {
        let ctx = compile_sql(BLOG_SQL, Target::GoChi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Chi);
        let post = model.entity("Post").unwrap();
        let out = EntityTestGo::new(project, post, post.id_field().unwrap()).render();

        assert!(out.contains("func TestPostCRUD(t *testing.T) {"));
        assert!(out.contains("map[string]any{\"title\": \"updated\"}"));
        assert!(out.contains("\"/posts/2147483000\""));
        assert!(!out.contains("WritesRequireToken"));
    }

    #[test]
    fn test_uuid_key_uses_missing_uuid() {
        let ctx = compile_sql(PRODUCT_SQL, Target::GoGin).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = GoProject::new(&model, &computed, Flavor::Gin);
        let product = model.entity("Product").unwrap();
        let out = EntityTestGo::new(project, product, product.id_field().unwrap()).render();
        assert!(out.contains("\"/products/00000000-0000-4000-8000-00000000ffff\""));

        let helpers = TestHelpersGo::new(project).render();
        assert!(helpers.contains("\t\t\"sku\": unique(\"sku\", 12),\n"));
    }
}
