use std::path::{Path, PathBuf};

use crudforge_codegen::{
    PYTHON_NAMING,
    generation::samples::{SampleSource, missing_key_literal, sample_plan, update_sample},
};
use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::{ColumnType, Entity, Field};

use crate::{
    project::PyProject,
    py_file::{PyFile, py_literal, quote},
};

/// Names the factories already use.
const TAKEN: &[&str] = &["client", "token", "response", "payload"];

fn factory_name(project: &PyProject<'_>, entity: &Entity) -> String {
    format!("create_{}", project.var(entity))
}

/// `tests/conftest.py`: the app under test and a bearer token.
pub struct ConftestPy<'a> {
    project: PyProject<'a>,
}

impl<'a> ConftestPy<'a> {
    pub fn new(project: PyProject<'a>) -> Self {
        Self { project }
    }

    fn settings(&self) -> String {
        let features = self.project.features();
        let mut args = vec!["database_url=url".to_string()];
        if features.auth {
            args.push("jwt_secret=\"test-secret\"".into());
        }
        if features.rate_limit {
            args.push("rate_limit_capacity=1_000_000".into());
            args.push("rate_limit_refill_per_sec=1_000_000.0".into());
        }
        if features.file_storage {
            args.push("upload_dir=str(tmp_path_factory.mktemp(\"uploads\"))".into());
        }
        args.iter().map(|a| format!("        {a},\n")).collect()
    }
}

impl GeneratedFile for ConftestPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("tests").join("conftest.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        PyFile::new()
            .doc("Fixtures for the API tests. They need TEST_DATABASE_URL.")
            .import_module("os")
            .import("collections.abc", "Iterator")
            .import_module("pytest")
            .import("fastapi.testclient", "TestClient")
            .import("app.config", "Settings")
            .import("app.database", "Base")
            .import("app.main", "create_app")
            .import("tests.helpers", "auth_token")
            .raw(format!(
                r#"@pytest.fixture(scope="session")
def client(tmp_path_factory: pytest.TempPathFactory) -> Iterator[TestClient]:
    url = os.environ.get("TEST_DATABASE_URL")
    if not url:
        pytest.skip("TEST_DATABASE_URL is not set")
    settings = Settings(
{settings}    )
    app = create_app(settings)
    Base.metadata.create_all(app.state.engine)
    with TestClient(app) as client:
        yield client
    app.state.engine.dispose()"#,
                settings = self.settings(),
            ))
            .raw(
                r#"@pytest.fixture
def token(client: TestClient) -> str:
    return auth_token(client)"#,
            )
            .render()
    }
}

/// `tests/helpers.py`: unique values, auth headers and row factories.
pub struct HelpersPy<'a> {
    project: PyProject<'a>,
}

impl<'a> HelpersPy<'a> {
    pub fn new(project: PyProject<'a>) -> Self {
        Self { project }
    }

    fn unique_expr(field: &Field) -> String {
        let max = field.ty.max_length().map(|n| n as usize);
        match &field.ty {
            ColumnType::Uuid => "unique_uuid()".to_string(),
            ty if ty.is_integer() => "unique_number()".to_string(),
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
        let var = PYTHON_NAMING.safe_name(name);
        if TAKEN.contains(&var.as_str()) {
            format!("{var}_row")
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
                        "    {var} = {}(client, token)\n",
                        factory_name(&self.project, parent)
                    ));
                    format!("{var}[{}]", quote(column))
                }
                SampleSource::Unique => Self::unique_expr(field),
                // bytes travel as base64
                SampleSource::Literal(_) if field.ty == ColumnType::Binary => quote("AQID"),
                SampleSource::Literal(value) => py_literal(value),
            };
            fields.push(format!("        {}: {},", quote(&field.name), value));
        }
        let payload = if fields.is_empty() {
            "{}".to_string()
        } else {
            format!("{{\n{}\n    }}", fields.join("\n"))
        };
        format!(
            r#"def {name}(client: TestClient, token: str) -> dict[str, Any]:
{setup}    payload = {payload}
    response = client.post("/{route}", json=payload, headers=auth_headers(token))
    assert response.status_code == 201, response.text
    return response.json()"#,
            name = factory_name(&self.project, entity),
            route = entity.route(),
        )
    }

    fn token_fn(&self) -> &'static str {
        if self.project.features().auth {
            r#"def auth_token(client: TestClient) -> str:
    """Register a fresh user and return its bearer token."""
    email = unique("user", 32) + "@example.com"
    response = client.post("/auth/register", json={"email": email, "password": "password123"})
    assert response.status_code == 201, response.text
    return response.json()["access_token"]"#
        } else {
            "def auth_token(client: TestClient) -> str:\n    \"\"\"Writes are open, so there is no token.\"\"\"\n    return \"\""
        }
    }
}

impl GeneratedFile for HelpersPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("tests").join("helpers.py")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let file = PyFile::new()
            .doc("Request helpers and factories creating one row per call.")
            .import_module("itertools")
            .import_module("time")
            .import("typing", "Any")
            .import("fastapi.testclient", "TestClient")
            .raw("_counter = itertools.count()")
            .raw("def _seed() -> int:\n    return time.time_ns() + next(_counter)")
            .raw(
                r#"def unique(prefix: str, max_len: int) -> str:
    """A value no earlier run produced, at most max_len characters."""
    tail = format(_seed(), "x")[-max_len:]
    return prefix[: max_len - len(tail)] + tail"#,
            )
            .raw("def unique_number() -> int:\n    return _seed() % 1_000_000_000 + 1")
            .raw("def unique_uuid() -> str:\n    return f\"00000000-0000-4000-8000-{_seed() & 0xFFFFFFFFFFFF:012x}\"")
            .raw(
                r#"def auth_headers(token: str) -> dict[str, str]:
    return {"Authorization": f"Bearer {token}"} if token else {}"#,
            )
            .raw(self.token_fn());
        self.project
            .entities()
            .map(|(entity, _)| self.factory(entity))
            .fold(file, |file, factory| file.raw(factory))
            .render()
    }
}

/// `tests/test_<entity>.py`: CRUD round trip against a live database.
pub struct EntityTestPy<'a> {
    project: PyProject<'a>,
    entity: &'a Entity,
    key: &'a Field,
}

impl<'a> EntityTestPy<'a> {
    pub fn new(project: PyProject<'a>, entity: &'a Entity, key: &'a Field) -> Self {
        Self {
            project,
            entity,
            key,
        }
    }
}

impl GeneratedFile for EntityTestPy<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("tests")
            .join(format!("test_{}.py", self.entity.file_stem()))
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("#")
    }

    fn render(&self) -> String {
        let stem = self.entity.file_stem();
        let route = self.entity.route();
        let key = quote(&self.key.name);
        let factory = factory_name(&self.project, self.entity);

        let update = match update_sample(self.entity) {
            Some((field, value)) => format!(
                r#"
    response = client.put(f"/{route}/{{key}}", json={{{column}: {literal}}}, headers=headers)
    assert response.status_code == 200, response.text
    assert response.json()[{column}] == {literal}
"#,
                column = quote(&field.name),
                literal = py_literal(&value),
            ),
            None => String::new(),
        };

        let mut file = PyFile::new()
            .doc(format!("API tests for {}.", self.entity.plural.replace('_', " ")))
            .import("fastapi.testclient", "TestClient")
            .import_all("tests.helpers", ["auth_headers", factory.as_str()])
            .raw(format!(
                r#"def test_{stem}_crud(client: TestClient, token: str) -> None:
    headers = auth_headers(token)
    created = {factory}(client, token)
    key = created[{key}]

    response = client.get(f"/{route}/{{key}}")
    assert response.status_code == 200, response.text
    assert response.json()[{key}] == key

    response = client.get("/{route}", params={{"limit": 5}})
    assert response.status_code == 200, response.text
    assert len(response.json()) <= 5
{update}
    response = client.delete(f"/{route}/{{key}}", headers=headers)
    assert response.status_code == 204, response.text

    response = client.get(f"/{route}/{{key}}")
    assert response.status_code == 404"#
            ))
            .raw(format!(
                r#"def test_missing_{stem}_is_not_found(client: TestClient) -> None:
    response = client.get("/{route}/{missing}")
    assert response.status_code == 404"#,
                missing = missing_key_literal(self.key),
            ));
        if self.project.features().auth {
            file = file.raw(format!(
                r#"def test_{stem}_writes_require_token(client: TestClient) -> None:
    response = client.post("/{route}", json={{}})
    assert response.status_code == 401"#
            ));
        }
        file.render()
    }
}

#[cfg(test)]
mod tests {
    use crudforge_codegen::testing::{BLOG_SQL, PRODUCT_SQL, all_features, compile_sql, compile_sql_with};
    use crudforge_schema::Target;

    use super::*;

    #[test]
    fn test_factories_create_parents_first() {
        let ctx = compile_sql_with(BLOG_SQL, Target::PythonFastapi, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = HelpersPy::new(PyProject::new(&model, &computed)).render();

        assert!(out.contains("def create_post(client: TestClient, token: str) -> dict[str, Any]:\n    author = create_user(client, token)\n"));
        assert!(out.contains("        \"author_id\": author[\"id\"],\n"));
        assert!(out.contains("        \"email\": unique(\"user\", 32) + \"@example.com\",\n"));
        assert!(out.contains("    response = client.post(\"/auth/register\""));
    }

    #[test]
    fn test_conftest_settings_follow_features() {
        let ctx = compile_sql_with(BLOG_SQL, Target::PythonFastapi, all_features()).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let out = ConftestPy::new(PyProject::new(&model, &computed)).render();
        assert!(out.contains("        jwt_secret=\"test-secret\",\n"));
        assert!(out.contains("        pytest.skip(\"TEST_DATABASE_URL is not set\")\n"));
        assert!(out.contains("    Base.metadata.create_all(app.state.engine)\n"));
    }

    #[test]
    fn test_entity_test_round_trip() {
        let ctx = compile_sql(BLOG_SQL, Target::PythonFastapi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let post = model.entity("Post").unwrap();
        let out = EntityTestPy::new(PyProject::new(&model, &computed), post, post.id_field().unwrap())
            .render();

        assert!(out.contains("from tests.helpers import auth_headers, create_post\n"));
        assert!(out.contains("def test_post_crud(client: TestClient, token: str) -> None:\n"));
        assert!(out.contains("json={\"title\": \"updated\"}"));
        assert!(out.contains("    response = client.get(\"/posts/2147483000\")\n"));
        assert!(!out.contains("writes_require_token"));
    }

    #[test]
    fn test_uuid_keys_and_char_columns() {
        let ctx = compile_sql(PRODUCT_SQL, Target::PythonFastapi).unwrap();
        let (_, model, computed) = ctx.into_parts().unwrap();
        let project = PyProject::new(&model, &computed);
        let product = model.entity("Product").unwrap();
        let out = EntityTestPy::new(project, product, product.id_field().unwrap()).render();
        assert!(out.contains("\"/products/00000000-0000-4000-8000-00000000ffff\""));

        let helpers = HelpersPy::new(project).render();
        assert!(helpers.contains("        \"sku\": unique(\"sku\", 12),\n"));
    }
}
