//! Snapshot tests for Python code generation.
//!
//! Small files are pinned with inline snapshots; larger ones are checked for
//! the lines that matter. Run `cargo insta review` after intentional changes.

use crudforge_codegen::{
    CompilationContext, Pipeline,
    testing::{
        BLOG_SQL, PRODUCT_SQL, SHOP_OPENAPI, all_features, compile_openapi, compile_sql,
        compile_sql_with, generate_to_temp,
    },
};
use crudforge_codegen_python::{Generator, LanguageCodegen};
use crudforge_ir::{DatabaseKind, Features};
use crudforge_schema::{ProjectConfig, Target, parse_sql};

/// Generate code and return files sorted by path for deterministic snapshots.
fn generate_files(ctx: CompilationContext) -> Vec<(String, String)> {
    let generator = Generator::from_context(ctx).expect("pipeline produced no model");
    let mut files: Vec<(String, String)> = generator
        .preview()
        .into_iter()
        .map(|f| (f.path, f.content))
        .collect();
    files.sort_by(|a, b| a.0.cmp(&b.0));
    files
}

fn get_file<'a>(files: &'a [(String, String)], path: &str) -> &'a str {
    files
        .iter()
        .find(|(p, _)| p == path)
        .map(|(_, c)| c.as_str())
        .unwrap_or_else(|| panic!("{path} not generated"))
}

fn blog(features: Features) -> Vec<(String, String)> {
    generate_files(compile_sql_with(BLOG_SQL, Target::PythonFastapi, features).unwrap())
}

fn compile_for(sql: &str, database: DatabaseKind) -> CompilationContext {
    let mut config = ProjectConfig::new("shop", "schema.sql", Target::PythonFastapi);
    config.generate.database = database;
    let schema = parse_sql(sql, "schema.sql").unwrap();
    Pipeline::for_target(Target::PythonFastapi)
        .run(config, schema)
        .unwrap()
}

#[test]
fn test_pagination_module() {
    let files = blog(Features::default());
    insta::assert_snapshot!(get_file(&files, "app/pagination.py"), @r#"
    # Code generated by crudforge. DO NOT EDIT.

    """Limit/offset query parameters shared by list routes."""

    from dataclasses import dataclass
    from typing import Annotated

    from fastapi import Depends, Query


    DEFAULT_LIMIT = 20
    MAX_LIMIT = 100


    @dataclass(frozen=True)
    class Page:
        limit: int
        offset: int


    def pagination(
        limit: Annotated[int, Query(ge=1)] = DEFAULT_LIMIT,
        offset: Annotated[int, Query(ge=0)] = 0,
    ) -> Page:
        return Page(limit=min(limit, MAX_LIMIT), offset=offset)


    Paging = Annotated[Page, Depends(pagination)]
    "#);
}

#[test]
fn test_post_layers() {
    let files = blog(Features::default());

    let model = get_file(&files, "app/models/post.py");
    assert!(model.starts_with("# Code generated by crudforge. DO NOT EDIT.\n\n"));
    assert!(model.contains("class Post(Base):\n    __tablename__ = \"posts\"\n"));

    let schema = get_file(&files, "app/schemas/post.py");
    assert!(schema.contains("class PostCreate(BaseModel):"));
    assert!(schema.contains("class PostUpdate(BaseModel):"));
    assert!(schema.contains("class PostResponse(BaseModel):"));

    let repo = get_file(&files, "app/repositories/post.py");
    assert!(repo.contains("class PostRepository:"));

    let router = get_file(&files, "app/routers/post.py");
    assert!(router.contains("router = APIRouter(prefix=\"/posts\", tags=[\"posts\"])"));

    let service = get_file(&files, "app/services/post.py");
    assert!(service.starts_with("# crudforge:stub"));
}

#[test]
fn test_auth_protects_writes() {
    let files = blog(all_features());

    let main = get_file(&files, "app/main.py");
    assert!(main.contains("app.include_router(auth.router)"));
    assert!(main.contains("app.include_router(uploads.router)"));
    assert!(main.contains("RateLimitMiddleware"));

    let router = get_file(&files, "app/routers/post.py");
    assert!(router.contains("WRITE = [Depends(require_user)]"));

    let service = get_file(&files, "app/services/user.py");
    assert!(service.contains("hash_password"));

    let pyproject = get_file(&files, "pyproject.toml");
    for dep in ["python-jose[cryptography]", "bcrypt", "python-multipart"] {
        assert!(pyproject.contains(dep), "missing {dep}");
    }

    let env = get_file(&files, ".env.example");
    assert!(env.contains("JWT_SECRET="));
    assert!(env.contains("UPLOAD_DIR="));

    let test = get_file(&files, "tests/test_post.py");
    assert!(test.contains("def test_post_writes_require_token(client: TestClient) -> None:"));
}

#[test]
fn test_database_drivers() {
    let files = generate_files(compile_for(PRODUCT_SQL, DatabaseKind::Mysql));
    assert!(get_file(&files, "pyproject.toml").contains("pymysql"));
    assert!(get_file(&files, "app/database.py").contains("mysql+pymysql://"));

    let files = generate_files(compile_for(PRODUCT_SQL, DatabaseKind::Sqlite));
    assert!(!get_file(&files, "pyproject.toml").contains("psycopg"));
    assert!(get_file(&files, ".gitignore").contains("*.db\n"));
}

#[test]
fn test_uuid_keys() {
    let files = generate_files(compile_sql(PRODUCT_SQL, Target::PythonFastapi).unwrap());
    let router = get_file(&files, "app/routers/product.py");
    assert!(router.contains("def get_product(id: uuid.UUID, service: Service) -> ProductResponse:"));
}

#[test]
fn test_openapi_schema() {
    let files = generate_files(compile_openapi(SHOP_OPENAPI, Target::PythonFastapi).unwrap());
    assert!(files.iter().any(|(p, _)| p == "app/models/customer.py"));
    assert!(files.iter().any(|(p, _)| p == "app/routers/product.py"));
}

#[test]
fn test_generate_then_clean_removes_orphans() {
    let ctx = compile_sql(BLOG_SQL, Target::PythonFastapi).unwrap();
    let generator = Generator::from_context(ctx).unwrap();
    let temp = generate_to_temp(|dir| generator.generate(dir).map(|_| ())).unwrap();
    assert!(temp.path().join("app/routers/tag.py").exists());

    let smaller = BLOG_SQL.replace(
        "CREATE TABLE post_tags (\n    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,\n    tag_id INT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,\n    PRIMARY KEY (post_id, tag_id)\n);",
        "",
    );
    let smaller = smaller.replace(
        "CREATE TABLE tags (\n    id SERIAL PRIMARY KEY,\n    name VARCHAR(50) NOT NULL UNIQUE\n);",
        "",
    );
    let ctx = compile_sql(&smaller, Target::PythonFastapi).unwrap();
    let generator = Generator::from_context(ctx).unwrap();

    let result = generator.clean(temp.path()).unwrap();
    assert!(result.deleted.iter().any(|p| p == "app/routers/tag.py"));
    assert!(result.deleted.iter().any(|p| p == "app/services/tag.py"));
    assert!(result.deleted.iter().any(|p| p == "app/models/junctions.py"));
    assert!(!result.deleted.iter().any(|p| p == "app/routers/__init__.py"));
    assert!(temp.path().join("app/models/post.py").exists());
}
