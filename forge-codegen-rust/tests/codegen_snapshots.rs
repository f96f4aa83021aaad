//! Snapshot tests for Rust code generation.
//!
//! Small files are pinned with inline snapshots; larger ones are checked for
//! the lines that matter. Run `cargo insta review` after intentional changes.

use crudforge_codegen::{
    CompilationContext, Pipeline,
    testing::{BLOG_SQL, PRODUCT_SQL, all_features, compile_sql, compile_sql_with, generate_to_temp},
};
use crudforge_codegen_rust::{Generator, LanguageCodegen};
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
    generate_files(compile_sql_with(BLOG_SQL, Target::RustAxum, features).unwrap())
}

fn compile_for(sql: &str, database: DatabaseKind) -> CompilationContext {
    let mut config = ProjectConfig::new("shop", "schema.sql", Target::RustAxum);
    config.generate.database = database;
    let schema = parse_sql(sql, "schema.sql").unwrap();
    Pipeline::for_target(Target::RustAxum).run(config, schema).unwrap()
}

#[test]
fn test_models_mod() {
    let files = blog(Features::default());
    insta::assert_snapshot!(get_file(&files, "src/models/mod.rs"), @r"
    // Code generated by crudforge. DO NOT EDIT.

    pub mod comment;
    pub mod post;
    pub mod tag;
    pub mod user;
    ");
}

#[test]
fn test_db_rs_postgres() {
    let files = blog(Features::default());
    insta::assert_snapshot!(get_file(&files, "src/db.rs"), @r"
    // Code generated by crudforge. DO NOT EDIT.

    use sqlx::postgres::{PgPool, PgPoolOptions};

    pub type DbPool = PgPool;

    pub async fn connect(url: &str) -> Result<DbPool, sqlx::Error> {
        PgPoolOptions::new().max_connections(10).connect(url).await
    }
    ");
}

#[test]
fn test_user_model_hides_password() {
    let files = blog(Features::default());
    let model = get_file(&files, "src/models/user.rs");

    assert!(model.contains("pub struct User {"));
    assert!(model.contains("#[serde(skip_serializing)]\n    pub password_hash: String,"));
    assert!(model.contains("pub struct CreateUser {"));
    assert!(model.contains("pub display_name: Option<String>,"));
    assert!(model.contains("pub struct UserResponse {"));
    assert!(model.contains("impl From<User> for UserResponse"));

    let response = model
        .split("pub struct UserResponse {")
        .nth(1)
        .and_then(|rest| rest.split('}').next())
        .unwrap();
    assert!(!response.contains("password_hash"));
}

#[test]
fn test_post_repository_postgres() {
    let files = blog(Features::default());
    let repo = get_file(&files, "src/repositories/post.rs");

    assert!(repo.contains("pub async fn list(db: &DbPool, limit: i64, offset: i64)"));
    assert!(repo.contains("pub async fn get(db: &DbPool, id: i64)"));
    assert!(repo.contains("RETURNING"));
    assert!(repo.contains("COALESCE($"));
    assert!(repo.contains("pub async fn get_author("));
    assert!(repo.contains("pub async fn list_comments("));
    assert!(repo.contains("pub async fn list_tags("));
    assert!(repo.contains("pub async fn add_tag("));
    assert!(repo.contains("pub async fn remove_tag("));
    assert!(repo.contains("INSERT INTO post_tags"));
    assert!(!repo.contains("last_insert_id"));
}

#[test]
fn test_mysql_reads_back_inserted_rows() {
    let files = generate_files(compile_for(BLOG_SQL, DatabaseKind::Mysql));
    let repo = get_file(&files, "src/repositories/post.rs");

    assert!(!repo.contains("RETURNING"));
    assert!(repo.contains("result.last_insert_id() as i64"));
    assert!(repo.contains("WHERE id = ?"));
    assert!(get_file(&files, "src/db.rs").contains("MySqlPoolOptions"));
}

#[test]
fn test_mysql_uuid_key_generated_client_side() {
    let files = generate_files(compile_for(PRODUCT_SQL, DatabaseKind::Mysql));
    let repo = get_file(&files, "src/repositories/product.rs");
    assert!(repo.contains("let id = uuid::Uuid::new_v4();"));

    let cargo = get_file(&files, "Cargo.toml");
    assert!(cargo.contains("uuid = { version = \"1\", features = [\"serde\", \"v4\"] }"));
    assert!(cargo.contains("rust_decimal"));
}

#[test]
fn test_post_handler_routes() {
    let files = blog(Features::default());
    let handler = get_file(&files, "src/handlers/post.rs");

    assert!(handler.contains(".route(\"/\", get(list).post(create))"));
    assert!(handler.contains(".route(\"/:id\", get(show).put(update).delete(destroy))"));
    assert!(handler.contains(".route(\"/:id/tags/:tag_id\", put(add_tag).delete(remove_tag))"));
    assert!(handler.contains("use crate::services::post as service;"));
    assert!(!handler.contains("require_auth"));
}

#[test]
fn test_auth_protects_writes() {
    let files = blog(all_features());
    let handler = get_file(&files, "src/handlers/post.rs");
    assert!(handler.contains("pub fn router(state: AppState) -> Router<AppState>"));
    assert!(handler.contains(".route_layer(middleware::from_fn_with_state(state, require_auth))"));

    let routes = get_file(&files, "src/routes.rs");
    assert!(routes.contains(".nest(\"/posts\", handlers::post::router(state.clone()))"));
    assert!(routes.contains(".nest(\"/auth\", auth::handlers::router())"));
    assert!(routes.contains("rate_limit::limit"));
    // Layers added last wrap the others, so the limiter sees requests first.
    let trace = routes.find("TraceLayer::new_for_http()").unwrap();
    let limiter = routes.find("rate_limit::limit").unwrap();
    assert!(trace < limiter);

    let cargo = get_file(&files, "Cargo.toml");
    for dep in ["argon2", "jsonwebtoken", "http-body-util", "tower"] {
        assert!(cargo.contains(dep), "missing {dep}");
    }

    let env = get_file(&files, ".env.example");
    assert!(env.contains("JWT_SECRET="));
    assert!(env.contains("RATE_LIMIT_CAPACITY=100"));
    assert!(env.contains("UPLOAD_DIR="));
}

#[test]
fn test_service_stub_hashes_password_with_auth() {
    let files = blog(all_features());
    let service = get_file(&files, "src/services/user.rs");
    assert!(service.contains("crudforge:stub"));
    assert!(service.contains("hash_password"));

    let files = blog(Features::default());
    assert!(!get_file(&files, "src/services/user.rs").contains("hash_password"));
}

#[test]
fn test_generated_api_tests() {
    let files = blog(Features::default());
    let common = get_file(&files, "tests/common/mod.rs");
    assert!(common.contains("use blog::{config::Config, db, routes, state::AppState};"));
    assert!(common.contains("pub async fn create_post(app: &Router, token: Option<&str>) -> Value {"));
    assert!(common.contains("let author = create_user(app, token).await;"));
    assert!(common.contains("\"author_id\": author[\"id\"],"));

    let post = get_file(&files, "tests/post_api.rs");
    assert!(post.contains("async fn post_crud()"));
    assert!(post.contains("StatusCode::NOT_FOUND"));
    assert!(post.contains("\"/posts/2147483000\""));
    assert!(!post.contains("writes_require_token"));
}

#[test]
fn test_tests_feature_off() {
    let features = Features {
        tests: false,
        ..Features::default()
    };
    let files = blog(features);
    assert!(!files.iter().any(|(p, _)| p.starts_with("tests/")));
    assert!(!get_file(&files, "Cargo.toml").contains("[dev-dependencies]"));
}

#[test]
fn test_generate_then_clean_removes_orphans() {
    let ctx = compile_sql(BLOG_SQL, Target::RustAxum).unwrap();
    let generator = Generator::from_context(ctx).unwrap();
    let temp = generate_to_temp(|dir| generator.generate(dir).map(|_| ())).unwrap();
    assert!(temp.path().join("src/handlers/tag.rs").exists());

    let smaller = BLOG_SQL.replace(
        "CREATE TABLE post_tags (\n    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,\n    tag_id INT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,\n    PRIMARY KEY (post_id, tag_id)\n);",
        "",
    );
    let smaller = smaller.replace(
        "CREATE TABLE tags (\n    id SERIAL PRIMARY KEY,\n    name VARCHAR(50) NOT NULL UNIQUE\n);",
        "",
    );
    let ctx = compile_sql(&smaller, Target::RustAxum).unwrap();
    let generator = Generator::from_context(ctx).unwrap();

    let result = generator.clean(temp.path()).unwrap();
    assert!(result.deleted.iter().any(|p| p == "src/handlers/tag.rs"));
    assert!(result.deleted.iter().any(|p| p == "src/services/tag.rs"));
    assert!(!temp.path().join("src/models/tag.rs").exists());
    assert!(temp.path().join("src/models/post.rs").exists());
}
