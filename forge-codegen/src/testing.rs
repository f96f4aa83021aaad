//! Test utilities for code generators.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::path::Path;

use crudforge_ir::Features;
use crudforge_schema::{ProjectConfig, Target, parse_openapi, parse_sql};
use eyre::Result;

use crate::pipeline::{CompilationContext, Pipeline};

/// Blog schema: users with credentials, posts with two user references,
/// comments, and a tag junction.
pub const BLOG_SQL: &str = r#"
CREATE TABLE users (
    id BIGSERIAL PRIMARY KEY,
    email VARCHAR(255) NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    display_name VARCHAR(100),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE posts (
    id BIGSERIAL PRIMARY KEY,
    author_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title VARCHAR(200) NOT NULL,
    body TEXT NOT NULL,
    published BOOLEAN NOT NULL DEFAULT false,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE TABLE comments (
    id BIGSERIAL PRIMARY KEY,
    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    user_id BIGINT NOT NULL REFERENCES users(id),
    body TEXT NOT NULL
);

CREATE TABLE tags (
    id SERIAL PRIMARY KEY,
    name VARCHAR(50) NOT NULL UNIQUE
);

CREATE TABLE post_tags (
    post_id BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
    tag_id INT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (post_id, tag_id)
);
"#;

/// Single table keyed by a UUID, with decimal and JSON columns.
pub const PRODUCT_SQL: &str = r#"
CREATE TABLE products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    sku CHAR(12) NOT NULL UNIQUE,
    price NUMERIC(10, 2) NOT NULL,
    attributes JSONB,
    released_on DATE
);
"#;

/// OpenAPI document whose `Order.products` array synthesizes a junction.
pub const SHOP_OPENAPI: &str = r##"
openapi: 3.0.3
info:
  title: Shop
  version: 1.0.0
paths: {}
components:
  schemas:
    Customer:
      type: object
      required: [id, email]
      properties:
        id:
          type: integer
          format: int64
          readOnly: true
        email:
          type: string
          maxLength: 255
    Product:
      type: object
      required: [id, name]
      properties:
        id:
          type: integer
          format: int64
          readOnly: true
        name:
          type: string
    Order:
      type: object
      required: [id, customer]
      properties:
        id:
          type: integer
          format: int64
          readOnly: true
        customer:
          $ref: '#/components/schemas/Customer'
        products:
          type: array
          items:
            $ref: '#/components/schemas/Product'
"##;

fn config(target: Target, features: Features) -> ProjectConfig {
    let mut config = ProjectConfig::new("blog", "schema.sql", target);
    config.features = features;
    config
}

/// Run the full pipeline over SQL with default features.
pub fn compile_sql(sql: &str, target: Target) -> Result<CompilationContext> {
    compile_sql_with(sql, target, Features::default())
}

/// Run the full pipeline over SQL with the given feature flags.
pub fn compile_sql_with(sql: &str, target: Target, features: Features) -> Result<CompilationContext> {
    let schema = parse_sql(sql, "schema.sql")?;
    Pipeline::for_target(target).run(config(target, features), schema)
}

/// Run the full pipeline over an OpenAPI document.
pub fn compile_openapi(document: &str, target: Target) -> Result<CompilationContext> {
    let schema = parse_openapi(document, "openapi.yaml")?;
    Pipeline::for_target(target).run(config(target, Features::default()), schema)
}

/// Every optional feature switched on.
pub fn all_features() -> Features {
    Features {
        auth: true,
        rate_limit: true,
        file_storage: true,
        tests: true,
    }
}

/// Generate into a temporary directory that is removed on drop.
pub fn generate_to_temp<F>(generate: F) -> Result<tempfile::TempDir>
where
    F: FnOnce(&Path) -> Result<()>,
{
    let temp_dir = tempfile::TempDir::new()?;
    generate(temp_dir.path())?;
    Ok(temp_dir)
}
