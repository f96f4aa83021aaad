use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};

/// `src/storage.rs`: where uploaded files live.
pub struct StorageRs;

impl GeneratedFile for StorageRs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("storage.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"use std::{io, path::PathBuf};

/// Blob storage for uploads. Swap `LocalStorage` for an object store
/// implementation in `AppState::new`.
#[axum::async_trait]
pub trait Storage: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()>;
    async fn get(&self, key: &str) -> io::Result<Vec<u8>>;
    async fn delete(&self, key: &str) -> io::Result<()>;
    /// Public URL of a stored object.
    fn url(&self, key: &str) -> String;
}

/// Files under a directory on local disk.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.root.join(sanitize_key(key))
    }
}

#[axum::async_trait]
impl Storage for LocalStorage {
    async fn put(&self, key: &str, bytes: &[u8]) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        tokio::fs::write(self.path(key), bytes).await
    }

    async fn get(&self, key: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path(key)).await
    }

    async fn delete(&self, key: &str) -> io::Result<()> {
        tokio::fs::remove_file(self.path(key)).await
    }

    fn url(&self, key: &str) -> String {
        format!("/uploads/{}", sanitize_key(key))
    }
}

/// Reduces a client-supplied name to `[A-Za-z0-9._-]` with no leading dots.
pub fn sanitize_key(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_traversal() {
        assert_eq!(sanitize_key("../etc/passwd"), "_etc_passwd");
        assert_eq!(sanitize_key("photo 1.png"), "photo_1.png");
        assert_eq!(sanitize_key(".."), "upload");
    }
}
"#
        .to_string()
    }
}

/// `src/handlers/uploads.rs`: multipart upload, download and delete.
pub struct UploadsRs {
    pub auth: bool,
}

impl GeneratedFile for UploadsRs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("handlers").join("uploads.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let (imports, router) = if self.auth {
            (
                "use axum::{\n    extract::{Multipart, Path, State},\n    http::{header, StatusCode},\n    middleware,\n    routing::{delete, get, post},\n    Json, Router,\n};\nuse serde::Serialize;\n\nuse crate::{\n    auth::require_auth,\n    error::{AppError, AppResult},\n    state::AppState,\n    storage::sanitize_key,\n};",
                "/// Downloads are public; uploads and deletes require a bearer token.\npub fn router(state: AppState) -> Router<AppState> {\n    let read = Router::new().route(\"/:key\", get(download));\n    let write = Router::new()\n        .route(\"/\", post(upload))\n        .route(\"/:key\", delete(remove))\n        .route_layer(middleware::from_fn_with_state(state, require_auth));\n    read.merge(write)\n}",
            )
        } else {
            (
                "use axum::{\n    extract::{Multipart, Path, State},\n    http::{header, StatusCode},\n    routing::{get, post},\n    Json, Router,\n};\nuse serde::Serialize;\n\nuse crate::{\n    error::{AppError, AppResult},\n    state::AppState,\n    storage::sanitize_key,\n};",
                "pub fn router() -> Router<AppState> {\n    Router::new()\n        .route(\"/\", post(upload))\n        .route(\"/:key\", get(download).delete(remove))\n}",
            )
        };

        format!(
            r#"{imports}

#[derive(Debug, Serialize)]
pub struct UploadResponse {{
    pub key: String,
    pub url: String,
    pub size: usize,
}}

{router}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<UploadResponse>)> {{
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
        .ok_or_else(|| AppError::BadRequest("multipart body has no file".to_string()))?;
    let name = sanitize_key(field.file_name().unwrap_or("upload"));
    let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let stamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let key = format!("{{stamp}}-{{name}}");
    state.storage.put(&key, &bytes).await?;
    tracing::info!(%key, size = bytes.len(), "stored upload");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {{
            url: state.storage.url(&key),
            size: bytes.len(),
            key,
        }}),
    ))
}}

async fn download(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> AppResult<([(header::HeaderName, &'static str); 1], Vec<u8>)> {{
    let bytes = state
        .storage
        .get(&key)
        .await
        .map_err(|_| AppError::NotFound(format!("upload {{key}}")))?;
    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}}

async fn remove(State(state): State<AppState>, Path(key): Path<String>) -> AppResult<StatusCode> {{
    state
        .storage
        .delete(&key)
        .await
        .map_err(|_| AppError::NotFound(format!("upload {{key}}")))?;
    Ok(StatusCode::NO_CONTENT)
}}
"#
        )
    }
}
