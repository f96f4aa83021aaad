use std::path::{Path, PathBuf};

use crudforge_core::{FileRules, GeneratedFile};
use crudforge_ir::Features;

/// `src/error.rs`: the error type every handler returns.
pub struct ErrorRs {
    pub features: Features,
}

impl GeneratedFile for ErrorRs {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("error.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let mut variants = String::new();
        let mut statuses = String::new();
        if self.features.auth {
            variants.push_str("    #[error(\"unauthorized\")]\n    Unauthorized,\n");
            statuses.push_str("            AppError::Unauthorized => StatusCode::UNAUTHORIZED,\n");
        }
        if self.features.rate_limit {
            variants.push_str("    #[error(\"too many requests\")]\n    TooManyRequests,\n");
            statuses.push_str(
                "            AppError::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,\n",
            );
        }
        if self.features.file_storage {
            variants.push_str("    #[error(transparent)]\n    Io(#[from] std::io::Error),\n");
        }

        format!(
            r#"use axum::{{
    http::StatusCode,
    response::{{IntoResponse, Response}},
    Json,
}};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum AppError {{
    #[error("{{0}} not found")]
    NotFound(String),
    #[error("{{0}}")]
    BadRequest(String),
{variants}    #[error(transparent)]
    Database(#[from] sqlx::Error),
    #[error("{{0}}")]
    Internal(String),
}}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {{
    pub fn status(&self) -> StatusCode {{
        match self {{
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
{statuses}            AppError::Database(sqlx::Error::RowNotFound) => StatusCode::NOT_FOUND,
            AppError::Database(sqlx::Error::Database(e)) if e.is_unique_violation() => {{
                StatusCode::CONFLICT
            }}
            AppError::Database(sqlx::Error::Database(e)) if e.is_foreign_key_violation() => {{
                StatusCode::UNPROCESSABLE_ENTITY
            }}
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }}
    }}
}}

impl IntoResponse for AppError {{
    fn into_response(self) -> Response {{
        let status = self.status();
        let message = if status.is_server_error() {{
            tracing::error!(error = %self, "request failed");
            "internal server error".to_string()
        }} else {{
            self.to_string()
        }};
        (status, Json(json!({{ "error": message }}))).into_response()
    }}
}}
"#
        )
    }
}
