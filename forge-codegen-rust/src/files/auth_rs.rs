use std::path::{Path, PathBuf};

use crudforge_codegen::{CredentialStore, TypeMapper};
use crudforge_core::{FileRules, GeneratedFile};

use crate::project::RustProject;

/// `src/auth/mod.rs`: tokens, password hashing and the auth middleware.
pub struct AuthMod;

impl GeneratedFile for AuthMod {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("auth").join("mod.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        r#"pub mod handlers;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    state::AppState,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Key of the authenticated user.
    pub sub: String,
    pub exp: u64,
}

pub fn issue_token(secret: &str, subject: &str, ttl_secs: u64) -> AppResult<String> {
    let claims = Claims {
        sub: subject.to_string(),
        exp: jsonwebtoken::get_current_timestamp() + ttl_secs,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify_token(secret: &str, token: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AppError::Unauthorized)
}

pub fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::Internal(e.to_string()))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Rejects requests without a valid bearer token and stores the claims
/// in request extensions.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;
    let claims = verify_token(&state.config.jwt_secret, token)?;
    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trip() {
        let token = issue_token("secret", "42", 60).unwrap();
        assert_eq!(verify_token("secret", &token).unwrap().sub, "42");
        assert!(verify_token("other", &token).is_err());
    }

    #[test]
    fn password_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong", &hash));
    }
}
"#
        .to_string()
    }
}

/// `src/auth/handlers.rs`: register and login.
pub struct AuthHandlers<'a> {
    project: RustProject<'a>,
}

impl<'a> AuthHandlers<'a> {
    pub fn new(project: RustProject<'a>) -> Self {
        Self { project }
    }
}

impl GeneratedFile for AuthHandlers<'_> {
    fn path(&self, base: &Path) -> PathBuf {
        base.join("src").join("auth").join("handlers.rs")
    }

    fn rules(&self) -> FileRules {
        FileRules::generated("//")
    }

    fn render(&self) -> String {
        let store = CredentialStore::resolve(self.project.model);
        let dialect = self.project.dialect;
        let table = dialect.ident(&store.table);
        let id = dialect.ident(&store.id_column);
        let email = dialect.ident(&store.email_column);
        let password = dialect.ident(&store.password_column);
        let id_type = self.project.types.map_type(&store.id_type);

        let insert = format!(
            "INSERT INTO {table} ({email}, {password}) VALUES ({}, {})",
            dialect.placeholder(1),
            dialect.placeholder(2)
        );
        let select_id = format!(
            "SELECT {id} FROM {table} WHERE {email} = {}",
            dialect.placeholder(1)
        );
        let select_login = format!(
            "SELECT {id}, COALESCE({password}, '') FROM {table} WHERE {email} = {}",
            dialect.placeholder(1)
        );
        let note = if store.is_declared() {
            String::new()
        } else {
            format!(
                "//! The schema declares no credential table; these handlers expect\n//! `{} ({} PRIMARY KEY, {} UNIQUE, {})` to exist.\n\n",
                store.table, store.id_column, store.email_column, store.password_column
            )
        };
        let lit = |sql: &str| {
            if sql.contains('"') {
                format!("r#\"{}\"#", sql)
            } else {
                format!("\"{}\"", sql)
            }
        };

        format!(
            r#"{note}use axum::{{extract::State, http::StatusCode, routing::post, Json, Router}};
use serde::{{Deserialize, Serialize}};

use super::{{hash_password, issue_token, verify_password}};
use crate::{{
    error::{{AppError, AppResult}},
    state::AppState,
}};

#[derive(Debug, Deserialize)]
pub struct Credentials {{
    pub email: String,
    pub password: String,
}}

#[derive(Debug, Serialize)]
pub struct TokenResponse {{
    pub access_token: String,
    pub token_type: &'static str,
}}

impl TokenResponse {{
    fn bearer(access_token: String) -> Self {{
        Self {{
            access_token,
            token_type: "Bearer",
        }}
    }}
}}

pub fn router() -> Router<AppState> {{
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}}

async fn register(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {{
    if !input.email.contains('@') || input.password.len() < 8 {{
        return Err(AppError::BadRequest(
            "a valid email and a password of at least 8 characters are required".to_string(),
        ));
    }}
    let hash = hash_password(&input.password)?;
    sqlx::query({insert})
        .bind(&input.email)
        .bind(&hash)
        .execute(&state.db)
        .await?;
    let id: {id_type} = sqlx::query_scalar({select_id})
        .bind(&input.email)
        .fetch_one(&state.db)
        .await?;
    let token = issue_token(&state.config.jwt_secret, &id.to_string(), state.config.jwt_ttl_secs)?;
    Ok((StatusCode::CREATED, Json(TokenResponse::bearer(token))))
}}

async fn login(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<Json<TokenResponse>> {{
    let row: Option<({id_type}, String)> = sqlx::query_as({select_login})
        .bind(&input.email)
        .fetch_optional(&state.db)
        .await?;
    let (id, hash) = row.ok_or(AppError::Unauthorized)?;
    if !verify_password(&input.password, &hash) {{
        return Err(AppError::Unauthorized);
    }}
    let token = issue_token(&state.config.jwt_secret, &id.to_string(), state.config.jwt_ttl_secs)?;
    Ok(Json(TokenResponse::bearer(token)))
}}
"#,
            insert = lit(&insert),
            select_id = lit(&select_id),
            select_login = lit(&select_login),
        )
    }
}
