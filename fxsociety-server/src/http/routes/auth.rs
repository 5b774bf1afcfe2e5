//! Registration, login and profile endpoints

use std::sync::Arc;

use axum::{
    extract::{FromRequest, Request, State},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::auth::{hash_password, verify_password, Role};
use crate::db::repos::{DbError, User, UserRepo};
use crate::http::error::ApiError;
use crate::http::extractors::{ClientKey, CurrentUser, LoginCredentials, ValidJson};
use crate::http::server::AppState;
use crate::models::RegisterRequest;

/// Public view of a customer account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub full_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            email: u.email,
            full_name: u.full_name,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}

/// Issued access token
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

const USER_NOT_FOUND: &str = "User not found";

/// Resolve the account behind a customer token; 404 when it no longer exists.
pub(crate) async fn require_user(state: &AppState, current: &CurrentUser) -> Result<User, ApiError> {
    let user = UserRepo::new(&state.pool)
        .find_by_email(&current.email)
        .await?;
    existing_user(user)
}

fn existing_user(user: Option<User>) -> Result<User, ApiError> {
    user.ok_or_else(|| ApiError::not_found(USER_NOT_FOUND))
}

/// Compare secrets without short-circuiting on the first differing byte.
fn secrets_match(given: &str, expected: &str) -> bool {
    let (a, b) = (given.as_bytes(), expected.as_bytes());
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// POST /api/auth/register
async fn register(
    State(state): State<Arc<AppState>>,
    ValidJson(req): ValidJson<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let new_user = req.validate()?;

    let password = new_user.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(format!("hashing task failed: {e}")))??;

    let user = UserRepo::new(&state.pool)
        .create(
            &new_user.email,
            &password_hash,
            new_user.full_name.as_deref(),
            new_user.is_active,
        )
        .await
        .map_err(|e| match e {
            DbError::Conflict { .. } => ApiError::bad_request("Email sudah terdaftar"),
            other => other.into(),
        })?;

    tracing::info!(user_id = user.id, "customer registered");
    Ok(Json(UserResponse::from(user)))
}

/// POST /api/auth/login
///
/// Admin credentials from the environment are checked first; otherwise the
/// username is a customer email. A successful customer login claims guest
/// orders placed with the same email. The limiter runs before the body is
/// parsed, so malformed attempts count too.
async fn login(
    State(state): State<Arc<AppState>>,
    ClientKey(client): ClientKey,
    request: Request,
) -> Result<Json<TokenResponse>, ApiError> {
    if let Err(limited) = state.login_limiter.check(&client) {
        tracing::warn!(client = %client, retry_after = ?limited.retry_after, "login rate limited");
        return Err(ApiError::RateLimited {
            retry_after: limited.retry_after,
        });
    }

    let LoginCredentials(credentials) = LoginCredentials::from_request(request, &state).await?;

    let config = &state.config;
    if secrets_match(&credentials.username, &config.admin_username)
        && secrets_match(&credentials.password, &config.admin_password)
    {
        let token = state.tokens.issue(&config.admin_username, Role::Admin)?;
        tracing::info!(client = %client, "admin logged in");
        return Ok(Json(TokenResponse::bearer(token)));
    }

    let email = credentials.username.trim().to_lowercase();
    let repo = UserRepo::new(&state.pool);
    let user = repo.find_by_email(&email).await?;

    let user = match user {
        Some(user) => {
            let hash = user.password_hash.clone();
            let password = credentials.password;
            let matches =
                tokio::task::spawn_blocking(move || verify_password(&hash, &password))
                    .await
                    .map_err(|e| ApiError::internal(format!("verify task failed: {e}")))?;
            matches.then_some(user)
        }
        None => None,
    };

    let Some(user) = user else {
        tracing::warn!(client = %client, "login failed");
        return Err(ApiError::Unauthorized("Email atau password salah".to_string()));
    };

    if !user.is_active {
        return Err(ApiError::bad_request("Akun tidak aktif"));
    }

    let claimed = repo.claim_orders(&user).await?;
    if claimed > 0 {
        tracing::info!(user_id = user.id, claimed, "guest orders linked to account");
    }

    let token = state.tokens.issue(&user.email, Role::User)?;
    Ok(Json(TokenResponse::bearer(token)))
}

/// GET /api/auth/me
async fn me(
    State(state): State<Arc<AppState>>,
    current: CurrentUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = require_user(&state, &current).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Auth routes, nested under `/api/auth`
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}
