//! Account and session endpoints
//!
//! Email/password accounts; a successful register or login returns a bearer
//! token valid for `session_timeout_seconds`.

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tcha_common::auth::{generate_token, hash_password, token_digest, verify_password};
use tcha_common::db::{User, UserUpdate};
use tcha_common::time;
use tracing::{debug, info};

use crate::db::users;
use crate::session::AuthSession;
use crate::{ApiError, ApiResult, AppState};

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user: User,
    pub token: String,
    pub expires_at: String,
}

fn normalize_email(email: &str) -> ApiResult<String> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(ApiError::BadRequest(format!("Invalid email address: {}", email)));
    }
    Ok(email)
}

/// Create a session row and return the raw token with its expiry
async fn open_session(state: &AppState, user_id: &str) -> ApiResult<(String, String)> {
    let token = generate_token();
    let expires_at = time::format_timestamp(
        &(time::now() + Duration::seconds(state.settings.session_timeout_seconds)),
    );
    users::insert_session(&state.db, &token_digest(&token), user_id, &expires_at).await?;
    Ok((token, expires_at))
}

/// POST /api/auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<SessionResponse>)> {
    let email = normalize_email(&request.email)?;
    if request.password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::BadRequest(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let username = request
        .username
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| email.split('@').next().unwrap_or_default().to_string());
    let display_name = request
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| username.clone());

    let password_hash = hash_password(&request.password)?;
    let user =
        users::insert_user(&state.db, &email, &username, &display_name, &password_hash).await?;
    info!(user_id = %user.id, "Registered user");

    let (token, expires_at) = open_session(&state, &user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(SessionResponse {
            user,
            token,
            expires_at,
        }),
    ))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let email = request.email.trim().to_lowercase();
    let rejected = || ApiError::Unauthorized("Invalid email or password".to_string());

    let credentials = users::load_credentials(&state.db, &email)
        .await?
        .ok_or_else(rejected)?;
    if !verify_password(&request.password, &credentials.password_hash) {
        return Err(rejected());
    }

    let user = users::load_user(&state.db, &credentials.user_id)
        .await?
        .ok_or_else(rejected)?;

    let purged = users::purge_expired_sessions(&state.db, &time::timestamp()).await?;
    if purged > 0 {
        debug!(purged, "Removed expired sessions");
    }

    let (token, expires_at) = open_session(&state, &user.id).await?;
    info!(user_id = %user.id, "User signed in");
    Ok(Json(SessionResponse {
        user,
        token,
        expires_at,
    }))
}

/// POST /api/auth/logout
pub async fn logout(State(state): State<AppState>, session: AuthSession) -> ApiResult<StatusCode> {
    users::delete_session(&state.db, &session.token_hash).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/auth/me
pub async fn me(State(state): State<AppState>, session: AuthSession) -> ApiResult<Json<User>> {
    users::load_user(&state.db, &session.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))
}

/// PUT /api/auth/me
///
/// Profile fields only; email and password are not changed here.
pub async fn update_me(
    State(state): State<AppState>,
    session: AuthSession,
    Json(mut update): Json<UserUpdate>,
) -> ApiResult<Json<User>> {
    for (field, value) in [
        ("Username", &mut update.username),
        ("Display name", &mut update.display_name),
    ] {
        if let Some(v) = value {
            let trimmed = v.trim();
            if trimmed.is_empty() {
                return Err(ApiError::BadRequest(format!("{} cannot be blank", field)));
            }
            *v = trimmed.to_string();
        }
    }

    users::update_user(&state.db, &session.user_id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::Unauthorized("Account no longer exists".to_string()))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/me", get(me).put(update_me))
}
