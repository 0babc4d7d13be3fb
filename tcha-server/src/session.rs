//! Per-request session extraction
//!
//! Handlers that need a caller take [`AuthSession`] (401 when absent or
//! expired); handlers where a caller is optional take [`OptionalSession`].
//! Clients send `Authorization: Bearer <token>`; only the token digest is
//! looked up.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tcha_common::auth::token_digest;
use tcha_common::db::ANONYMOUS_USER;
use tcha_common::time;

use crate::error::ApiError;
use crate::AppState;

/// Authenticated caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: String,
    /// Digest of the bearer token, identifies the session row
    pub token_hash: String,
}

/// Caller that may be anonymous
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<AuthSession>);

impl OptionalSession {
    /// Owner id for records created by this caller
    pub fn owner_id(&self) -> String {
        self.0
            .as_ref()
            .map(|s| s.user_id.clone())
            .unwrap_or_else(|| ANONYMOUS_USER.to_string())
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

async fn resolve_session(parts: &Parts, state: &AppState) -> Result<Option<AuthSession>, ApiError> {
    let Some(token) = bearer_token(parts) else {
        return Ok(None);
    };

    let token_hash = token_digest(token);
    let user_id =
        crate::db::users::load_session_user(&state.db, &token_hash, &time::timestamp()).await?;

    Ok(user_id.map(|user_id| AuthSession { user_id, token_hash }))
}

#[async_trait]
impl FromRequestParts<AppState> for AuthSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        resolve_session(parts, state)
            .await?
            .ok_or_else(|| ApiError::Unauthorized("Missing or expired session".to_string()))
    }
}

#[async_trait]
impl FromRequestParts<AppState> for OptionalSession {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(OptionalSession(resolve_session(parts, state).await?))
    }
}
