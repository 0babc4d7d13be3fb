//! Like endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tcha_common::db::SongSummary;

use crate::db::likes;
use crate::session::AuthSession;
use crate::{ApiResult, AppState};

/// POST /api/songs/:id/like
///
/// 409 when already liked.
pub async fn like(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let like_count = likes::like_song(&state.db, &session.user_id, &id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "songId": id, "liked": true, "likeCount": like_count })),
    ))
}

/// DELETE /api/songs/:id/like
pub async fn unlike(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let like_count = likes::unlike_song(&state.db, &session.user_id, &id).await?;
    Ok(Json(json!({ "songId": id, "liked": false, "likeCount": like_count })))
}

/// GET /api/songs/:id/like
pub async fn is_liked(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let liked = likes::has_like(&state.db, &session.user_id, &id).await?;
    Ok(Json(json!({ "songId": id, "liked": liked })))
}

/// GET /api/me/likes
pub async fn my_likes(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<Json<Vec<SongSummary>>> {
    Ok(Json(likes::liked_songs(&state.db, &session.user_id).await?))
}

pub fn like_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/songs/:id/like",
            post(like).delete(unlike).get(is_liked),
        )
        .route("/api/me/likes", get(my_likes))
}
