//! Genre listing

use axum::{extract::State, routing::get, Json, Router};
use tcha_common::db::Genre;

use crate::db::genres::list_genres;
use crate::{ApiResult, AppState};

/// GET /api/genres
///
/// Every genre, alphabetical, unbounded.
pub async fn get_genres(State(state): State<AppState>) -> ApiResult<Json<Vec<Genre>>> {
    Ok(Json(list_genres(&state.db).await?))
}

pub fn genre_routes() -> Router<AppState> {
    Router::new().route("/api/genres", get(get_genres))
}
