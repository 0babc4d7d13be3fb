//! Global search over songs, artists and albums

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tcha_common::db::{Album, Artist, SongSummary};

use super::{clamp_limit, SearchQuery};
use crate::db::{albums, artists, songs};
use crate::{ApiError, ApiResult, AppState};

#[derive(Debug, Serialize)]
pub struct SearchResults {
    pub songs: Vec<SongSummary>,
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
}

/// GET /api/search?q=
///
/// Each category is searched independently with the same limit.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<SearchResults>> {
    let term = query.q.trim();
    if term.is_empty() {
        return Err(ApiError::BadRequest("Query parameter 'q' is required".to_string()));
    }
    let limit = clamp_limit(query.limit);

    Ok(Json(SearchResults {
        songs: songs::search_songs(&state.db, term, limit).await?,
        artists: artists::search_artists(&state.db, term, limit).await?,
        albums: albums::search_albums(&state.db, term, limit).await?,
    }))
}

pub fn search_routes() -> Router<AppState> {
    Router::new().route("/api/search", get(search))
}
