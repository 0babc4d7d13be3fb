//! Album endpoints
//!
//! Albums are edited and deleted by the user who created them. Deleting an
//! album keeps its songs, which simply lose the album link.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tcha_common::db::{Album, AlbumUpdate, NewAlbum, SongSummary};
use tcha_common::Error;
use tracing::info;

use super::{clamp_limit, LimitQuery};
use crate::db::{albums, artists, songs};
use crate::session::AuthSession;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/albums
pub async fn create_album(
    State(state): State<AppState>,
    session: AuthSession,
    Json(album): Json<NewAlbum>,
) -> ApiResult<(StatusCode, Json<Album>)> {
    if album.title.trim().is_empty() {
        return Err(ApiError::BadRequest("Album title is required".to_string()));
    }
    if artists::load_artist(&state.db, &album.artist_id).await?.is_none() {
        return Err(ApiError::BadRequest(format!(
            "Unknown artist {}",
            album.artist_id
        )));
    }

    let created = albums::insert_album(&state.db, &album, &session.user_id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/albums
pub async fn list_albums(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Album>>> {
    Ok(Json(albums::list_albums(&state.db, clamp_limit(query.limit)).await?))
}

/// GET /api/albums/:id
pub async fn get_album(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Album>> {
    albums::load_album(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Album {}", id)))
}

async fn require_owned_album(
    state: &AppState,
    id: &str,
    session: &AuthSession,
) -> ApiResult<Album> {
    let album = albums::load_album(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Album {}", id)))?;
    if album.owner_id != session.user_id {
        return Err(Error::Forbidden("Only the album's owner can change it".to_string()).into());
    }
    Ok(album)
}

/// PUT /api/albums/:id
pub async fn update_album(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    Json(update): Json<AlbumUpdate>,
) -> ApiResult<Json<Album>> {
    require_owned_album(&state, &id, &session).await?;

    if update.title.as_deref().is_some_and(|t| t.trim().is_empty()) {
        return Err(ApiError::BadRequest("Album title cannot be blank".to_string()));
    }

    albums::update_album(&state.db, &id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Album {}", id)))
}

/// DELETE /api/albums/:id
pub async fn delete_album(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    require_owned_album(&state, &id, &session).await?;

    albums::delete_album(&state.db, &id).await?;
    info!(album_id = %id, "Deleted album");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/albums/:id/songs
///
/// Tracks in track-number order.
pub async fn album_songs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<SongSummary>>> {
    if albums::load_album(&state.db, &id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Album {}", id)));
    }
    Ok(Json(songs::songs_by_album(&state.db, &id).await?))
}

pub fn album_routes() -> Router<AppState> {
    Router::new()
        .route("/api/albums", get(list_albums).post(create_album))
        .route(
            "/api/albums/:id",
            get(get_album).put(update_album).delete(delete_album),
        )
        .route("/api/albums/:id/songs", get(album_songs))
}
