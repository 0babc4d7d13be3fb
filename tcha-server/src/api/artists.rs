//! Artist endpoints
//!
//! Anyone may find-or-create an artist. Only the user recorded on the artist
//! may edit or delete it, and an artist with songs or albums is never
//! deleted.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tcha_common::db::{Album, Artist, ArtistUpdate, NewArtist, SongSummary, ANONYMOUS_USER};
use tcha_common::Error;
use tracing::info;

use super::{clamp_limit, LimitQuery, SearchQuery};
use crate::db::{albums, artists, songs};
use crate::session::{AuthSession, OptionalSession};
use crate::store::CatalogStore;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/artists
///
/// Find-or-create by exact name. An existing artist is returned unchanged
/// (200); otherwise the artist is created (201).
pub async fn create_artist(
    State(state): State<AppState>,
    session: OptionalSession,
    Json(mut artist): Json<NewArtist>,
) -> ApiResult<(StatusCode, Json<Artist>)> {
    if artist.user_id == ANONYMOUS_USER {
        artist.user_id = session.owner_id();
    }

    let resolved = state.catalog.find_or_create_artist(&artist).await?;
    let status = if resolved.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(resolved.artist)))
}

/// GET /api/artists
pub async fn list_artists(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Artist>>> {
    Ok(Json(artists::list_artists(&state.db, clamp_limit(query.limit)).await?))
}

/// GET /api/artists/search?q=
pub async fn search_artists(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<Artist>>> {
    if query.q.trim().is_empty() {
        return Err(ApiError::BadRequest("Query parameter 'q' is required".to_string()));
    }
    Ok(Json(
        artists::search_artists(&state.db, &query.q, clamp_limit(query.limit)).await?,
    ))
}

async fn require_artist(state: &AppState, id: &str) -> ApiResult<Artist> {
    artists::load_artist(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Artist {}", id)))
}

/// GET /api/artists/:id
pub async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Artist>> {
    Ok(Json(require_artist(&state, &id).await?))
}

fn require_artist_owner(artist: &Artist, session: &AuthSession) -> ApiResult<()> {
    if artist.user_id != session.user_id {
        return Err(Error::Forbidden("Only the artist's owner can change it".to_string()).into());
    }
    Ok(())
}

/// PUT /api/artists/:id
pub async fn update_artist(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    Json(update): Json<ArtistUpdate>,
) -> ApiResult<Json<Artist>> {
    let artist = require_artist(&state, &id).await?;
    require_artist_owner(&artist, &session)?;

    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("Artist name cannot be blank".to_string()));
    }

    artists::update_artist(&state.db, &id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Artist {}", id)))
}

/// DELETE /api/artists/:id
pub async fn delete_artist(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let artist = require_artist(&state, &id).await?;
    require_artist_owner(&artist, &session)?;

    if !artists::delete_unreferenced_artist(&state.db, &id).await? {
        return Err(Error::Conflict(format!("Artist {} still has songs or albums", id)).into());
    }
    info!(artist_id = %id, "Deleted artist");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/artists/:id/songs
pub async fn artist_songs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<SongSummary>>> {
    require_artist(&state, &id).await?;
    Ok(Json(songs::songs_by_artist(&state.db, &id).await?))
}

/// GET /api/artists/:id/albums
pub async fn artist_albums(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Album>>> {
    require_artist(&state, &id).await?;
    Ok(Json(albums::albums_by_artist(&state.db, &id).await?))
}

pub fn artist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/artists", get(list_artists).post(create_artist))
        .route("/api/artists/search", get(search_artists))
        .route(
            "/api/artists/:id",
            get(get_artist).put(update_artist).delete(delete_artist),
        )
        .route("/api/artists/:id/songs", get(artist_songs))
        .route("/api/artists/:id/albums", get(artist_albums))
}
