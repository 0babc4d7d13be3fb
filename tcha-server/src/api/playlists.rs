//! Playlist endpoints
//!
//! Private playlists are visible to their owner only; other callers get 404.
//! Tracks may be added by the owner, or by anyone signed in when the
//! playlist is collaborative and public.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tcha_common::db::{NewPlaylist, Playlist, PlaylistUpdate, SongSummary};
use tcha_common::Error;
use tracing::info;

use super::{clamp_limit, LimitQuery};
use crate::db::{playlists, songs};
use crate::session::{AuthSession, OptionalSession};
use crate::{ApiError, ApiResult, AppState};

/// Playlist with its ordered tracks
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistDetail {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub tracks: Vec<SongSummary>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTrackRequest {
    pub song_id: String,
}

async fn require_playlist(state: &AppState, id: &str) -> ApiResult<Playlist> {
    playlists::load_playlist(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Playlist {}", id)))
}

/// Private playlists exist only for their owner
async fn require_visible_playlist(
    state: &AppState,
    id: &str,
    caller: Option<&str>,
) -> ApiResult<Playlist> {
    let playlist = require_playlist(state, id).await?;
    if !playlist.is_public && caller != Some(playlist.owner_id.as_str()) {
        return Err(ApiError::NotFound(format!("Playlist {}", id)));
    }
    Ok(playlist)
}

fn require_owner(playlist: &Playlist, session: &AuthSession) -> ApiResult<()> {
    if playlist.owner_id != session.user_id {
        return Err(Error::Forbidden("Only the owner can change this playlist".to_string()).into());
    }
    Ok(())
}

/// POST /api/playlists
pub async fn create_playlist(
    State(state): State<AppState>,
    session: AuthSession,
    Json(playlist): Json<NewPlaylist>,
) -> ApiResult<(StatusCode, Json<Playlist>)> {
    if playlist.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Playlist name is required".to_string()));
    }
    let created = playlists::insert_playlist(&state.db, &playlist, &session.user_id).await?;
    info!(playlist_id = %created.id, owner = %session.user_id, "Created playlist");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /api/playlists
///
/// Public playlists only.
pub async fn list_public_playlists(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Playlist>>> {
    Ok(Json(
        playlists::list_public_playlists(&state.db, clamp_limit(query.limit)).await?,
    ))
}

/// GET /api/me/playlists
pub async fn my_playlists(
    State(state): State<AppState>,
    session: AuthSession,
) -> ApiResult<Json<Vec<Playlist>>> {
    Ok(Json(playlists::playlists_by_owner(&state.db, &session.user_id).await?))
}

/// GET /api/playlists/:id
pub async fn get_playlist(
    State(state): State<AppState>,
    session: OptionalSession,
    Path(id): Path<String>,
) -> ApiResult<Json<PlaylistDetail>> {
    let caller = session.0.as_ref().map(|s| s.user_id.as_str());
    let playlist = require_visible_playlist(&state, &id, caller).await?;

    let tracks = playlists::playlist_tracks(&state.db, &id).await?;
    Ok(Json(PlaylistDetail { playlist, tracks }))
}

/// PUT /api/playlists/:id
pub async fn update_playlist(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    Json(update): Json<PlaylistUpdate>,
) -> ApiResult<Json<Playlist>> {
    let playlist = require_playlist(&state, &id).await?;
    require_owner(&playlist, &session)?;

    if update.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(ApiError::BadRequest("Playlist name cannot be blank".to_string()));
    }

    playlists::update_playlist(&state.db, &id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Playlist {}", id)))
}

/// DELETE /api/playlists/:id
pub async fn delete_playlist(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let playlist = require_playlist(&state, &id).await?;
    require_owner(&playlist, &session)?;

    playlists::delete_playlist(&state.db, &id).await?;
    info!(playlist_id = %id, "Deleted playlist");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/playlists/:id/tracks
pub async fn add_track(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    Json(request): Json<AddTrackRequest>,
) -> ApiResult<(StatusCode, Json<PlaylistDetail>)> {
    let playlist = require_visible_playlist(&state, &id, Some(session.user_id.as_str())).await?;
    if !playlist.collaborative {
        require_owner(&playlist, &session)?;
    }

    if songs::load_song(&state.db, &request.song_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Song {}", request.song_id)));
    }

    let position = playlists::append_track(&state.db, &id, &request.song_id).await?;
    info!(playlist_id = %id, song_id = %request.song_id, position, "Added track");

    let playlist = require_playlist(&state, &id).await?;
    let tracks = playlists::playlist_tracks(&state.db, &id).await?;
    Ok((StatusCode::CREATED, Json(PlaylistDetail { playlist, tracks })))
}

pub fn playlist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/playlists", get(list_public_playlists).post(create_playlist))
        .route("/api/me/playlists", get(my_playlists))
        .route(
            "/api/playlists/:id",
            get(get_playlist).put(update_playlist).delete(delete_playlist),
        )
        .route("/api/playlists/:id/tracks", post(add_track))
}
