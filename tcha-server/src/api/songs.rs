//! Song endpoints: listings, editor load/save, cover replacement, streams

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tcha_common::db::{Song, SongSummary};
use tcha_common::Error;
use tracing::info;

use super::{clamp_limit, read_form, LimitQuery, SearchQuery};
use crate::db::songs;
use crate::editor::{MetadataEditor, SongDraft};
use crate::session::AuthSession;
use crate::{ApiError, ApiResult, AppState};

/// GET /api/songs
///
/// Public songs joined with their artist, newest first, capped by the
/// `song_list_limit` setting.
pub async fn list_songs(State(state): State<AppState>) -> ApiResult<Json<Vec<SongSummary>>> {
    let limit = state.settings.song_list_limit;
    Ok(Json(songs::list_public_songs(&state.db, limit).await?))
}

/// GET /api/songs/popular
pub async fn popular_songs(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<SongSummary>>> {
    let limit = clamp_limit(query.limit);
    Ok(Json(songs::popular_songs(&state.db, limit).await?))
}

/// GET /api/songs/search?q=
pub async fn search_songs(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Json<Vec<SongSummary>>> {
    if query.q.trim().is_empty() {
        return Err(ApiError::BadRequest("Query parameter 'q' is required".to_string()));
    }
    let limit = clamp_limit(query.limit);
    Ok(Json(songs::search_songs(&state.db, &query.q, limit).await?))
}

/// GET /api/songs/by-genre/:genre
pub async fn songs_by_genre(
    State(state): State<AppState>,
    Path(genre): Path<String>,
    Query(query): Query<LimitQuery>,
) -> ApiResult<Json<Vec<SongSummary>>> {
    let limit = clamp_limit(query.limit);
    Ok(Json(songs::songs_by_genre(&state.db, &genre, limit).await?))
}

/// GET /api/songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Song>> {
    songs::load_song(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Song {}", id)))
}

/// PUT /api/songs/:id
///
/// Saves the whole working copy sent by the editor (last write wins).
pub async fn save_song(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    Json(draft): Json<SongDraft>,
) -> ApiResult<Json<Song>> {
    let mut editor = MetadataEditor::load(state.catalog.clone(), &id).await?;
    editor.replace_draft(draft);
    let saved = editor.save(Some(&session)).await?;
    Ok(Json(saved))
}

/// POST /api/songs/:id/cover
///
/// Multipart `file` (must be an image). Uploads the blob and saves the song
/// with the new cover.
pub async fn replace_cover(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut form = read_form(multipart).await?;
    let upload = form
        .take_file("file")
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let mut editor = MetadataEditor::load(state.catalog.clone(), &id).await?;
    let cover = editor.upload_cover(&upload, &session).await?;
    let song = editor.save(Some(&session)).await?;

    Ok(Json(json!({ "song": song, "cover": cover })))
}

/// DELETE /api/songs/:id
///
/// Only the owner may delete. Blobs referenced by the song are kept.
pub async fn delete_song(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let song = songs::load_song(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Song {}", id)))?;

    if song.owner_id != session.user_id {
        return Err(Error::Forbidden("Only the owner can delete this song".to_string()).into());
    }

    songs::delete_song(&state.db, &id).await?;
    info!(song_id = %id, "Deleted song");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/songs/:id/stream
pub async fn record_stream(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    if !songs::increment_stream_count(&state.db, &id).await? {
        return Err(ApiError::NotFound(format!("Song {}", id)));
    }

    let stream_count = songs::load_song(&state.db, &id)
        .await?
        .map(|song| song.stream_count)
        .unwrap_or_default();

    Ok(Json(json!({ "id": id, "streamCount": stream_count })))
}

pub fn song_routes() -> Router<AppState> {
    Router::new()
        .route("/api/songs", get(list_songs))
        .route("/api/songs/popular", get(popular_songs))
        .route("/api/songs/search", get(search_songs))
        .route("/api/songs/by-genre/:genre", get(songs_by_genre))
        .route(
            "/api/songs/:id",
            get(get_song).put(save_song).delete(delete_song),
        )
        .route("/api/songs/:id/cover", post(replace_cover))
        .route("/api/songs/:id/stream", post(record_stream))
}
