//! Playlist database operations
//!
//! Track positions are dense and start at 1. Totals on the playlist row are
//! recomputed whenever a track is added.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tcha_common::db::{NewPlaylist, Playlist, PlaylistUpdate, SongSummary};
use tcha_common::time;
use tcha_common::{Error, Result};
use uuid::Uuid;

use super::songs::summary_from_row;

const PLAYLIST_COLUMNS: &str = "id, name, description, cover_image, owner_id, is_public, \
                                collaborative, total_tracks, total_duration, follower_count, \
                                created_at, updated_at";

fn playlist_from_row(row: &SqliteRow) -> Playlist {
    Playlist {
        id: row.get("id"),
        name: row.get("name"),
        description: row.get("description"),
        cover_image: row.get("cover_image"),
        owner_id: row.get("owner_id"),
        is_public: row.get("is_public"),
        collaborative: row.get("collaborative"),
        total_tracks: row.get("total_tracks"),
        total_duration: row.get("total_duration"),
        follower_count: row.get("follower_count"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

pub async fn insert_playlist(
    pool: &SqlitePool,
    playlist: &NewPlaylist,
    owner_id: &str,
) -> Result<Playlist> {
    let created = Playlist {
        id: Uuid::new_v4().to_string(),
        name: playlist.name.clone(),
        description: playlist.description.clone(),
        cover_image: playlist.cover_image.clone(),
        owner_id: owner_id.to_string(),
        is_public: playlist.is_public,
        collaborative: playlist.collaborative,
        total_tracks: 0,
        total_duration: 0,
        follower_count: 0,
        created_at: time::timestamp(),
        updated_at: None,
    };

    sqlx::query(
        r#"
        INSERT INTO playlists (
            id, name, description, cover_image, owner_id, is_public, collaborative,
            total_tracks, total_duration, follower_count, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, 0, 0, 0, ?)
        "#,
    )
    .bind(&created.id)
    .bind(&created.name)
    .bind(&created.description)
    .bind(&created.cover_image)
    .bind(&created.owner_id)
    .bind(created.is_public)
    .bind(created.collaborative)
    .bind(&created.created_at)
    .execute(pool)
    .await?;

    Ok(created)
}

pub async fn load_playlist(pool: &SqlitePool, id: &str) -> Result<Option<Playlist>> {
    let sql = format!("SELECT {} FROM playlists WHERE id = ?", PLAYLIST_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    Ok(row.as_ref().map(playlist_from_row))
}

pub async fn list_public_playlists(pool: &SqlitePool, limit: i64) -> Result<Vec<Playlist>> {
    let sql = format!(
        "SELECT {} FROM playlists WHERE is_public = 1 \
         ORDER BY follower_count DESC, created_at DESC LIMIT ?",
        PLAYLIST_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(limit).fetch_all(pool).await?;

    Ok(rows.iter().map(playlist_from_row).collect())
}

pub async fn playlists_by_owner(pool: &SqlitePool, owner_id: &str) -> Result<Vec<Playlist>> {
    let sql = format!(
        "SELECT {} FROM playlists WHERE owner_id = ? ORDER BY created_at DESC, rowid DESC",
        PLAYLIST_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(owner_id).fetch_all(pool).await?;

    Ok(rows.iter().map(playlist_from_row).collect())
}

/// Apply the present fields of `update`; returns the stored playlist afterwards
pub async fn update_playlist(
    pool: &SqlitePool,
    id: &str,
    update: &PlaylistUpdate,
) -> Result<Option<Playlist>> {
    sqlx::query(
        r#"
        UPDATE playlists SET
            name = COALESCE(?, name),
            description = COALESCE(?, description),
            cover_image = COALESCE(?, cover_image),
            is_public = COALESCE(?, is_public),
            collaborative = COALESCE(?, collaborative),
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(&update.name)
    .bind(&update.description)
    .bind(&update.cover_image)
    .bind(update.is_public)
    .bind(update.collaborative)
    .bind(time::timestamp())
    .bind(id)
    .execute(pool)
    .await?;

    load_playlist(pool, id).await
}

pub async fn delete_playlist(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM playlists WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Append a song at the end of the playlist; returns its position
///
/// The next position is read and claimed in one statement, so concurrent
/// appends to the same playlist each get their own slot. `Conflict` if the
/// slot was taken anyway.
pub async fn append_track(pool: &SqlitePool, playlist_id: &str, song_id: &str) -> Result<i64> {
    let position: Option<i64> = sqlx::query_scalar(
        r#"
        INSERT OR IGNORE INTO playlist_tracks (playlist_id, song_id, position, added_at)
        SELECT ?1, ?2, COALESCE(MAX(position), 0) + 1, ?3
        FROM playlist_tracks WHERE playlist_id = ?1
        RETURNING position
        "#,
    )
    .bind(playlist_id)
    .bind(song_id)
    .bind(time::timestamp())
    .fetch_optional(pool)
    .await?;

    let position = position.ok_or_else(|| {
        Error::Conflict(format!("Playlist {} changed while adding a track", playlist_id))
    })?;

    sqlx::query(
        r#"
        UPDATE playlists SET
            total_tracks = (SELECT COUNT(*) FROM playlist_tracks WHERE playlist_id = ?1),
            total_duration = (
                SELECT COALESCE(SUM(s.duration), 0)
                FROM playlist_tracks t JOIN songs s ON s.id = t.song_id
                WHERE t.playlist_id = ?1
            ),
            updated_at = ?2
        WHERE id = ?1
        "#,
    )
    .bind(playlist_id)
    .bind(time::timestamp())
    .execute(pool)
    .await?;

    Ok(position)
}

/// Tracks in playlist order
pub async fn playlist_tracks(pool: &SqlitePool, playlist_id: &str) -> Result<Vec<SongSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT s.id, s.title, s.duration, s.release_date, s.stream_count, s.like_count,
               s.audio_file_id, s.cover_image, s.artist_id, s.created_at,
               a.name AS artist_name, a.verified AS artist_verified, s.genre AS genre_name
        FROM playlist_tracks t
        JOIN songs s ON s.id = t.song_id
        LEFT JOIN artists a ON s.artist_id = a.id
        WHERE t.playlist_id = ?
        ORDER BY t.position ASC
        "#,
    )
    .bind(playlist_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(summary_from_row).collect())
}
