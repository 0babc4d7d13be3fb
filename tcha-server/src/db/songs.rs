//! Song database operations
//!
//! Tags, credits and annotations are stored as JSON text columns.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tcha_common::db::{Annotation, Credits, NewSong, Song, SongSummary};
use tcha_common::time;
use tcha_common::Result;
use uuid::Uuid;

use super::like_pattern;
use crate::editor::SongDraft;

const SONG_COLUMNS: &str = "id, title, artist_id, album_id, audio_file_id, cover_image, duration, \
                            track_number, genre, release_date, lyrics, description, explicit, \
                            is_public, stream_count, like_count, tags, credits, annotations, \
                            owner_id, created_at, updated_at, last_edited_by";

const SUMMARY_SELECT: &str = r#"
    SELECT s.id, s.title, s.duration, s.release_date, s.stream_count, s.like_count,
           s.audio_file_id, s.cover_image, s.artist_id, s.created_at,
           a.name AS artist_name, a.verified AS artist_verified, s.genre AS genre_name
    FROM songs s
    LEFT JOIN artists a ON s.artist_id = a.id
"#;

fn song_from_row(row: &SqliteRow) -> Result<Song> {
    let tags: String = row.get("tags");
    let credits: String = row.get("credits");
    let annotations: String = row.get("annotations");

    Ok(Song {
        id: row.get("id"),
        title: row.get("title"),
        artist_id: row.get("artist_id"),
        album_id: row.get("album_id"),
        audio_file_id: row.get("audio_file_id"),
        cover_image: row.get("cover_image"),
        duration: row.get("duration"),
        track_number: row.get("track_number"),
        genre: row.get("genre"),
        release_date: row.get("release_date"),
        lyrics: row.get("lyrics"),
        description: row.get("description"),
        explicit: row.get("explicit"),
        is_public: row.get("is_public"),
        stream_count: row.get("stream_count"),
        like_count: row.get("like_count"),
        tags: serde_json::from_str::<Vec<String>>(&tags)?,
        credits: serde_json::from_str::<Credits>(&credits)?,
        annotations: serde_json::from_str::<Vec<Annotation>>(&annotations)?,
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        last_edited_by: row.get("last_edited_by"),
    })
}

pub(crate) fn summary_from_row(row: &SqliteRow) -> SongSummary {
    SongSummary {
        id: row.get("id"),
        title: row.get("title"),
        duration: row.get("duration"),
        release_date: row.get("release_date"),
        stream_count: row.get("stream_count"),
        like_count: row.get("like_count"),
        audio_file_id: row.get("audio_file_id"),
        cover_image: row.get("cover_image"),
        artist_id: row.get("artist_id"),
        artist_name: row.get("artist_name"),
        artist_verified: row.get("artist_verified"),
        genre_name: row.get("genre_name"),
        created_at: row.get("created_at"),
    }
}

/// Insert a song; counters start at zero and the release date defaults to today
pub async fn insert_song(pool: &SqlitePool, song: &NewSong) -> Result<Song> {
    let created = Song {
        id: Uuid::new_v4().to_string(),
        title: song.title.clone(),
        artist_id: song.artist_id.clone(),
        album_id: song.album_id.clone(),
        audio_file_id: song.audio_file_id.clone(),
        cover_image: song.cover_image.clone(),
        duration: song.duration,
        track_number: song.track_number,
        genre: song.genre.clone(),
        release_date: song.release_date.clone().unwrap_or_else(time::today),
        lyrics: song.lyrics.clone(),
        description: song.description.clone(),
        explicit: song.explicit,
        is_public: song.is_public,
        stream_count: 0,
        like_count: 0,
        tags: song.tags.clone(),
        credits: song.credits.clone(),
        annotations: song.annotations.clone(),
        owner_id: song.owner_id.clone(),
        created_at: time::timestamp(),
        updated_at: None,
        last_edited_by: None,
    };

    sqlx::query(
        r#"
        INSERT INTO songs (
            id, title, artist_id, album_id, audio_file_id, cover_image, duration,
            track_number, genre, release_date, lyrics, description, explicit,
            is_public, stream_count, like_count, tags, credits, annotations,
            owner_id, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, 0, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&created.id)
    .bind(&created.title)
    .bind(&created.artist_id)
    .bind(&created.album_id)
    .bind(&created.audio_file_id)
    .bind(&created.cover_image)
    .bind(created.duration)
    .bind(created.track_number)
    .bind(&created.genre)
    .bind(&created.release_date)
    .bind(&created.lyrics)
    .bind(&created.description)
    .bind(created.explicit)
    .bind(created.is_public)
    .bind(serde_json::to_string(&created.tags)?)
    .bind(serde_json::to_string(&created.credits)?)
    .bind(serde_json::to_string(&created.annotations)?)
    .bind(&created.owner_id)
    .bind(&created.created_at)
    .execute(pool)
    .await?;

    Ok(created)
}

pub async fn load_song(pool: &SqlitePool, id: &str) -> Result<Option<Song>> {
    let sql = format!("SELECT {} FROM songs WHERE id = ?", SONG_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    row.as_ref().map(song_from_row).transpose()
}

/// Overwrite every editable column from the draft
///
/// Counters are not touched. Returns false when the song does not exist.
pub async fn update_song_metadata(
    pool: &SqlitePool,
    id: &str,
    draft: &SongDraft,
    editor_id: &str,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE songs SET
            title = ?, genre = ?, description = ?, lyrics = ?, release_date = ?,
            duration = ?, explicit = ?, tags = ?, credits = ?, annotations = ?,
            cover_image = ?, updated_at = ?, last_edited_by = ?
        WHERE id = ?
        "#,
    )
    .bind(&draft.title)
    .bind(&draft.genre)
    .bind(&draft.description)
    .bind(&draft.lyrics)
    .bind(&draft.release_date)
    .bind(draft.duration)
    .bind(draft.explicit)
    .bind(serde_json::to_string(&draft.tags)?)
    .bind(serde_json::to_string(&draft.credits)?)
    .bind(serde_json::to_string(&draft.annotations)?)
    .bind(&draft.cover_image)
    .bind(time::timestamp())
    .bind(editor_id)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn delete_song(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM songs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Public songs, newest first
pub async fn list_public_songs(pool: &SqlitePool, limit: i64) -> Result<Vec<SongSummary>> {
    let sql = format!(
        "{} WHERE s.is_public = 1 ORDER BY s.created_at DESC, s.rowid DESC LIMIT ?",
        SUMMARY_SELECT
    );
    let rows = sqlx::query(&sql).bind(limit).fetch_all(pool).await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

/// Public songs with the most streams first
pub async fn popular_songs(pool: &SqlitePool, limit: i64) -> Result<Vec<SongSummary>> {
    let sql = format!(
        "{} WHERE s.is_public = 1 ORDER BY s.stream_count DESC, s.created_at DESC LIMIT ?",
        SUMMARY_SELECT
    );
    let rows = sqlx::query(&sql).bind(limit).fetch_all(pool).await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

/// Public songs whose title contains `term`
pub async fn search_songs(pool: &SqlitePool, term: &str, limit: i64) -> Result<Vec<SongSummary>> {
    let sql = format!(
        "{} WHERE s.is_public = 1 AND s.title LIKE ? ESCAPE '\\' \
         ORDER BY s.stream_count DESC, s.title ASC LIMIT ?",
        SUMMARY_SELECT
    );
    let rows = sqlx::query(&sql)
        .bind(like_pattern(term))
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

pub async fn songs_by_genre(pool: &SqlitePool, genre: &str, limit: i64) -> Result<Vec<SongSummary>> {
    let sql = format!(
        "{} WHERE s.is_public = 1 AND s.genre = ? ORDER BY s.created_at DESC, s.rowid DESC LIMIT ?",
        SUMMARY_SELECT
    );
    let rows = sqlx::query(&sql)
        .bind(genre)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

pub async fn songs_by_artist(pool: &SqlitePool, artist_id: &str) -> Result<Vec<SongSummary>> {
    let sql = format!(
        "{} WHERE s.is_public = 1 AND s.artist_id = ? ORDER BY s.created_at DESC, s.rowid DESC",
        SUMMARY_SELECT
    );
    let rows = sqlx::query(&sql).bind(artist_id).fetch_all(pool).await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

pub async fn songs_by_album(pool: &SqlitePool, album_id: &str) -> Result<Vec<SongSummary>> {
    let sql = format!(
        "{} WHERE s.album_id = ? ORDER BY s.track_number ASC, s.title ASC",
        SUMMARY_SELECT
    );
    let rows = sqlx::query(&sql).bind(album_id).fetch_all(pool).await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

/// Bump the stream counter in a single statement; false when the song is missing
pub async fn increment_stream_count(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE songs SET stream_count = stream_count + 1 WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn read_like_count(pool: &SqlitePool, id: &str) -> Result<Option<i64>> {
    let count: Option<i64> = sqlx::query_scalar("SELECT like_count FROM songs WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;

    Ok(count)
}

/// Store an absolute like count (the caller computed it from an earlier read)
pub async fn write_like_count(pool: &SqlitePool, id: &str, count: i64) -> Result<()> {
    sqlx::query("UPDATE songs SET like_count = ? WHERE id = ?")
        .bind(count)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(())
}
