//! Like database operations
//!
//! The like row and the song's `like_count` are written by separate
//! statements. The counter is read, incremented in memory and written back,
//! so two concurrent likes can lose an update.

use sqlx::{Row, SqlitePool};
use tcha_common::db::SongSummary;
use tcha_common::time;
use tcha_common::{Error, Result};

use super::songs::{self, summary_from_row};

pub async fn has_like(pool: &SqlitePool, user_id: &str, song_id: &str) -> Result<bool> {
    let row = sqlx::query("SELECT 1 AS present FROM likes WHERE user_id = ? AND song_id = ?")
        .bind(user_id)
        .bind(song_id)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// Insert the like row only; `Conflict` when it already exists
pub async fn insert_like(pool: &SqlitePool, user_id: &str, song_id: &str) -> Result<()> {
    let result = sqlx::query(
        "INSERT OR IGNORE INTO likes (user_id, song_id, created_at) VALUES (?, ?, ?)",
    )
    .bind(user_id)
    .bind(song_id)
    .bind(time::timestamp())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(Error::Conflict(format!("Song {} already liked", song_id)));
    }
    Ok(())
}

pub async fn delete_like(pool: &SqlitePool, user_id: &str, song_id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM likes WHERE user_id = ? AND song_id = ?")
        .bind(user_id)
        .bind(song_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Like a song and bump its counter; returns the counter value written
pub async fn like_song(pool: &SqlitePool, user_id: &str, song_id: &str) -> Result<i64> {
    let current = songs::read_like_count(pool, song_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Song {}", song_id)))?;

    insert_like(pool, user_id, song_id).await?;

    let updated = current + 1;
    songs::write_like_count(pool, song_id, updated).await?;
    Ok(updated)
}

/// Remove a like and lower the counter (never below zero)
pub async fn unlike_song(pool: &SqlitePool, user_id: &str, song_id: &str) -> Result<i64> {
    let current = songs::read_like_count(pool, song_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Song {}", song_id)))?;

    if !delete_like(pool, user_id, song_id).await? {
        return Err(Error::NotFound(format!("Like on song {}", song_id)));
    }

    let updated = (current - 1).max(0);
    songs::write_like_count(pool, song_id, updated).await?;
    Ok(updated)
}

/// Songs liked by a user, most recent like first
pub async fn liked_songs(pool: &SqlitePool, user_id: &str) -> Result<Vec<SongSummary>> {
    let rows = sqlx::query(
        r#"
        SELECT s.id, s.title, s.duration, s.release_date, s.stream_count, s.like_count,
               s.audio_file_id, s.cover_image, s.artist_id, s.created_at,
               a.name AS artist_name, a.verified AS artist_verified, s.genre AS genre_name
        FROM likes l
        JOIN songs s ON s.id = l.song_id
        LEFT JOIN artists a ON s.artist_id = a.id
        WHERE l.user_id = ?
        ORDER BY l.created_at DESC, l.rowid DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.iter().map(summary_from_row).collect())
}

pub async fn count_likes_for_song(pool: &SqlitePool, song_id: &str) -> Result<i64> {
    let row = sqlx::query("SELECT COUNT(*) AS n FROM likes WHERE song_id = ?")
        .bind(song_id)
        .fetch_one(pool)
        .await?;

    Ok(row.get("n"))
}
