//! Album database operations

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tcha_common::db::{Album, AlbumType, AlbumUpdate, NewAlbum};
use tcha_common::time;
use tcha_common::Result;
use uuid::Uuid;

use super::like_pattern;

const ALBUM_COLUMNS: &str = "id, title, artist_id, cover_image, release_date, genre, album_type, \
                             total_tracks, duration, description, total_streams, owner_id, created_at";

fn album_from_row(row: &SqliteRow) -> Album {
    let album_type: String = row.get("album_type");
    Album {
        id: row.get("id"),
        title: row.get("title"),
        artist_id: row.get("artist_id"),
        cover_image: row.get("cover_image"),
        release_date: row.get("release_date"),
        genre: row.get("genre"),
        // CHECK constraint keeps the column within the known set
        album_type: AlbumType::parse(&album_type).unwrap_or_default(),
        total_tracks: row.get("total_tracks"),
        duration: row.get("duration"),
        description: row.get("description"),
        total_streams: row.get("total_streams"),
        owner_id: row.get("owner_id"),
        created_at: row.get("created_at"),
    }
}

pub async fn insert_album(pool: &SqlitePool, album: &NewAlbum, owner_id: &str) -> Result<Album> {
    let created = Album {
        id: Uuid::new_v4().to_string(),
        title: album.title.clone(),
        artist_id: album.artist_id.clone(),
        cover_image: album.cover_image.clone(),
        release_date: album.release_date.clone(),
        genre: album.genre.clone(),
        album_type: album.album_type,
        total_tracks: album.total_tracks,
        duration: album.duration,
        description: album.description.clone(),
        total_streams: 0,
        owner_id: owner_id.to_string(),
        created_at: time::timestamp(),
    };

    sqlx::query(
        r#"
        INSERT INTO albums (
            id, title, artist_id, cover_image, release_date, genre, album_type,
            total_tracks, duration, description, total_streams, owner_id, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(&created.id)
    .bind(&created.title)
    .bind(&created.artist_id)
    .bind(&created.cover_image)
    .bind(&created.release_date)
    .bind(&created.genre)
    .bind(created.album_type.as_str())
    .bind(created.total_tracks)
    .bind(created.duration)
    .bind(&created.description)
    .bind(&created.owner_id)
    .bind(&created.created_at)
    .execute(pool)
    .await?;

    Ok(created)
}

pub async fn load_album(pool: &SqlitePool, id: &str) -> Result<Option<Album>> {
    let sql = format!("SELECT {} FROM albums WHERE id = ?", ALBUM_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    Ok(row.as_ref().map(album_from_row))
}

pub async fn update_album(
    pool: &SqlitePool,
    id: &str,
    update: &AlbumUpdate,
) -> Result<Option<Album>> {
    sqlx::query(
        r#"
        UPDATE albums SET
            title = COALESCE(?, title),
            cover_image = COALESCE(?, cover_image),
            release_date = COALESCE(?, release_date),
            genre = COALESCE(?, genre),
            album_type = COALESCE(?, album_type),
            description = COALESCE(?, description)
        WHERE id = ?
        "#,
    )
    .bind(&update.title)
    .bind(&update.cover_image)
    .bind(&update.release_date)
    .bind(&update.genre)
    .bind(update.album_type.map(|t| t.as_str()))
    .bind(&update.description)
    .bind(id)
    .execute(pool)
    .await?;

    load_album(pool, id).await
}

/// Songs on the album stay in the catalog with no album
pub async fn delete_album(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM albums WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Newest albums first
pub async fn list_albums(pool: &SqlitePool, limit: i64) -> Result<Vec<Album>> {
    let sql = format!(
        "SELECT {} FROM albums ORDER BY created_at DESC, rowid DESC LIMIT ?",
        ALBUM_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(limit).fetch_all(pool).await?;

    Ok(rows.iter().map(album_from_row).collect())
}

pub async fn albums_by_artist(pool: &SqlitePool, artist_id: &str) -> Result<Vec<Album>> {
    let sql = format!(
        "SELECT {} FROM albums WHERE artist_id = ? ORDER BY release_date DESC, created_at DESC",
        ALBUM_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(artist_id).fetch_all(pool).await?;

    Ok(rows.iter().map(album_from_row).collect())
}

pub async fn search_albums(pool: &SqlitePool, term: &str, limit: i64) -> Result<Vec<Album>> {
    let sql = format!(
        "SELECT {} FROM albums WHERE title LIKE ? ESCAPE '\\' ORDER BY title ASC LIMIT ?",
        ALBUM_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(like_pattern(term))
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(album_from_row).collect())
}
