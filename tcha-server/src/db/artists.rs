//! Artist database operations

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tcha_common::db::{Artist, ArtistUpdate, NewArtist};
use tcha_common::time;
use tcha_common::Result;
use uuid::Uuid;

use super::like_pattern;

const ARTIST_COLUMNS: &str = "id, user_id, name, bio, avatar, cover_image, country, verified, \
                              monthly_listeners, total_streams, created_at";

pub(crate) fn artist_from_row(row: &SqliteRow) -> Artist {
    Artist {
        id: row.get("id"),
        user_id: row.get("user_id"),
        name: row.get("name"),
        bio: row.get("bio"),
        avatar: row.get("avatar"),
        cover_image: row.get("cover_image"),
        country: row.get("country"),
        verified: row.get("verified"),
        monthly_listeners: row.get("monthly_listeners"),
        total_streams: row.get("total_streams"),
        created_at: row.get("created_at"),
    }
}

/// Exact-name lookup; with duplicates the earliest-created row wins
pub async fn find_artist_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Artist>> {
    let sql = format!(
        "SELECT {} FROM artists WHERE name = ? ORDER BY created_at ASC, rowid ASC LIMIT 1",
        ARTIST_COLUMNS
    );
    let row = sqlx::query(&sql).bind(name).fetch_optional(pool).await?;

    Ok(row.as_ref().map(artist_from_row))
}

/// Insert an artist unconditionally (no duplicate check)
pub async fn insert_artist(pool: &SqlitePool, artist: &NewArtist) -> Result<Artist> {
    let created = Artist {
        id: Uuid::new_v4().to_string(),
        user_id: artist.user_id.clone(),
        name: artist.name.clone(),
        bio: artist.bio.clone(),
        avatar: artist.avatar.clone(),
        cover_image: artist.cover_image.clone(),
        country: artist.country.clone(),
        verified: artist.verified,
        monthly_listeners: artist.monthly_listeners,
        total_streams: 0,
        created_at: time::timestamp(),
    };

    sqlx::query(
        r#"
        INSERT INTO artists (
            id, user_id, name, bio, avatar, cover_image, country, verified,
            monthly_listeners, total_streams, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&created.id)
    .bind(&created.user_id)
    .bind(&created.name)
    .bind(&created.bio)
    .bind(&created.avatar)
    .bind(&created.cover_image)
    .bind(&created.country)
    .bind(created.verified)
    .bind(created.monthly_listeners)
    .bind(created.total_streams)
    .bind(&created.created_at)
    .execute(pool)
    .await?;

    Ok(created)
}

pub async fn load_artist(pool: &SqlitePool, id: &str) -> Result<Option<Artist>> {
    let sql = format!("SELECT {} FROM artists WHERE id = ?", ARTIST_COLUMNS);
    let row = sqlx::query(&sql).bind(id).fetch_optional(pool).await?;

    Ok(row.as_ref().map(artist_from_row))
}

pub async fn update_artist(
    pool: &SqlitePool,
    id: &str,
    update: &ArtistUpdate,
) -> Result<Option<Artist>> {
    sqlx::query(
        r#"
        UPDATE artists SET
            name = COALESCE(?, name),
            bio = COALESCE(?, bio),
            avatar = COALESCE(?, avatar),
            cover_image = COALESCE(?, cover_image),
            country = COALESCE(?, country)
        WHERE id = ?
        "#,
    )
    .bind(&update.name)
    .bind(&update.bio)
    .bind(&update.avatar)
    .bind(&update.cover_image)
    .bind(&update.country)
    .bind(id)
    .execute(pool)
    .await?;

    load_artist(pool, id).await
}

/// Delete an artist nothing refers to
///
/// Returns false when the artist is missing or still has songs or albums.
pub async fn delete_unreferenced_artist(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query(
        r#"
        DELETE FROM artists
        WHERE id = ?1
          AND NOT EXISTS (SELECT 1 FROM songs WHERE artist_id = ?1)
          AND NOT EXISTS (SELECT 1 FROM albums WHERE artist_id = ?1)
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Artists ordered by audience (monthly listeners, then name)
pub async fn list_artists(pool: &SqlitePool, limit: i64) -> Result<Vec<Artist>> {
    let sql = format!(
        "SELECT {} FROM artists ORDER BY monthly_listeners DESC, name ASC LIMIT ?",
        ARTIST_COLUMNS
    );
    let rows = sqlx::query(&sql).bind(limit).fetch_all(pool).await?;

    Ok(rows.iter().map(artist_from_row).collect())
}

/// Case-insensitive substring search on the artist name
pub async fn search_artists(pool: &SqlitePool, term: &str, limit: i64) -> Result<Vec<Artist>> {
    let sql = format!(
        "SELECT {} FROM artists WHERE name LIKE ? ESCAPE '\\' ORDER BY name ASC LIMIT ?",
        ARTIST_COLUMNS
    );
    let rows = sqlx::query(&sql)
        .bind(like_pattern(term))
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows.iter().map(artist_from_row).collect())
}

pub async fn count_artists_named(pool: &SqlitePool, name: &str) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM artists WHERE name = ?")
        .bind(name)
        .fetch_one(pool)
        .await?;

    Ok(count)
}
