//! Aggregate counts for `GET /api/stats`

use serde::Serialize;
use sqlx::SqlitePool;
use tcha_common::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogCounts {
    /// Public songs only
    pub songs: i64,
    pub artists: i64,
    pub genres: i64,
    pub albums: i64,
    /// Public playlists only
    pub playlists: i64,
}

async fn count(pool: &SqlitePool, sql: &str) -> Result<i64> {
    let value: i64 = sqlx::query_scalar(sql).fetch_one(pool).await?;
    Ok(value)
}

pub async fn load_counts(pool: &SqlitePool) -> Result<CatalogCounts> {
    Ok(CatalogCounts {
        songs: count(pool, "SELECT COUNT(*) FROM songs WHERE is_public = 1").await?,
        artists: count(pool, "SELECT COUNT(*) FROM artists").await?,
        genres: count(pool, "SELECT COUNT(*) FROM genres").await?,
        albums: count(pool, "SELECT COUNT(*) FROM albums").await?,
        playlists: count(pool, "SELECT COUNT(*) FROM playlists WHERE is_public = 1").await?,
    })
}
