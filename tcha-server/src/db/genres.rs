//! Genre queries

use sqlx::{Row, SqlitePool};
use tcha_common::db::Genre;
use tcha_common::Result;

/// All genres, alphabetical
pub async fn list_genres(pool: &SqlitePool) -> Result<Vec<Genre>> {
    let rows = sqlx::query("SELECT id, name FROM genres ORDER BY name")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|row| Genre {
            id: row.get("id"),
            name: row.get("name"),
        })
        .collect())
}
