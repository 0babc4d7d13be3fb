//! Root index, connectivity probe and aggregate statistics

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use sqlx::Row;
use tcha_common::time;

use crate::db::stats::load_counts;
use crate::{ApiResult, AppState};

/// GET /
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Welcome to the TchaMusic API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "test": "/api/test",
            "songs": "/api/songs",
            "genres": "/api/genres",
            "upload": "POST /api/upload",
            "artists": "POST /api/artists",
            "publish": "POST /api/publish",
            "search": "/api/search?q=",
            "stats": "/api/stats",
            "health": "/health",
        },
        "timestamp": time::timestamp(),
    }))
}

/// GET /api/test
///
/// Runs `SELECT 1 AS test` and returns the raw rows.
pub async fn connection_test(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let rows = sqlx::query("SELECT 1 AS test")
        .fetch_all(&state.db)
        .await
        .map_err(tcha_common::Error::from)?;

    let data: Vec<Value> = rows
        .iter()
        .map(|row| json!({ "test": row.get::<i64, _>("test") }))
        .collect();

    Ok(Json(json!({
        "message": "Database connection OK",
        "data": data,
        "storage": "SQLite database storage active",
        "timestamp": time::timestamp(),
    })))
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let counts = load_counts(&state.db).await?;

    Ok(Json(json!({
        "songs": counts.songs,
        "artists": counts.artists,
        "genres": counts.genres,
        "albums": counts.albums,
        "playlists": counts.playlists,
        "timestamp": time::timestamp(),
    })))
}

pub fn index_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/api/test", get(connection_test))
        .route("/api/stats", get(stats))
}
