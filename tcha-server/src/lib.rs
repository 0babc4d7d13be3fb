//! tcha-server library
//!
//! HTTP service for TchaMusic: catalog browsing, blob storage, the publish
//! workflow and the song metadata editor, over a single SQLite catalog.

pub mod api;
pub mod audio;
pub mod blob;
pub mod config;
pub mod db;
pub mod editor;
pub mod error;
pub mod publish;
pub mod session;
pub mod store;

pub use crate::error::{ApiError, ApiResult};

use axum::extract::DefaultBodyLimit;
use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::blob::UrlBuilder;
use crate::config::RuntimeSettings;
use crate::store::SqliteCatalog;

/// Room for multipart boundaries and text fields on top of the blob cap
pub const MULTIPART_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Catalog store used by the publish workflow and the editor
    pub catalog: SqliteCatalog,
    /// Runtime settings read at startup
    pub settings: RuntimeSettings,
    /// Service startup timestamp for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(db: SqlitePool, settings: RuntimeSettings, public_base_url: &str) -> Self {
        let urls = UrlBuilder::new(public_base_url, settings.preview_default_size);
        let catalog = SqliteCatalog::new(db.clone(), settings.max_upload_bytes, urls);
        Self {
            db,
            catalog,
            settings,
            startup_time: Utc::now(),
        }
    }

    /// Build state with runtime settings loaded from the database
    pub async fn load(db: SqlitePool, public_base_url: &str) -> tcha_common::Result<Self> {
        let settings = RuntimeSettings::load(&db).await?;
        Ok(Self::new(db, settings, public_base_url))
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    let blob_cap = usize::try_from(state.settings.max_upload_bytes).unwrap_or(usize::MAX);
    let body_limit = blob_cap.saturating_add(MULTIPART_OVERHEAD_BYTES);
    // Publish carries an audio file and a cover, each allowed up to the cap
    let publish_limit = blob_cap
        .saturating_mul(2)
        .saturating_add(MULTIPART_OVERHEAD_BYTES);

    Router::new()
        .merge(api::index_routes())
        .merge(api::health_routes())
        .merge(api::auth_routes())
        .merge(api::genre_routes())
        .merge(api::song_routes())
        .merge(api::like_routes())
        .merge(api::artist_routes())
        .merge(api::album_routes())
        .merge(api::playlist_routes())
        .merge(api::file_routes())
        .merge(api::publish_routes(publish_limit))
        .merge(api::search_routes())
        .fallback(api::not_found)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}
