//! Key/value runtime settings stored in the `settings` table

use crate::Result;
use sqlx::SqlitePool;
use tracing::{info, warn};

/// Maximum accepted blob size in bytes (100 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Number of songs returned by the public listing
pub const DEFAULT_SONG_LIST_LIMIT: i64 = 50;

/// Session lifetime (30 days)
pub const DEFAULT_SESSION_TIMEOUT_SECONDS: i64 = 30 * 24 * 60 * 60;

/// Default preview edge length in pixels
pub const DEFAULT_PREVIEW_SIZE: u32 = 400;

/// Read a setting value, `None` when missing or NULL
pub async fn get_setting(pool: &SqlitePool, key: &str) -> Result<Option<String>> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value.flatten())
}

/// Insert or replace a setting value
pub async fn set_setting(pool: &SqlitePool, key: &str, value: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO settings (key, value, updated_at) VALUES (?, ?, CURRENT_TIMESTAMP)
        ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = CURRENT_TIMESTAMP
        "#,
    )
    .bind(key)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize default settings
///
/// Creates missing settings and resets NULL values to their defaults.
pub async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, "max_upload_bytes", &DEFAULT_MAX_UPLOAD_BYTES.to_string()).await?;
    ensure_setting(pool, "song_list_limit", &DEFAULT_SONG_LIST_LIMIT.to_string()).await?;
    ensure_setting(
        pool,
        "session_timeout_seconds",
        &DEFAULT_SESSION_TIMEOUT_SECONDS.to_string(),
    )
    .await?;
    ensure_setting(pool, "preview_default_size", &DEFAULT_PREVIEW_SIZE.to_string()).await?;

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it will be created with the default.
/// If the setting exists but has a NULL value, it will be reset to the default.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let existing: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    match existing {
        None => {
            // INSERT OR IGNORE: two processes may initialize the same file
            sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
                .bind(key)
                .bind(default_value)
                .execute(pool)
                .await?;
            info!("Initialized setting '{}' with default value: {}", key, default_value);
        }
        Some(None) => {
            sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
                .bind(default_value)
                .bind(key)
                .execute(pool)
                .await?;
            warn!("Setting '{}' was NULL, reset to default: {}", key, default_value);
        }
        Some(Some(_)) => {}
    }

    Ok(())
}
