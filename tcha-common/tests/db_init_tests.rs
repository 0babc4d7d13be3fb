//! Database initialization on first run and on reopen

use sqlx::Row;
use tcha_common::db::init::{init_database, SEED_GENRES};
use tcha_common::db::settings::{get_setting, set_setting};

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("sub").join("tchamusic.db");

    let result = init_database(&db_path).await;
    assert!(result.is_ok(), "Database initialization failed: {:?}", result.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_opens_existing() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("tchamusic.db");

    let pool1 = init_database(&db_path).await.unwrap();
    pool1.close().await;

    let pool2 = init_database(&db_path).await;
    assert!(pool2.is_ok(), "Failed to open existing database: {:?}", pool2.err());
}

#[tokio::test]
async fn test_all_tables_created() {
    let temp = tempfile::tempdir().unwrap();
    let pool = init_database(&temp.path().join("tchamusic.db")).await.unwrap();

    let tables: Vec<String> =
        sqlx::query_scalar("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
            .fetch_all(&pool)
            .await
            .unwrap();

    for expected in [
        "albums",
        "artists",
        "file_storage",
        "genres",
        "likes",
        "playlist_tracks",
        "playlists",
        "sessions",
        "settings",
        "songs",
        "users",
    ] {
        assert!(tables.iter().any(|t| t == expected), "missing table {}", expected);
    }
}

#[tokio::test]
async fn test_default_settings_initialized() {
    let temp = tempfile::tempdir().unwrap();
    let pool = init_database(&temp.path().join("tchamusic.db")).await.unwrap();

    assert_eq!(
        get_setting(&pool, "max_upload_bytes").await.unwrap().as_deref(),
        Some("104857600")
    );
    assert_eq!(
        get_setting(&pool, "song_list_limit").await.unwrap().as_deref(),
        Some("50")
    );
    assert_eq!(
        get_setting(&pool, "session_timeout_seconds").await.unwrap().as_deref(),
        Some("2592000")
    );
    assert_eq!(
        get_setting(&pool, "preview_default_size").await.unwrap().as_deref(),
        Some("400")
    );
}

#[tokio::test]
async fn test_custom_setting_survives_reinit() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("tchamusic.db");

    let pool = init_database(&db_path).await.unwrap();
    set_setting(&pool, "song_list_limit", "10").await.unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(
        get_setting(&pool, "song_list_limit").await.unwrap().as_deref(),
        Some("10")
    );
}

#[tokio::test]
async fn test_null_setting_reset_to_default() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("tchamusic.db");

    let pool = init_database(&db_path).await.unwrap();
    sqlx::query("UPDATE settings SET value = NULL WHERE key = 'max_upload_bytes'")
        .execute(&pool)
        .await
        .unwrap();
    pool.close().await;

    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(
        get_setting(&pool, "max_upload_bytes").await.unwrap().as_deref(),
        Some("104857600")
    );
}

#[tokio::test]
async fn test_genres_seeded_once() {
    let temp = tempfile::tempdir().unwrap();
    let db_path = temp.path().join("tchamusic.db");

    let pool = init_database(&db_path).await.unwrap();
    pool.close().await;
    let pool = init_database(&db_path).await.unwrap();

    let rows = sqlx::query("SELECT name FROM genres ORDER BY id")
        .fetch_all(&pool)
        .await
        .unwrap();
    let names: Vec<String> = rows.iter().map(|r| r.get("name")).collect();

    assert_eq!(names.len(), SEED_GENRES.len());
    assert_eq!(names[0], "Hip-Hop");
    assert!(names.iter().any(|n| n == "Électro"));
}

#[tokio::test]
async fn test_foreign_keys_enabled_on_every_connection() {
    let temp = tempfile::tempdir().unwrap();
    let pool = init_database(&temp.path().join("tchamusic.db")).await.unwrap();

    // A song pointing at a missing artist must be refused
    let result = sqlx::query(
        "INSERT INTO songs (id, title, artist_id, audio_file_id, release_date, created_at)
         VALUES ('s1', 'Orphan', 'no-such-artist', 'f1', '2024-01-01', '2024-01-01T00:00:00.000Z')",
    )
    .execute(&pool)
    .await;

    assert!(result.is_err());
}
