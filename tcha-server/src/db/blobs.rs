//! Blob (file_storage) database operations
//!
//! Content is stored base64-encoded; metadata queries never load it.

use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tcha_common::db::BlobRecord;
use tcha_common::time;
use tcha_common::Result;
use uuid::Uuid;

fn blob_from_row(row: &SqliteRow) -> BlobRecord {
    BlobRecord {
        id: row.get("id"),
        file_name: row.get("file_name"),
        file_type: row.get("file_type"),
        file_size: row.get("file_size"),
        uploaded_by: row.get("uploaded_by"),
        created_at: row.get("created_at"),
    }
}

pub async fn insert_blob(
    pool: &SqlitePool,
    file_name: &str,
    file_type: &str,
    file_size: i64,
    encoded_data: &str,
    uploaded_by: &str,
) -> Result<BlobRecord> {
    let record = BlobRecord {
        id: Uuid::new_v4().to_string(),
        file_name: file_name.to_string(),
        file_type: file_type.to_string(),
        file_size,
        uploaded_by: uploaded_by.to_string(),
        created_at: time::timestamp(),
    };

    sqlx::query(
        r#"
        INSERT INTO file_storage (id, file_name, file_type, file_size, file_data, uploaded_by, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.file_name)
    .bind(&record.file_type)
    .bind(record.file_size)
    .bind(encoded_data)
    .bind(&record.uploaded_by)
    .bind(&record.created_at)
    .execute(pool)
    .await?;

    Ok(record)
}

pub async fn load_blob_record(pool: &SqlitePool, id: &str) -> Result<Option<BlobRecord>> {
    let row = sqlx::query(
        "SELECT id, file_name, file_type, file_size, uploaded_by, created_at \
         FROM file_storage WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.as_ref().map(blob_from_row))
}

/// Metadata plus the still-encoded content
pub async fn load_blob_content(
    pool: &SqlitePool,
    id: &str,
) -> Result<Option<(BlobRecord, String)>> {
    let row = sqlx::query(
        "SELECT id, file_name, file_type, file_size, uploaded_by, created_at, file_data \
         FROM file_storage WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| (blob_from_row(&row), row.get("file_data"))))
}

pub async fn delete_blob(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM file_storage WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
