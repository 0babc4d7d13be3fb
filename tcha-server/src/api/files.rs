//! Blob upload and retrieval
//!
//! The preview URL serves the stored bytes unchanged; width and height are
//! accepted for link compatibility but no resizing happens.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tcha_common::db::{BlobRecord, ANONYMOUS_USER};
use tcha_common::{time, Error};

use super::read_form;
use crate::blob;
use crate::db::blobs;
use crate::session::{AuthSession, OptionalSession};
use crate::store::CatalogStore;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/upload
///
/// Multipart fields: `file` (required), `userId` and `type` (optional). A
/// signed-in caller owns the blob; otherwise `userId` is trusted as given.
pub async fn upload_file(
    State(state): State<AppState>,
    session: OptionalSession,
    multipart: Multipart,
) -> ApiResult<Json<Value>> {
    let mut form = read_form(multipart).await?;

    let upload = form
        .take_file("file")
        .ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let owner = match &session.0 {
        Some(s) => s.user_id.clone(),
        None => form
            .text("userId")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .unwrap_or(ANONYMOUS_USER)
            .to_string(),
    };
    let kind = form.text("type").unwrap_or("unknown").to_string();

    let stored = state.catalog.upload_blob(&upload, &owner).await?;

    Ok(Json(json!({
        "message": "File uploaded",
        "fileId": stored.record.id,
        "fileName": stored.record.file_name,
        "fileSize": stored.record.file_size,
        "fileType": stored.record.file_type,
        "type": kind,
        "urls": stored.urls,
        "uploadedAt": time::timestamp(),
    })))
}

async fn load_content(state: &AppState, id: &str) -> ApiResult<(BlobRecord, Vec<u8>)> {
    let (record, encoded) = blobs::load_blob_content(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("File {}", id)))?;
    let data = blob::decode(&encoded)?;
    Ok((record, data))
}

fn content_disposition(kind: &str, file_name: &str) -> HeaderValue {
    let safe_name: String = file_name
        .chars()
        .filter(|c| *c != '"' && *c != '\\' && !c.is_control())
        .collect();
    HeaderValue::from_str(&format!("{}; filename=\"{}\"", kind, safe_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

fn blob_response(record: &BlobRecord, data: Vec<u8>, disposition: &str) -> Response {
    let content_type = HeaderValue::from_str(&record.file_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CONTENT_DISPOSITION,
                content_disposition(disposition, &record.file_name),
            ),
        ],
        data,
    )
        .into_response()
}

/// GET /api/files/:id/view
pub async fn view_file(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Response> {
    let (record, data) = load_content(&state, &id).await?;
    Ok(blob_response(&record, data, "inline"))
}

/// GET /api/files/:id/download
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let (record, data) = load_content(&state, &id).await?;
    Ok(blob_response(&record, data, "attachment"))
}

/// GET /api/files/:id/preview
pub async fn preview_file(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Response> {
    let (record, data) = load_content(&state, &id).await?;
    Ok(blob_response(&record, data, "inline"))
}

/// DELETE /api/files/:id
///
/// Only the uploader may delete. Songs still referencing the blob keep the
/// dangling id.
pub async fn delete_file(
    State(state): State<AppState>,
    session: AuthSession,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let record = blobs::load_blob_record(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("File {}", id)))?;

    if record.uploaded_by != session.user_id {
        return Err(Error::Forbidden("Only the uploader can delete this file".to_string()).into());
    }

    state.catalog.delete_blob(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub fn file_routes() -> Router<AppState> {
    Router::new()
        .route("/api/upload", post(upload_file))
        .route("/api/files/:id", delete(delete_file))
        .route("/api/files/:id/view", get(view_file))
        .route("/api/files/:id/download", get(download_file))
        .route("/api/files/:id/preview", get(preview_file))
}
