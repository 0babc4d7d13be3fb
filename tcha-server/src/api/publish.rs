//! Publish endpoint
//!
//! Runs the publish workflow once per request over the shared catalog.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};

use super::read_form;
use crate::publish::{PublishForm, PublishOrchestrator, PublishOutcome};
use crate::session::OptionalSession;
use crate::{ApiError, ApiResult, AppState};

/// POST /api/publish
///
/// Multipart fields: `title`, `artistName`, `genre`, `duration` (seconds),
/// `albumId`, `audio` (file) and `cover` (optional image file). A failure
/// after the first upload answers with `failedAt` and the orphaned
/// resources.
pub async fn publish(
    State(state): State<AppState>,
    session: OptionalSession,
    multipart: Multipart,
) -> ApiResult<(StatusCode, Json<PublishOutcome>)> {
    let mut parts = read_form(multipart).await?;

    let duration = match parts.text("duration").map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => Some(raw.parse::<i64>().ok().filter(|d| *d >= 0).ok_or_else(|| {
            ApiError::BadRequest(format!("Invalid duration: {}", raw))
        })?),
        None => None,
    };

    let cover = parts.take_file("cover").filter(|c| !c.is_empty());
    if let Some(cover) = &cover {
        if !cover.is_image() {
            return Err(ApiError::BadRequest(format!(
                "Cover must be an image, got '{}'",
                cover.content_type
            )));
        }
    }

    let form = PublishForm {
        title: parts.text("title").unwrap_or_default().to_string(),
        artist_name: parts.text("artistName").unwrap_or_default().to_string(),
        genre: parts.text("genre").map(str::to_string),
        album_id: parts
            .text("albumId")
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string),
        duration,
        audio: parts.take_file("audio"),
        cover,
    };

    let mut orchestrator = PublishOrchestrator::new(state.catalog.clone());
    orchestrator.set_form(form);
    let outcome = orchestrator.publish(session.0.as_ref()).await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

/// `body_limit` covers the whole form, audio and cover together
pub fn publish_routes(body_limit: usize) -> Router<AppState> {
    Router::new()
        .route("/api/publish", post(publish))
        .layer(DefaultBodyLimit::max(body_limit))
}
