//! HTTP API handlers

pub mod albums;
pub mod artists;
pub mod auth;
pub mod files;
pub mod genres;
pub mod health;
pub mod index;
pub mod likes;
pub mod playlists;
pub mod publish;
pub mod search;
pub mod songs;

pub use albums::album_routes;
pub use artists::artist_routes;
pub use auth::auth_routes;
pub use files::file_routes;
pub use genres::genre_routes;
pub use health::health_routes;
pub use index::index_routes;
pub use likes::like_routes;
pub use playlists::playlist_routes;
pub use publish::publish_routes;
pub use search::search_routes;
pub use songs::song_routes;

use axum::{
    extract::Multipart,
    http::{Method, StatusCode, Uri},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tcha_common::time;
use tracing::debug;

use crate::blob::BlobUpload;
use crate::ApiResult;

/// Default and maximum row counts for list/search endpoints
pub(crate) const DEFAULT_PAGE_LIMIT: i64 = 20;
pub(crate) const MAX_PAGE_LIMIT: i64 = 200;

/// `?q=&limit=` query
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<i64>,
}

/// `?limit=` query
#[derive(Debug, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<i64>,
}

pub(crate) fn clamp_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT)
}

/// Fallback for unknown routes
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    debug!("No route for {} {}", method, uri);
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": {
                "code": "NOT_FOUND",
                "message": "Route not found",
            },
            "path": uri.path(),
            "method": method.as_str(),
            "timestamp": time::timestamp(),
        })),
    )
}

/// Multipart body split into text fields and file parts
#[derive(Debug, Default)]
pub(crate) struct FormParts {
    pub text: HashMap<String, String>,
    pub files: HashMap<String, BlobUpload>,
}

impl FormParts {
    pub fn text(&self, name: &str) -> Option<&str> {
        self.text.get(name).map(String::as_str)
    }

    pub fn take_file(&mut self, name: &str) -> Option<BlobUpload> {
        self.files.remove(name)
    }
}

/// Read every part; parts with a file name are files, the rest are text
pub(crate) async fn read_form(mut multipart: Multipart) -> ApiResult<FormParts> {
    let mut form = FormParts::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();

        match field.file_name().map(str::to_string) {
            Some(file_name) => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field.bytes().await?;
                form.files
                    .insert(name, BlobUpload::new(file_name, content_type, data.to_vec()));
            }
            None => {
                let value = field.text().await?;
                form.text.insert(name, value);
            }
        }
    }

    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_limit() {
        assert_eq!(clamp_limit(None), DEFAULT_PAGE_LIMIT);
        assert_eq!(clamp_limit(Some(0)), 1);
        assert_eq!(clamp_limit(Some(10_000)), MAX_PAGE_LIMIT);
    }
}
