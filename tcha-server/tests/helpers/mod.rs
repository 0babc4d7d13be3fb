//! Test Helper Utilities
//!
//! Shared utilities for tcha-server integration tests

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, Response, StatusCode},
    Router,
};
use serde_json::Value;
use sqlx::SqlitePool;
use std::io::Cursor;
use tcha_common::db::{init_database, set_setting};
use tcha_server::{build_router, AppState};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot` method

pub const BOUNDARY: &str = "tcha-test-boundary";

/// Service over a throwaway database
pub struct TestApp {
    pub state: AppState,
    // Dropped last; owns the database file
    _dir: TempDir,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_settings(&[]).await
    }

    /// Write settings before the state loads them
    pub async fn with_settings(settings: &[(&str, &str)]) -> Self {
        let dir = tempfile::tempdir().expect("Should create temp dir");
        let pool = init_database(&dir.path().join("tchamusic.db"))
            .await
            .expect("Should initialize database");

        for (key, value) in settings {
            set_setting(&pool, key, value).await.expect("Should write setting");
        }

        let state = AppState::load(pool, "").await.expect("Should load state");
        Self { state, _dir: dir }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.state.db
    }

    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router().oneshot(request).await.expect("Router should respond")
    }

    /// Register a user and return (user id, bearer token)
    pub async fn register(&self, email: &str) -> (String, String) {
        let body = serde_json::json!({
            "email": email,
            "password": "correct horse battery",
        });
        let response = self
            .send(json_request("POST", "/api/auth/register", None, &body))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let json = extract_json(response.into_body()).await;
        (
            json["user"]["id"].as_str().unwrap().to_string(),
            json["token"].as_str().unwrap().to_string(),
        )
    }
}

/// Request with an empty body and optional bearer token
pub fn test_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::empty()).unwrap()
}

pub fn json_request(method: &str, uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(serde_json::to_vec(body).unwrap())).unwrap()
}

/// One part of a multipart body
pub enum Part<'a> {
    Text(&'a str, &'a str),
    /// field name, file name, content type, bytes
    File(&'a str, &'a str, &'a str, &'a [u8]),
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File(name, file_name, content_type, data) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(data);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, token: Option<&str>, parts: &[Part<'_>]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(multipart_body(parts))).unwrap()
}

pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

pub async fn extract_bytes(body: Body) -> Vec<u8> {
    axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

/// Silent 16-bit mono WAV of the given length
pub fn wav_bytes(seconds: u32, sample_rate: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).expect("Should create WAV writer");
        for _ in 0..seconds * sample_rate {
            writer.write_sample(0i16).expect("Should write sample");
        }
        writer.finalize().expect("Should finalize WAV");
    }
    cursor.into_inner()
}

/// Smallest valid PNG header bytes; enough for a stored cover
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
