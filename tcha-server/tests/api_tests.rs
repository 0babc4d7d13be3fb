//! Integration tests for tcha-server API endpoints
//!
//! Tests cover:
//! - Service info: health, root, connection test, stats, 404 fallback
//! - Blob upload limits and retrieval headers
//! - Artist find-or-create over HTTP
//! - Accounts and sessions
//! - Likes, playlists and search

mod helpers;

use axum::http::{header, StatusCode};
use helpers::*;
use serde_json::json;
use tcha_common::time;
use tcha_server::db::users;

// =============================================================================
// Service Info
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = TestApp::new().await;

    let response = app.send(test_request("GET", "/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["service"], "TchaMusic API");
    assert!(body["version"].is_string());
    assert!(body["uptimeSeconds"].as_i64().unwrap() >= 0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let app = TestApp::new().await;

    let response = app.send(test_request("GET", "/", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["endpoints"]["songs"], "/api/songs");
    assert_eq!(body["endpoints"]["health"], "/health");
}

#[tokio::test]
async fn test_connection_test_returns_rows() {
    let app = TestApp::new().await;

    let response = app.send(test_request("GET", "/api/test", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["data"], json!([{ "test": 1 }]));
}

#[tokio::test]
async fn test_genres_are_seeded_and_sorted() {
    let app = TestApp::new().await;

    let response = app.send(test_request("GET", "/api/genres", None)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let names: Vec<String> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|g| g["name"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(names.len(), 10);
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);
    assert!(names.contains(&"Hip-Hop".to_string()));
}

#[tokio::test]
async fn test_stats_on_empty_catalog() {
    let app = TestApp::new().await;

    let response = app.send(test_request("GET", "/api/stats", None)).await;
    let body = extract_json(response.into_body()).await;

    assert_eq!(body["songs"], 0);
    assert_eq!(body["artists"], 0);
    assert_eq!(body["genres"], 10);
    assert_eq!(body["playlists"], 0);
}

#[tokio::test]
async fn test_unknown_route_fallback() {
    let app = TestApp::new().await;

    let response = app.send(test_request("GET", "/api/nothing-here", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
    assert_eq!(body["path"], "/api/nothing-here");
    assert_eq!(body["method"], "GET");
}

#[tokio::test]
async fn test_missing_song_is_404() {
    let app = TestApp::new().await;

    let response = app.send(test_request("GET", "/api/songs/no-such-id", None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

// =============================================================================
// Blob Upload
// =============================================================================

#[tokio::test]
async fn test_upload_at_cap_is_accepted() {
    let app = TestApp::with_settings(&[("max_upload_bytes", "64")]).await;
    let data = vec![7u8; 64];

    let response = app
        .send(multipart_request(
            "/api/upload",
            None,
            &[
                Part::File("file", "clip.bin", "application/octet-stream", &data),
                Part::Text("userId", "uploader-1"),
                Part::Text("type", "audio"),
            ],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["fileSize"], 64);
    assert_eq!(body["fileName"], "clip.bin");
    assert_eq!(body["type"], "audio");

    let id = body["fileId"].as_str().unwrap();
    assert_eq!(body["urls"]["view"], format!("/api/files/{}/view", id));
    assert_eq!(
        body["urls"]["preview"],
        format!("/api/files/{}/preview?width=400&height=400", id)
    );
}

#[tokio::test]
async fn test_upload_over_cap_is_rejected() {
    let app = TestApp::with_settings(&[("max_upload_bytes", "64")]).await;
    let data = vec![7u8; 65];

    let response = app
        .send(multipart_request(
            "/api/upload",
            None,
            &[Part::File("file", "clip.bin", "application/octet-stream", &data)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_upload_empty_file_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .send(multipart_request(
            "/api/upload",
            None,
            &[Part::File("file", "empty.bin", "application/octet-stream", &[])],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_without_file_is_rejected() {
    let app = TestApp::new().await;

    let response = app
        .send(multipart_request("/api/upload", None, &[Part::Text("type", "audio")]))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_view_and_download_headers() {
    let app = TestApp::new().await;
    let data = b"ID3 pretend mp3 bytes".to_vec();

    let response = app
        .send(multipart_request(
            "/api/upload",
            None,
            &[Part::File("file", "track.mp3", "audio/mpeg", &data)],
        ))
        .await;
    let id = extract_json(response.into_body()).await["fileId"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .send(test_request("GET", &format!("/api/files/{}/view", id), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "inline; filename=\"track.mp3\""
    );
    assert_eq!(extract_bytes(response.into_body()).await, data);

    let response = app
        .send(test_request("GET", &format!("/api/files/{}/download", id), None))
        .await;
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"track.mp3\""
    );

    let response = app
        .send(test_request("GET", "/api/files/missing/view", None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_uploader_deletes_file() {
    let app = TestApp::new().await;
    let (_, owner_token) = app.register("owner@example.org").await;
    let (_, other_token) = app.register("other@example.org").await;

    let response = app
        .send(multipart_request(
            "/api/upload",
            Some(&owner_token),
            &[Part::File("file", "cover.png", "image/png", PNG_BYTES)],
        ))
        .await;
    let id = extract_json(response.into_body()).await["fileId"]
        .as_str()
        .unwrap()
        .to_string();
    let uri = format!("/api/files/{}", id);

    let response = app.send(test_request("DELETE", &uri, Some(&other_token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(test_request("DELETE", &uri, Some(&owner_token))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app
        .send(test_request("GET", &format!("{}/view", uri), None))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// =============================================================================
// Artists
// =============================================================================

#[tokio::test]
async fn test_artist_find_or_create() {
    let app = TestApp::new().await;

    let response = app
        .send(json_request(
            "POST",
            "/api/artists",
            None,
            &json!({ "name": "Test Artist", "bio": "first" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = extract_json(response.into_body()).await;
    assert_eq!(created["name"], "Test Artist");
    assert_eq!(created["verified"], false);
    assert_eq!(created["userId"], "anonymous");

    let response = app
        .send(json_request(
            "POST",
            "/api/artists",
            None,
            &json!({ "name": "  Test Artist ", "bio": "second" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let found = extract_json(response.into_body()).await;
    assert_eq!(found["id"], created["id"]);
    assert_eq!(found["bio"], "first");
}

#[tokio::test]
async fn test_artist_blank_name_rejected() {
    let app = TestApp::new().await;

    let response = app
        .send(json_request("POST", "/api/artists", None, &json!({ "name": "   " })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Accounts
// =============================================================================

#[tokio::test]
async fn test_register_login_logout() {
    let app = TestApp::new().await;
    let (user_id, token) = app.register("Listener@Example.org").await;

    let response = app.send(test_request("GET", "/api/auth/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = extract_json(response.into_body()).await;
    assert_eq!(me["id"], user_id.as_str());
    assert_eq!(me["email"], "listener@example.org");
    assert_eq!(me["username"], "listener");

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "listener@example.org", "password": "wrong password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "listener@example.org", "password": "correct horse battery" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let second_token = extract_json(response.into_body()).await["token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app.send(test_request("POST", "/api/auth/logout", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(test_request("GET", "/api/auth/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(test_request("GET", "/api/auth/me", Some(&second_token)))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_register_rejects_duplicates_and_short_passwords() {
    let app = TestApp::new().await;
    app.register("fan@example.org").await;

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({ "email": "fan@example.org", "password": "another password" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/register",
            None,
            &json!({ "email": "new@example.org", "password": "short" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_token_is_unauthorized() {
    let app = TestApp::new().await;

    let response = app
        .send(test_request("GET", "/api/auth/me", Some("not-a-real-token")))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_password_is_stored_as_argon2_hash() {
    let app = TestApp::new().await;
    app.register("fan@example.org").await;

    let credentials = users::load_credentials(app.db(), "fan@example.org")
        .await
        .unwrap()
        .unwrap();
    assert!(credentials.password_hash.starts_with("$argon2id$"));
    assert!(!credentials.password_hash.contains("correct horse battery"));
}

#[tokio::test]
async fn test_login_purges_expired_sessions() {
    let app = TestApp::new().await;
    let (user_id, token) = app.register("fan@example.org").await;
    users::insert_session(app.db(), "stale-digest", &user_id, "2000-01-01T00:00:00.000Z")
        .await
        .unwrap();

    let response = app
        .send(json_request(
            "POST",
            "/api/auth/login",
            None,
            &json!({ "email": "fan@example.org", "password": "correct horse battery" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let stale: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM sessions WHERE token_hash = 'stale-digest'")
            .fetch_one(app.db())
            .await
            .unwrap();
    assert_eq!(stale, 0);

    // Live sessions survive the sweep
    let response = app.send(test_request("GET", "/api/auth/me", Some(&token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        users::purge_expired_sessions(app.db(), &time::timestamp()).await.unwrap(),
        0
    );
}

// =============================================================================
// Songs, Likes, Playlists, Search
// =============================================================================

/// Publish a short song over HTTP and return its id
async fn publish_song(app: &TestApp, token: &str, title: &str, artist: &str) -> String {
    let audio = wav_bytes(1, 8000);
    let response = app
        .send(multipart_request(
            "/api/publish",
            Some(token),
            &[
                Part::Text("title", title),
                Part::Text("artistName", artist),
                Part::Text("genre", "Pop"),
                Part::File("audio", "song.wav", "audio/wav", &audio),
            ],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response.into_body()).await["song"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_published_song_is_listed() {
    let app = TestApp::new().await;
    let (_, token) = app.register("artist@example.org").await;
    let song_id = publish_song(&app, &token, "Night Drive", "Luna Park").await;

    let response = app.send(test_request("GET", "/api/songs", None)).await;
    let body = extract_json(response.into_body()).await;
    let songs = body.as_array().unwrap();
    assert_eq!(songs.len(), 1);
    assert_eq!(songs[0]["id"], song_id.as_str());
    assert_eq!(songs[0]["artistName"], "Luna Park");
    assert_eq!(songs[0]["duration"], 1);

    let response = app
        .send(test_request("POST", &format!("/api/songs/{}/stream", song_id), None))
        .await;
    assert_eq!(extract_json(response.into_body()).await["streamCount"], 1);
}

#[tokio::test]
async fn test_like_and_unlike() {
    let app = TestApp::new().await;
    let (_, token) = app.register("artist@example.org").await;
    let (_, fan_token) = app.register("fan@example.org").await;
    let song_id = publish_song(&app, &token, "Night Drive", "Luna Park").await;
    let uri = format!("/api/songs/{}/like", song_id);

    let response = app.send(test_request("POST", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.send(test_request("POST", &uri, Some(&fan_token))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(extract_json(response.into_body()).await["likeCount"], 1);

    let response = app.send(test_request("POST", &uri, Some(&fan_token))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app.send(test_request("GET", &uri, Some(&fan_token))).await;
    assert_eq!(extract_json(response.into_body()).await["liked"], true);

    let response = app
        .send(test_request("GET", "/api/me/likes", Some(&fan_token)))
        .await;
    assert_eq!(extract_json(response.into_body()).await.as_array().unwrap().len(), 1);

    let response = app.send(test_request("DELETE", &uri, Some(&fan_token))).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await["likeCount"], 0);

    let response = app.send(test_request("DELETE", &uri, Some(&fan_token))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_only_owner_deletes_song() {
    let app = TestApp::new().await;
    let (_, token) = app.register("artist@example.org").await;
    let (_, other_token) = app.register("other@example.org").await;
    let song_id = publish_song(&app, &token, "Night Drive", "Luna Park").await;
    let uri = format!("/api/songs/{}", song_id);

    let response = app.send(test_request("DELETE", &uri, Some(&other_token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(test_request("DELETE", &uri, Some(&token))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(test_request("GET", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_playlist_permissions() {
    let app = TestApp::new().await;
    let (_, owner_token) = app.register("owner@example.org").await;
    let (_, guest_token) = app.register("guest@example.org").await;
    let song_id = publish_song(&app, &owner_token, "Night Drive", "Luna Park").await;

    let response = app
        .send(json_request(
            "POST",
            "/api/playlists",
            Some(&owner_token),
            &json!({ "name": "Late", "isPublic": false }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let private_id = extract_json(response.into_body()).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let private_uri = format!("/api/playlists/{}", private_id);

    let response = app.send(test_request("GET", &private_uri, Some(&guest_token))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app.send(test_request("GET", &private_uri, Some(&owner_token))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let add = json!({ "songId": song_id });
    let tracks_uri = format!("{}/tracks", private_uri);
    let response = app
        .send(json_request("POST", &tracks_uri, Some(&guest_token), &add))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(json_request("POST", &tracks_uri, Some(&owner_token), &add))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let detail = extract_json(response.into_body()).await;
    assert_eq!(detail["totalTracks"], 1);
    assert_eq!(detail["totalDuration"], 1);
    assert_eq!(detail["tracks"][0]["id"], song_id.as_str());

    // Collaborative playlists take tracks from anyone signed in
    let response = app
        .send(json_request(
            "POST",
            "/api/playlists",
            Some(&owner_token),
            &json!({ "name": "Open Mic", "collaborative": true }),
        ))
        .await;
    let shared_id = extract_json(response.into_body()).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let response = app
        .send(json_request(
            "POST",
            &format!("/api/playlists/{}/tracks", shared_id),
            Some(&guest_token),
            &add,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .send(test_request("DELETE", &private_uri, Some(&guest_token)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app
        .send(test_request("DELETE", &private_uri, Some(&owner_token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_private_collaborative_playlist_hidden_from_guests() {
    let app = TestApp::new().await;
    let (_, owner_token) = app.register("owner@example.org").await;
    let (_, guest_token) = app.register("guest@example.org").await;
    let song_id = publish_song(&app, &owner_token, "Night Drive", "Luna Park").await;
    let add = json!({ "songId": song_id });

    let response = app
        .send(json_request(
            "POST",
            "/api/playlists",
            Some(&owner_token),
            &json!({ "name": "Band Only", "isPublic": false, "collaborative": true }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let id = extract_json(response.into_body()).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let tracks_uri = format!("/api/playlists/{}/tracks", id);

    let response = app
        .send(json_request("POST", &tracks_uri, Some(&guest_token), &add))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(json_request("POST", &tracks_uri, Some(&owner_token), &add))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(extract_json(response.into_body()).await["totalTracks"], 1);

    // Once public, the same guest may contribute
    let response = app
        .send(json_request(
            "PUT",
            &format!("/api/playlists/{}", id),
            Some(&owner_token),
            &json!({ "isPublic": true }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(json_request("POST", &tracks_uri, Some(&guest_token), &add))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(extract_json(response.into_body()).await["totalTracks"], 2);
}

#[tokio::test]
async fn test_search_across_catalog() {
    let app = TestApp::new().await;
    let (_, token) = app.register("artist@example.org").await;
    publish_song(&app, &token, "Night Drive", "Luna Park").await;
    publish_song(&app, &token, "Morning Run", "Sol Invictus").await;

    let response = app.send(test_request("GET", "/api/search?q=night", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["songs"].as_array().unwrap().len(), 1);
    assert_eq!(body["songs"][0]["title"], "Night Drive");

    let response = app.send(test_request("GET", "/api/search?q=sol", None)).await;
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["artists"].as_array().unwrap().len(), 1);
    assert_eq!(body["artists"][0]["name"], "Sol Invictus");

    // LIKE wildcards are matched literally
    let response = app.send(test_request("GET", "/api/search?q=%25", None)).await;
    let body = extract_json(response.into_body()).await;
    assert!(body["songs"].as_array().unwrap().is_empty());

    let response = app.send(test_request("GET", "/api/search?q=", None)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_album_with_published_track() {
    let app = TestApp::new().await;
    let (_, token) = app.register("artist@example.org").await;

    let response = app
        .send(json_request("POST", "/api/artists", Some(&token), &json!({ "name": "Luna Park" })))
        .await;
    let artist_id = extract_json(response.into_body()).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .send(json_request(
            "POST",
            "/api/albums",
            None,
            &json!({ "title": "Tides", "artistId": artist_id }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(json_request(
            "POST",
            "/api/albums",
            Some(&token),
            &json!({ "title": "Tides", "artistId": "no-such-artist" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(json_request(
            "POST",
            "/api/albums",
            Some(&token),
            &json!({ "title": "Tides", "artistId": artist_id, "type": "ep" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let album = extract_json(response.into_body()).await;
    assert_eq!(album["type"], "ep");
    let album_id = album["id"].as_str().unwrap().to_string();

    let audio = wav_bytes(1, 8000);
    let response = app
        .send(multipart_request(
            "/api/publish",
            Some(&token),
            &[
                Part::Text("title", "First Wave"),
                Part::Text("artistName", "Luna Park"),
                Part::Text("albumId", &album_id),
                Part::File("audio", "song.wav", "audio/wav", &audio),
            ],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["artistCreated"], false);
    assert_eq!(body["song"]["albumId"], album_id.as_str());

    let response = app
        .send(test_request("GET", &format!("/api/albums/{}/songs", album_id), None))
        .await;
    assert_eq!(extract_json(response.into_body()).await.as_array().unwrap().len(), 1);

    let response = app
        .send(test_request("GET", &format!("/api/artists/{}/albums", artist_id), None))
        .await;
    assert_eq!(extract_json(response.into_body()).await[0]["title"], "Tides");

    let response = app
        .send(test_request("GET", &format!("/api/artists/{}/songs", artist_id), None))
        .await;
    assert_eq!(extract_json(response.into_body()).await[0]["title"], "First Wave");

    let response = app.send(test_request("GET", "/api/stats", None)).await;
    let stats = extract_json(response.into_body()).await;
    assert_eq!(stats["albums"], 1);
    assert_eq!(stats["songs"], 1);
}

// =============================================================================
// Catalog Edits
// =============================================================================

async fn create_artist(app: &TestApp, token: &str, name: &str) -> String {
    let response = app
        .send(json_request("POST", "/api/artists", Some(token), &json!({ "name": name })))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    extract_json(response.into_body()).await["id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_artist_update_and_delete() {
    let app = TestApp::new().await;
    let (_, owner_token) = app.register("owner@example.org").await;
    let (_, guest_token) = app.register("guest@example.org").await;
    let artist_id = create_artist(&app, &owner_token, "Luna Park").await;
    let uri = format!("/api/artists/{}", artist_id);
    let edit = json!({ "bio": "Synthwave duo", "country": "GH" });

    let response = app.send(json_request("PUT", &uri, None, &edit)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let response = app.send(json_request("PUT", &uri, Some(&guest_token), &edit)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app
        .send(json_request("PUT", &uri, Some(&owner_token), &json!({ "name": "  " })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(json_request("PUT", &uri, Some(&owner_token), &edit)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = extract_json(response.into_body()).await;
    assert_eq!(updated["name"], "Luna Park");
    assert_eq!(updated["bio"], "Synthwave duo");
    assert_eq!(updated["country"], "GH");

    let response = app
        .send(json_request(
            "PUT",
            "/api/artists/no-such-artist",
            Some(&owner_token),
            &edit,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // An artist with songs stays
    let song_id = publish_song(&app, &owner_token, "Night Drive", "Luna Park").await;
    let response = app.send(test_request("DELETE", &uri, Some(&guest_token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.send(test_request("DELETE", &uri, Some(&owner_token))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .send(test_request("DELETE", &format!("/api/songs/{}", song_id), Some(&owner_token)))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(test_request("DELETE", &uri, Some(&owner_token))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = app.send(test_request("GET", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_anonymous_artist_cannot_be_edited() {
    let app = TestApp::new().await;
    let (_, token) = app.register("fan@example.org").await;

    let response = app
        .send(json_request("POST", "/api/artists", None, &json!({ "name": "Nobody" })))
        .await;
    let artist_id = extract_json(response.into_body()).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app
        .send(test_request("DELETE", &format!("/api/artists/{}", artist_id), Some(&token)))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_album_update_and_delete() {
    let app = TestApp::new().await;
    let (_, owner_token) = app.register("owner@example.org").await;
    let (_, guest_token) = app.register("guest@example.org").await;
    let artist_id = create_artist(&app, &owner_token, "Luna Park").await;

    let response = app
        .send(json_request(
            "POST",
            "/api/albums",
            Some(&owner_token),
            &json!({ "title": "Tides", "artistId": artist_id }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let album_id = extract_json(response.into_body()).await["id"]
        .as_str()
        .unwrap()
        .to_string();
    let uri = format!("/api/albums/{}", album_id);

    let edit = json!({ "title": "Tides (Deluxe)", "type": "compilation" });
    let response = app.send(json_request("PUT", &uri, Some(&guest_token), &edit)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app
        .send(json_request("PUT", &uri, Some(&owner_token), &json!({ "title": "" })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(json_request("PUT", &uri, Some(&owner_token), &edit)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = extract_json(response.into_body()).await;
    assert_eq!(updated["title"], "Tides (Deluxe)");
    assert_eq!(updated["type"], "compilation");
    assert_eq!(updated["artistId"], artist_id.as_str());

    // The album pins its artist
    let response = app
        .send(test_request("DELETE", &format!("/api/artists/{}", artist_id), Some(&owner_token)))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let audio = wav_bytes(1, 8000);
    let response = app
        .send(multipart_request(
            "/api/publish",
            Some(&owner_token),
            &[
                Part::Text("title", "First Wave"),
                Part::Text("artistName", "Luna Park"),
                Part::Text("albumId", &album_id),
                Part::File("audio", "song.wav", "audio/wav", &audio),
            ],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let song_id = extract_json(response.into_body()).await["song"]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = app.send(test_request("DELETE", &uri, Some(&guest_token))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = app.send(test_request("DELETE", &uri, Some(&owner_token))).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.send(test_request("GET", &uri, None)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = app
        .send(test_request("GET", &format!("/api/songs/{}", song_id), None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(extract_json(response.into_body()).await["albumId"].is_null());
}

#[tokio::test]
async fn test_update_own_profile() {
    let app = TestApp::new().await;
    let (user_id, token) = app.register("listener@example.org").await;

    let edit = json!({ "displayName": "  Night Owl ", "bio": "Late listener" });
    let response = app.send(json_request("PUT", "/api/auth/me", None, &edit)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .send(json_request("PUT", "/api/auth/me", Some(&token), &json!({ "username": " " })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.send(json_request("PUT", "/api/auth/me", Some(&token), &edit)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = extract_json(response.into_body()).await;
    assert_eq!(updated["id"], user_id.as_str());
    assert_eq!(updated["displayName"], "Night Owl");
    assert_eq!(updated["bio"], "Late listener");
    assert_eq!(updated["username"], "listener");
    assert_eq!(updated["email"], "listener@example.org");

    let response = app.send(test_request("GET", "/api/auth/me", Some(&token))).await;
    assert_eq!(extract_json(response.into_body()).await["displayName"], "Night Owl");
}
