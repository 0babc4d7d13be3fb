//! Song metadata editor tests

mod helpers;

use axum::http::StatusCode;
use helpers::*;
use serde_json::json;
use tcha_common::db::Song;
use tcha_common::Error;
use tcha_server::blob::BlobUpload;
use tcha_server::db::{likes, songs};
use tcha_server::editor::{CreditField, MetadataEditor};
use tcha_server::publish::{PublishForm, PublishOrchestrator};
use tcha_server::session::AuthSession;

async fn published_song(app: &TestApp, user_id: &str) -> Song {
    let mut orchestrator = PublishOrchestrator::new(app.state.catalog.clone());
    orchestrator.set_form(PublishForm {
        title: "Draft Title".to_string(),
        artist_name: "Test Artist".to_string(),
        audio: Some(BlobUpload::new("track.wav", "audio/wav", wav_bytes(1, 8000))),
        ..Default::default()
    });
    let session = AuthSession {
        user_id: user_id.to_string(),
        token_hash: "hash".to_string(),
    };
    orchestrator.publish(Some(&session)).await.unwrap().song
}

#[tokio::test]
async fn test_edit_round_trip_keeps_counters() {
    let app = TestApp::new().await;
    let (user_id, _) = app.register("editor@example.org").await;
    let song = published_song(&app, &user_id).await;

    songs::increment_stream_count(app.db(), &song.id).await.unwrap();
    songs::increment_stream_count(app.db(), &song.id).await.unwrap();
    likes::like_song(app.db(), &user_id, &song.id).await.unwrap();

    let session = AuthSession {
        user_id: user_id.clone(),
        token_hash: "hash".to_string(),
    };
    let mut editor = MetadataEditor::load(app.state.catalog.clone(), &song.id).await.unwrap();
    assert_eq!(editor.draft().title, "Draft Title");

    let draft = editor.draft_mut();
    draft.title = "Final Title".to_string();
    draft.genre = Some("Afrobeat".to_string());
    draft.lyrics = "la la la".to_string();
    draft.explicit = true;
    assert!(draft.add_tag("Pop"));
    assert!(draft.add_tag(" Summer "));
    assert!(!draft.add_tag("Pop "));
    draft.set_credit(CreditField::Producer, "DJ Kofi");
    draft.set_credit(CreditField::Composer, "Ama Mensah");
    draft.set_credit(CreditField::Lyricist, "Kwesi Boateng");
    draft.set_credit("studio".parse().unwrap(), "Studio 7");
    let note_id = draft
        .add_annotation("Bridge starts here", &user_id)
        .map(|a| a.id.clone())
        .unwrap();
    draft.add_annotation("Outro fades at 3:10", &user_id).unwrap();
    assert!(draft.add_annotation("   ", &user_id).is_none());
    let expected_credits = draft.credits.clone();
    let expected_annotations = draft.annotations.clone();

    let saved = editor.save(Some(&session)).await.unwrap();
    assert_eq!(saved.title, "Final Title");
    assert_eq!(saved.last_edited_by.as_deref(), Some(user_id.as_str()));
    assert!(saved.updated_at.is_some());

    let reloaded = songs::load_song(app.db(), &song.id).await.unwrap().unwrap();
    assert_eq!(reloaded.title, "Final Title");
    assert_eq!(reloaded.genre.as_deref(), Some("Afrobeat"));
    assert_eq!(reloaded.lyrics, "la la la");
    assert!(reloaded.explicit);
    assert_eq!(reloaded.tags, vec!["Pop".to_string(), "Summer".to_string()]);
    assert_eq!(reloaded.credits, expected_credits);
    assert_eq!(reloaded.credits.composer, "Ama Mensah");
    assert_eq!(reloaded.credits.lyricist, "Kwesi Boateng");
    assert_eq!(reloaded.annotations, expected_annotations);
    assert_eq!(reloaded.annotations.len(), 2);
    assert_eq!(reloaded.annotations[0].id, note_id);
    assert_eq!(reloaded.annotations[0].text, "Bridge starts here");
    assert_eq!(reloaded.annotations[1].author, user_id);

    assert_eq!(reloaded.stream_count, 2);
    assert_eq!(reloaded.like_count, 1);
    assert_eq!(reloaded.audio_file_id, song.audio_file_id);
}

#[tokio::test]
async fn test_save_requires_session() {
    let app = TestApp::new().await;
    let song = published_song(&app, "user-1").await;

    let editor = MetadataEditor::load(app.state.catalog.clone(), &song.id).await.unwrap();
    let err = editor.save(None).await.unwrap_err();
    assert!(matches!(err, Error::Unauthenticated(_)));
}

#[tokio::test]
async fn test_load_missing_song() {
    let app = TestApp::new().await;
    let result = MetadataEditor::load(app.state.catalog.clone(), "missing").await;
    assert!(matches!(result, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_cover_must_be_image() {
    let app = TestApp::new().await;
    let song = published_song(&app, "user-1").await;
    let session = AuthSession {
        user_id: "user-1".to_string(),
        token_hash: "hash".to_string(),
    };

    let mut editor = MetadataEditor::load(app.state.catalog.clone(), &song.id).await.unwrap();
    let err = editor
        .upload_cover(&BlobUpload::new("notes.txt", "text/plain", b"hello".to_vec()), &session)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));
    assert_eq!(editor.draft().cover_image, None);

    let cover = editor
        .upload_cover(&BlobUpload::new("cover.png", "image/png", PNG_BYTES), &session)
        .await
        .unwrap();
    assert_eq!(editor.draft().cover_image.as_deref(), Some(cover.id()));

    // Not persisted until saved
    let stored = songs::load_song(app.db(), &song.id).await.unwrap().unwrap();
    assert_eq!(stored.cover_image, None);

    let saved = editor.save(Some(&session)).await.unwrap();
    assert_eq!(saved.cover_image.as_deref(), Some(cover.id()));
}

#[tokio::test]
async fn test_last_save_wins() {
    let app = TestApp::new().await;
    let song = published_song(&app, "user-1").await;
    let alice = AuthSession {
        user_id: "user-a".to_string(),
        token_hash: "a".to_string(),
    };
    let bob = AuthSession {
        user_id: "user-b".to_string(),
        token_hash: "b".to_string(),
    };

    let mut first = MetadataEditor::load(app.state.catalog.clone(), &song.id).await.unwrap();
    let mut second = MetadataEditor::load(app.state.catalog.clone(), &song.id).await.unwrap();
    first.draft_mut().description = "from first".to_string();
    second.draft_mut().title = "Second Title".to_string();

    first.save(Some(&alice)).await.unwrap();
    let saved = second.save(Some(&bob)).await.unwrap();

    // The second save overwrites the first one's description with its stale copy
    assert_eq!(saved.title, "Second Title");
    assert_eq!(saved.description, "");
    assert_eq!(saved.last_edited_by.as_deref(), Some("user-b"));
}

#[tokio::test]
async fn test_edit_over_http() {
    let app = TestApp::new().await;
    let (user_id, token) = app.register("editor@example.org").await;
    let song = published_song(&app, &user_id).await;
    let uri = format!("/api/songs/{}", song.id);

    let draft = json!({
        "title": "Via HTTP",
        "tags": ["Pop", " Pop ", "", "Jazz"],
        "credits": { "composer": "A. Writer" },
    });

    let response = app.send(json_request("PUT", &uri, None, &draft)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.send(json_request("PUT", &uri, Some(&token), &draft)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["title"], "Via HTTP");
    assert_eq!(body["tags"], json!(["Pop", "Jazz"]));
    assert_eq!(body["credits"]["composer"], "A. Writer");
    assert_eq!(body["lastEditedBy"], user_id.as_str());

    let response = app
        .send(json_request("PUT", &uri, Some(&token), &json!({ "title": "  " })))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(multipart_request(
            &format!("{}/cover", uri),
            Some(&token),
            &[Part::File("file", "notes.txt", "text/plain", b"hello")],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .send(multipart_request(
            &format!("{}/cover", uri),
            Some(&token),
            &[Part::File("file", "cover.png", "image/png", PNG_BYTES)],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["song"]["coverImage"], body["cover"]["id"]);
}
