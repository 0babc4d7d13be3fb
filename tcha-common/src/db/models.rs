//! Database models
//!
//! JSON field names are camelCase on the wire; columns are snake_case.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Owner id used when a record is created without a session
pub const ANONYMOUS_USER: &str = "anonymous";

fn anonymous() -> String {
    ANONYMOUS_USER.to_string()
}

fn default_true() -> bool {
    true
}

fn default_track_number() -> i64 {
    1
}

// ============================================================================
// Artists
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Artist {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub cover_image: Option<String>,
    pub country: Option<String>,
    pub verified: bool,
    pub monthly_listeners: i64,
    pub total_streams: i64,
    pub created_at: String,
}

/// Fields for a new artist; everything but the name is optional
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewArtist {
    pub name: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub monthly_listeners: i64,
    #[serde(default = "anonymous")]
    pub user_id: String,
}

impl NewArtist {
    pub fn new(name: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bio: String::new(),
            avatar: None,
            cover_image: None,
            country: None,
            verified: false,
            monthly_listeners: 0,
            user_id: user_id.into(),
        }
    }
}

/// Partial artist update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtistUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

// ============================================================================
// Songs
// ============================================================================

/// Credit sub-record edited as a flat key/value group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credits {
    pub producer: String,
    pub composer: String,
    pub lyricist: String,
    pub studio: String,
}

/// Free-form note attached to a song
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    pub text: String,
    pub author: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Song {
    pub id: String,
    pub title: String,
    pub artist_id: String,
    pub album_id: Option<String>,
    pub audio_file_id: String,
    pub cover_image: Option<String>,
    /// Seconds
    pub duration: i64,
    pub track_number: i64,
    pub genre: Option<String>,
    /// `YYYY-MM-DD`
    pub release_date: String,
    pub lyrics: String,
    pub description: String,
    pub explicit: bool,
    pub is_public: bool,
    pub stream_count: i64,
    pub like_count: i64,
    pub tags: Vec<String>,
    pub credits: Credits,
    pub annotations: Vec<Annotation>,
    pub owner_id: String,
    pub created_at: String,
    pub updated_at: Option<String>,
    pub last_edited_by: Option<String>,
}

/// Fields for a new song; counters always start at zero
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSong {
    pub title: String,
    pub artist_id: String,
    #[serde(default)]
    pub album_id: Option<String>,
    pub audio_file_id: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub duration: i64,
    #[serde(default = "default_track_number")]
    pub track_number: i64,
    #[serde(default)]
    pub genre: Option<String>,
    /// Defaults to today when absent
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub lyrics: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub explicit: bool,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub credits: Credits,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default = "anonymous")]
    pub owner_id: String,
}

impl NewSong {
    pub fn new(
        title: impl Into<String>,
        artist_id: impl Into<String>,
        audio_file_id: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            artist_id: artist_id.into(),
            album_id: None,
            audio_file_id: audio_file_id.into(),
            cover_image: None,
            duration: 0,
            track_number: default_track_number(),
            genre: None,
            release_date: None,
            lyrics: String::new(),
            description: String::new(),
            explicit: false,
            is_public: true,
            tags: Vec::new(),
            credits: Credits::default(),
            annotations: Vec::new(),
            owner_id: anonymous(),
        }
    }
}

/// Row of the public song listing (song joined with its artist)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SongSummary {
    pub id: String,
    pub title: String,
    pub duration: i64,
    pub release_date: String,
    pub stream_count: i64,
    pub like_count: i64,
    pub audio_file_id: String,
    pub cover_image: Option<String>,
    pub artist_id: String,
    pub artist_name: Option<String>,
    pub artist_verified: Option<bool>,
    pub genre_name: Option<String>,
    pub created_at: String,
}

// ============================================================================
// Blobs
// ============================================================================

/// Stored file metadata (content lives base64-encoded beside it)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobRecord {
    pub id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub uploaded_by: String,
    pub created_at: String,
}

// ============================================================================
// Albums
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlbumType {
    #[default]
    Album,
    Single,
    Ep,
    Compilation,
}

impl AlbumType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlbumType::Album => "album",
            AlbumType::Single => "single",
            AlbumType::Ep => "ep",
            AlbumType::Compilation => "compilation",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "album" => Some(AlbumType::Album),
            "single" => Some(AlbumType::Single),
            "ep" => Some(AlbumType::Ep),
            "compilation" => Some(AlbumType::Compilation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Album {
    pub id: String,
    pub title: String,
    pub artist_id: String,
    pub cover_image: Option<String>,
    pub release_date: Option<String>,
    pub genre: Option<String>,
    #[serde(rename = "type")]
    pub album_type: AlbumType,
    pub total_tracks: i64,
    pub duration: i64,
    pub description: String,
    pub total_streams: i64,
    pub owner_id: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAlbum {
    pub title: String,
    pub artist_id: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, rename = "type")]
    pub album_type: AlbumType,
    #[serde(default)]
    pub total_tracks: i64,
    #[serde(default)]
    pub duration: i64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, rename = "type")]
    pub album_type: Option<AlbumType>,
    #[serde(default)]
    pub description: Option<String>,
}

// ============================================================================
// Playlists
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cover_image: Option<String>,
    pub owner_id: String,
    pub is_public: bool,
    pub collaborative: bool,
    pub total_tracks: i64,
    pub total_duration: i64,
    pub follower_count: i64,
    pub created_at: String,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPlaylist {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default = "default_true")]
    pub is_public: bool,
    #[serde(default)]
    pub collaborative: bool,
}

/// Partial playlist update; absent fields keep their stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistUpdate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: Option<String>,
    #[serde(default)]
    pub is_public: Option<bool>,
    #[serde(default)]
    pub collaborative: Option<bool>,
}

// ============================================================================
// Genres, users
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

/// Public user profile (never carries the password hash)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub username: String,
    pub display_name: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub is_premium: bool,
    pub followers_count: i64,
    pub following_count: i64,
    pub country: Option<String>,
    pub created_at: String,
}

/// Profile fields a user may change; email and counters are not editable
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}
