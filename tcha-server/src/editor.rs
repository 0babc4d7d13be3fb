//! Song metadata editor
//!
//! A song is loaded into a [`SongDraft`] working copy, mutated locally and
//! saved back as a full-record overwrite. Stream and like counters are not
//! part of the draft, so a save never touches them. There is no version
//! check: the last save wins.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tcha_common::db::{Annotation, Credits, Song, SEED_GENRES};
use tcha_common::{time, Error, Result};
use tracing::info;
use uuid::Uuid;

use crate::blob::{BlobRef, BlobUpload};
use crate::session::AuthSession;
use crate::store::CatalogStore;

/// Tags offered for one-click insertion
pub const TAG_SUGGESTIONS: [&str; 10] = SEED_GENRES;

/// Editable copy of a song
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SongDraft {
    pub title: String,
    pub genre: Option<String>,
    pub description: String,
    pub lyrics: String,
    pub release_date: String,
    pub duration: i64,
    pub explicit: bool,
    pub tags: Vec<String>,
    pub credits: Credits,
    pub annotations: Vec<Annotation>,
    pub cover_image: Option<String>,
}

/// One entry of the credits group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreditField {
    Producer,
    Composer,
    Lyricist,
    Studio,
}

impl FromStr for CreditField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "producer" => Ok(CreditField::Producer),
            "composer" => Ok(CreditField::Composer),
            "lyricist" => Ok(CreditField::Lyricist),
            "studio" => Ok(CreditField::Studio),
            other => Err(Error::InvalidInput(format!("Unknown credit field: {}", other))),
        }
    }
}

impl SongDraft {
    pub fn from_song(song: &Song) -> Self {
        Self {
            title: song.title.clone(),
            genre: song.genre.clone(),
            description: song.description.clone(),
            lyrics: song.lyrics.clone(),
            release_date: song.release_date.clone(),
            duration: song.duration,
            explicit: song.explicit,
            tags: song.tags.clone(),
            credits: song.credits.clone(),
            annotations: song.annotations.clone(),
            cover_image: song.cover_image.clone(),
        }
    }

    /// Add a trimmed tag; returns false for blank or already present tags
    pub fn add_tag(&mut self, tag: &str) -> bool {
        let tag = tag.trim();
        if tag.is_empty() || self.tags.iter().any(|t| t == tag) {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn remove_tag(&mut self, tag: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|t| t != tag);
        self.tags.len() != before
    }

    /// Re-apply tag rules to a draft received as a whole (trim, drop blanks and duplicates)
    pub fn normalize_tags(&mut self) {
        let tags = std::mem::take(&mut self.tags);
        for tag in &tags {
            self.add_tag(tag);
        }
    }

    /// Append an annotation stamped with its author and the current time
    ///
    /// Blank text is ignored.
    pub fn add_annotation(&mut self, text: &str, author: &str) -> Option<&Annotation> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        self.annotations.push(Annotation {
            id: Uuid::new_v4().to_string(),
            text: text.to_string(),
            author: author.to_string(),
            timestamp: time::now(),
        });
        self.annotations.last()
    }

    pub fn remove_annotation(&mut self, id: &str) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        self.annotations.len() != before
    }

    pub fn set_credit(&mut self, field: CreditField, value: impl Into<String>) {
        let value = value.into();
        match field {
            CreditField::Producer => self.credits.producer = value,
            CreditField::Composer => self.credits.composer = value,
            CreditField::Lyricist => self.credits.lyricist = value,
            CreditField::Studio => self.credits.studio = value,
        }
    }

    pub fn set_cover(&mut self, blob_id: impl Into<String>) {
        self.cover_image = Some(blob_id.into());
    }
}

/// Editing session over one song
pub struct MetadataEditor<S> {
    store: S,
    song_id: String,
    draft: SongDraft,
}

impl<S: CatalogStore> MetadataEditor<S> {
    /// Load a song into a fresh working copy
    pub async fn load(store: S, song_id: &str) -> Result<Self> {
        let song = store
            .get_song(song_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Song {}", song_id)))?;

        Ok(Self {
            store,
            song_id: song.id.clone(),
            draft: SongDraft::from_song(&song),
        })
    }

    pub fn song_id(&self) -> &str {
        &self.song_id
    }

    pub fn draft(&self) -> &SongDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut SongDraft {
        &mut self.draft
    }

    /// Replace the whole working copy (tags are normalized)
    pub fn replace_draft(&mut self, mut draft: SongDraft) {
        draft.normalize_tags();
        self.draft = draft;
    }

    /// Upload a new cover image and point the working copy at it
    ///
    /// The content type must start with `image/`. The draft is only changed
    /// when the upload succeeds; nothing is saved until [`Self::save`].
    pub async fn upload_cover(&mut self, upload: &BlobUpload, session: &AuthSession) -> Result<BlobRef> {
        if !upload.is_image() {
            return Err(Error::InvalidInput(format!(
                "Cover must be an image, got '{}'",
                upload.content_type
            )));
        }

        let stored = self.store.upload_blob(upload, &session.user_id).await?;
        self.draft.set_cover(stored.id());
        Ok(stored)
    }

    /// Write the whole working copy back; requires a session
    pub async fn save(&self, session: Option<&AuthSession>) -> Result<Song> {
        let session = session
            .ok_or_else(|| Error::Unauthenticated("Sign in to edit songs".to_string()))?;

        let saved = self
            .store
            .update_song(&self.song_id, &self.draft, &session.user_id)
            .await?;

        info!(song_id = %saved.id, editor = %session.user_id, "Saved song metadata");
        Ok(saved)
    }
}
