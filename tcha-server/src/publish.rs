//! Publish workflow state machine
//!
//! A publish runs strictly forward:
//! Idle → UploadingAudio → UploadingImage (only with a cover) →
//! ResolvingArtist → WritingSong → Success | Failed
//!
//! Each step is a single store call with no retry and no rollback. When a
//! step fails the orchestrator stops in `Failed` and reports the resources
//! earlier steps already created; they are left in place. On success the
//! form is cleared and the orchestrator returns to `Idle`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tcha_common::db::{Artist, NewArtist, NewSong, Song};
use tcha_common::{time, Error};
use tracing::{info, warn};

use crate::audio::probe_duration_secs;
use crate::blob::{BlobRef, BlobUpload};
use crate::session::AuthSession;
use crate::store::CatalogStore;

/// Publish workflow state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PublishState {
    Idle,
    UploadingAudio,
    UploadingImage,
    ResolvingArtist,
    WritingSong,
    Success,
    Failed,
}

impl PublishState {
    /// A new publish may begin from here
    pub fn can_start(&self) -> bool {
        matches!(self, PublishState::Idle | PublishState::Failed)
    }
}

/// State transition event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateTransition {
    pub old_state: PublishState,
    pub new_state: PublishState,
    pub transitioned_at: DateTime<Utc>,
}

/// Resource created by an earlier step and left behind by a failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OrphanedResource {
    Blob { id: String },
    Artist { id: String },
}

/// Failed publish: where it stopped, why, and what it left behind
#[derive(Debug, thiserror::Error)]
#[error("Publish failed while {failed_at:?}: {source}")]
pub struct PublishError {
    pub failed_at: PublishState,
    pub source: Error,
    pub orphans: Vec<OrphanedResource>,
}

/// User-entered publish form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishForm {
    pub title: String,
    pub artist_name: String,
    pub genre: Option<String>,
    pub album_id: Option<String>,
    /// Seconds; probed from the audio when absent
    pub duration: Option<i64>,
    pub audio: Option<BlobUpload>,
    pub cover: Option<BlobUpload>,
}

impl PublishForm {
    pub fn is_empty(&self) -> bool {
        *self == PublishForm::default()
    }
}

/// Everything a successful publish produced
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishOutcome {
    pub song: Song,
    pub artist: Artist,
    pub artist_created: bool,
    pub audio: BlobRef,
    pub cover: Option<BlobRef>,
}

/// Drives one publish at a time over a catalog store
///
/// `publish` takes `&mut self`, so a given orchestrator can never run two
/// publishes at once.
pub struct PublishOrchestrator<S> {
    store: S,
    state: PublishState,
    form: PublishForm,
    transitions: Vec<StateTransition>,
}

impl<S: CatalogStore> PublishOrchestrator<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: PublishState::Idle,
            form: PublishForm::default(),
            transitions: Vec::new(),
        }
    }

    pub fn state(&self) -> PublishState {
        self.state
    }

    pub fn form(&self) -> &PublishForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut PublishForm {
        &mut self.form
    }

    pub fn set_form(&mut self, form: PublishForm) {
        self.form = form;
    }

    /// Every transition since creation, oldest first
    pub fn transitions(&self) -> &[StateTransition] {
        &self.transitions
    }

    fn transition_to(&mut self, new_state: PublishState) {
        let transition = StateTransition {
            old_state: self.state,
            new_state,
            transitioned_at: time::now(),
        };
        self.state = new_state;
        self.transitions.push(transition);
    }

    fn fail(&mut self, source: Error, orphans: Vec<OrphanedResource>) -> PublishError {
        let failed_at = self.state;
        warn!(
            state = ?failed_at,
            orphans = orphans.len(),
            "Publish failed: {}",
            source
        );
        self.transition_to(PublishState::Failed);
        PublishError {
            failed_at,
            source,
            orphans,
        }
    }

    /// Run the whole workflow for the current form
    pub async fn publish(
        &mut self,
        session: Option<&AuthSession>,
    ) -> Result<PublishOutcome, PublishError> {
        // The form stays untouched until success so a failed publish can be retried
        let form = self.form.clone();
        let (owner, audio_upload) = match precheck(self.state, &form, session) {
            Ok(checked) => checked,
            Err(source) => {
                return Err(PublishError {
                    failed_at: self.state,
                    source,
                    orphans: Vec::new(),
                })
            }
        };

        let mut orphans = Vec::new();

        self.transition_to(PublishState::UploadingAudio);
        let audio = match self.store.upload_blob(audio_upload, &owner).await {
            Ok(audio) => audio,
            Err(e) => return Err(self.fail(e, orphans)),
        };
        orphans.push(OrphanedResource::Blob {
            id: audio.id().to_string(),
        });

        let cover = match form.cover.as_ref() {
            Some(cover_upload) => {
                self.transition_to(PublishState::UploadingImage);
                match self.store.upload_blob(cover_upload, &owner).await {
                    Ok(cover) => {
                        orphans.push(OrphanedResource::Blob {
                            id: cover.id().to_string(),
                        });
                        Some(cover)
                    }
                    Err(e) => return Err(self.fail(e, orphans)),
                }
            }
            None => None,
        };

        self.transition_to(PublishState::ResolvingArtist);
        let resolved = match self
            .store
            .find_or_create_artist(&NewArtist::new(form.artist_name.trim(), owner.as_str()))
            .await
        {
            Ok(resolved) => resolved,
            Err(e) => return Err(self.fail(e, orphans)),
        };
        if resolved.created {
            orphans.push(OrphanedResource::Artist {
                id: resolved.artist.id.clone(),
            });
        }

        self.transition_to(PublishState::WritingSong);
        let duration = form
            .duration
            .or_else(|| probe_duration_secs(&audio_upload.data))
            .unwrap_or(0);

        let mut new_song = NewSong::new(form.title.trim(), &resolved.artist.id, audio.id());
        new_song.cover_image = cover.as_ref().map(|c| c.id().to_string());
        new_song.album_id = form.album_id.clone();
        new_song.genre = form
            .genre
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
            .map(str::to_string);
        new_song.duration = duration;
        new_song.owner_id = owner.clone();

        let song = match self.store.create_song(&new_song).await {
            Ok(song) => song,
            Err(e) => return Err(self.fail(e, orphans)),
        };

        self.transition_to(PublishState::Success);
        info!(
            song_id = %song.id,
            artist_id = %resolved.artist.id,
            artist_created = resolved.created,
            duration = song.duration,
            "Published '{}'",
            song.title
        );

        self.form = PublishForm::default();
        self.transition_to(PublishState::Idle);

        Ok(PublishOutcome {
            song,
            artist: resolved.artist,
            artist_created: resolved.created,
            audio,
            cover,
        })
    }
}

/// Checks done before any store call; a rejection leaves the state unchanged
fn precheck<'a>(
    state: PublishState,
    form: &'a PublishForm,
    session: Option<&AuthSession>,
) -> Result<(String, &'a BlobUpload), Error> {
    if !state.can_start() {
        return Err(Error::Conflict(format!("Cannot start a publish while {:?}", state)));
    }
    let session = session.ok_or_else(|| Error::Unauthenticated("Sign in to publish".to_string()))?;
    let audio = form
        .audio
        .as_ref()
        .ok_or_else(|| Error::InvalidInput("An audio file is required".to_string()))?;
    if audio.is_empty() {
        return Err(Error::InvalidInput("The audio file is empty".to_string()));
    }
    if form.title.trim().is_empty() {
        return Err(Error::InvalidInput("Title is required".to_string()));
    }
    if form.artist_name.trim().is_empty() {
        return Err(Error::InvalidInput("Artist name is required".to_string()));
    }
    Ok((session.user_id.clone(), audio))
}
