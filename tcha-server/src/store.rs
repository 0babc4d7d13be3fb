//! Catalog persistence seam
//!
//! The publish workflow and the metadata editor are written against
//! [`CatalogStore`]; the service uses [`SqliteCatalog`]. Each method is one
//! independent store call.

use async_trait::async_trait;
use sqlx::SqlitePool;
use tcha_common::db::{Artist, NewArtist, NewSong, Song};
use tcha_common::{Error, Result};
use tracing::{debug, info};

use crate::blob::{self, BlobRef, BlobUpload, UrlBuilder};
use crate::db;
use crate::editor::SongDraft;

/// Outcome of a find-or-create
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedArtist {
    pub artist: Artist,
    /// True when this call inserted the artist
    pub created: bool,
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Store a file and return its reference
    async fn upload_blob(&self, upload: &BlobUpload, owner: &str) -> Result<BlobRef>;

    async fn delete_blob(&self, id: &str) -> Result<()>;

    /// Exact-name lookup (earliest-created row when duplicated)
    async fn find_artist_by_name(&self, name: &str) -> Result<Option<Artist>>;

    /// Insert without any duplicate check
    async fn create_artist(&self, artist: &NewArtist) -> Result<Artist>;

    /// Look up by exact name, create on miss
    ///
    /// A found artist is returned as stored; the other supplied fields are
    /// ignored. The lookup and the insert are separate calls with no lock, so
    /// two callers racing on a new name can both create it.
    async fn find_or_create_artist(&self, artist: &NewArtist) -> Result<ResolvedArtist> {
        let name = artist.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("Artist name is required".to_string()));
        }

        if let Some(existing) = self.find_artist_by_name(name).await? {
            debug!(artist_id = %existing.id, "Reusing existing artist '{}'", name);
            return Ok(ResolvedArtist {
                artist: existing,
                created: false,
            });
        }

        let mut new_artist = artist.clone();
        new_artist.name = name.to_string();
        let created = self.create_artist(&new_artist).await?;
        info!(artist_id = %created.id, "Created artist '{}'", name);

        Ok(ResolvedArtist {
            artist: created,
            created: true,
        })
    }

    /// Persist a song; requires a non-blank title and an artist reference
    async fn create_song(&self, song: &NewSong) -> Result<Song>;

    async fn get_song(&self, id: &str) -> Result<Option<Song>>;

    /// Full-record overwrite of the editable fields, last write wins
    async fn update_song(&self, id: &str, draft: &SongDraft, editor_id: &str) -> Result<Song>;
}

/// SQLite-backed catalog
#[derive(Clone)]
pub struct SqliteCatalog {
    pool: SqlitePool,
    max_upload_bytes: u64,
    urls: UrlBuilder,
}

impl SqliteCatalog {
    pub fn new(pool: SqlitePool, max_upload_bytes: u64, urls: UrlBuilder) -> Self {
        Self {
            pool,
            max_upload_bytes,
            urls,
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn urls(&self) -> &UrlBuilder {
        &self.urls
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }
}

#[async_trait]
impl CatalogStore for SqliteCatalog {
    async fn upload_blob(&self, upload: &BlobUpload, owner: &str) -> Result<BlobRef> {
        blob::validate_size(upload.len(), self.max_upload_bytes)?;

        let encoded = blob::encode(&upload.data);
        let record = db::blobs::insert_blob(
            &self.pool,
            &upload.file_name,
            &upload.content_type,
            upload.len() as i64,
            &encoded,
            owner,
        )
        .await?;

        info!(
            blob_id = %record.id,
            size = record.file_size,
            content_type = %record.file_type,
            "Stored blob '{}'",
            record.file_name
        );

        let urls = self.urls.for_blob(&record.id);
        Ok(BlobRef { record, urls })
    }

    async fn delete_blob(&self, id: &str) -> Result<()> {
        if !db::blobs::delete_blob(&self.pool, id).await? {
            return Err(Error::NotFound(format!("File {}", id)));
        }
        info!(blob_id = %id, "Deleted blob");
        Ok(())
    }

    async fn find_artist_by_name(&self, name: &str) -> Result<Option<Artist>> {
        db::artists::find_artist_by_name(&self.pool, name).await
    }

    async fn create_artist(&self, artist: &NewArtist) -> Result<Artist> {
        db::artists::insert_artist(&self.pool, artist).await
    }

    async fn create_song(&self, song: &NewSong) -> Result<Song> {
        if song.title.trim().is_empty() {
            return Err(Error::InvalidInput("Song title is required".to_string()));
        }
        if song.artist_id.trim().is_empty() {
            return Err(Error::InvalidInput("Artist reference is required".to_string()));
        }

        let created = db::songs::insert_song(&self.pool, song).await?;
        info!(song_id = %created.id, artist_id = %created.artist_id, "Created song '{}'", created.title);
        Ok(created)
    }

    async fn get_song(&self, id: &str) -> Result<Option<Song>> {
        db::songs::load_song(&self.pool, id).await
    }

    async fn update_song(&self, id: &str, draft: &SongDraft, editor_id: &str) -> Result<Song> {
        if draft.title.trim().is_empty() {
            return Err(Error::InvalidInput("Song title is required".to_string()));
        }

        if !db::songs::update_song_metadata(&self.pool, id, draft, editor_id).await? {
            return Err(Error::NotFound(format!("Song {}", id)));
        }

        db::songs::load_song(&self.pool, id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Song {}", id)))
    }
}
