//! Server configuration
//!
//! Bootstrap values (where to bind, where the database lives) are resolved
//! once at startup: CLI > environment > TOML > compiled defaults. Runtime
//! values live in the `settings` table and are read when the state is built.

use sqlx::SqlitePool;
use std::path::PathBuf;
use std::str::FromStr;
use tcha_common::config::{root_folder_from_env, CompiledDefaults, TomlConfig, DATABASE_FILE_NAME};
use tcha_common::db::settings::{
    get_setting, DEFAULT_MAX_UPLOAD_BYTES, DEFAULT_PREVIEW_SIZE, DEFAULT_SESSION_TIMEOUT_SECONDS,
    DEFAULT_SONG_LIST_LIMIT,
};
use tcha_common::Result;
use tracing::warn;

/// Settings read from the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    /// Blob size cap in bytes (inclusive)
    pub max_upload_bytes: u64,
    /// Row limit of `GET /api/songs`
    pub song_list_limit: i64,
    /// Session lifetime
    pub session_timeout_seconds: i64,
    /// Edge length used by preview URLs
    pub preview_default_size: u32,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            song_list_limit: DEFAULT_SONG_LIST_LIMIT,
            session_timeout_seconds: DEFAULT_SESSION_TIMEOUT_SECONDS,
            preview_default_size: DEFAULT_PREVIEW_SIZE,
        }
    }
}

impl RuntimeSettings {
    /// Load from the settings table; unparsable values fall back to defaults
    pub async fn load(pool: &SqlitePool) -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            max_upload_bytes: load_parsed(pool, "max_upload_bytes", defaults.max_upload_bytes)
                .await?,
            song_list_limit: load_parsed(pool, "song_list_limit", defaults.song_list_limit).await?,
            session_timeout_seconds: load_parsed(
                pool,
                "session_timeout_seconds",
                defaults.session_timeout_seconds,
            )
            .await?,
            preview_default_size: load_parsed(
                pool,
                "preview_default_size",
                defaults.preview_default_size,
            )
            .await?,
        })
    }
}

async fn load_parsed<T>(pool: &SqlitePool, key: &str, default: T) -> Result<T>
where
    T: FromStr + std::fmt::Display + Copy,
{
    match get_setting(pool, key).await? {
        Some(raw) => match raw.trim().parse::<T>() {
            Ok(value) => Ok(value),
            Err(_) => {
                warn!("Setting '{}' has invalid value '{}', using {}", key, raw, default);
                Ok(default)
            }
        },
        None => Ok(default),
    }
}

/// Command-line (and environment) overrides, highest priority
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub root_folder: Option<PathBuf>,
    pub database: Option<PathBuf>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

/// Fully resolved bootstrap configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub root_folder: PathBuf,
    pub database_path: PathBuf,
    pub host: String,
    pub port: u16,
    /// Prefix of blob URLs; empty means relative URLs
    pub public_base_url: String,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl ServerConfig {
    pub fn resolve(cli: CliOverrides, toml: TomlConfig) -> Self {
        let defaults = CompiledDefaults::for_current_platform();

        let root_folder = cli
            .root_folder
            .or_else(root_folder_from_env)
            .or(toml.root_folder)
            .unwrap_or(defaults.root_folder);

        let database_path = cli
            .database
            .or(toml.database_path)
            .unwrap_or_else(|| root_folder.join(DATABASE_FILE_NAME));

        // Relative log files land in the root folder
        let log_file = toml.logging.file.map(|file| {
            if file.is_relative() {
                root_folder.join(file)
            } else {
                file
            }
        });

        Self {
            database_path,
            host: cli.host.or(toml.host).unwrap_or(defaults.host),
            port: cli.port.or(toml.port).unwrap_or(defaults.port),
            public_base_url: toml
                .public_base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_default(),
            log_level: cli.log_level.unwrap_or(toml.logging.level),
            log_file,
            root_folder,
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
