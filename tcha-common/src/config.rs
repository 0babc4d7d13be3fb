//! Configuration loading and root folder resolution
//!
//! Bootstrap configuration follows this priority order:
//! 1. Command-line argument (highest priority, applied by the binary)
//! 2. Environment variable (`TCHA_ROOT_FOLDER`, then `TCHA_ROOT`)
//! 3. TOML config file (`~/.config/tchamusic/<module>.toml`)
//! 4. OS-dependent compiled default (fallback)
//!
//! A missing or unreadable TOML file never stops startup; it is logged and
//! the compiled defaults are used instead.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Primary root folder environment variable
pub const ROOT_FOLDER_ENV: &str = "TCHA_ROOT_FOLDER";

/// Secondary root folder environment variable
pub const ROOT_ENV: &str = "TCHA_ROOT";

/// Database file name inside the root folder
pub const DATABASE_FILE_NAME: &str = "tchamusic.db";

/// Default HTTP port (same as the historical API server)
pub const DEFAULT_PORT: u16 = 5000;

/// Default bind address
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Bootstrap configuration loaded from TOML
///
/// Every field is optional so that a partial file still parses.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TomlConfig {
    /// Folder holding the database (and log file, if relative)
    #[serde(default)]
    pub root_folder: Option<PathBuf>,

    /// Explicit database path, overrides `<root_folder>/tchamusic.db`
    #[serde(default)]
    pub database_path: Option<PathBuf>,

    /// Bind address
    #[serde(default)]
    pub host: Option<String>,

    /// HTTP port
    #[serde(default)]
    pub port: Option<u16>,

    /// Base URL used when building blob preview/view/download links
    #[serde(default)]
    pub public_base_url: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stdout if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }

    /// Parse a TOML file, falling back to defaults when it is missing or invalid
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Self::default();
        }

        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("{}; continuing with defaults", e);
                Self::default()
            }
        }
    }
}

/// OS-dependent compiled defaults
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub root_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_file: Option<PathBuf>,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            root_folder: default_root_folder(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

/// Get OS-dependent default root folder path
pub fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/tchamusic
        dirs::data_local_dir()
            .map(|d| d.join("tchamusic"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/tchamusic"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("tchamusic"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/tchamusic"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("tchamusic"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\tchamusic"))
    } else {
        PathBuf::from("./tchamusic_data")
    }
}

/// Root folder from `TCHA_ROOT_FOLDER`, then `TCHA_ROOT`; blank values are ignored
pub fn root_folder_from_env() -> Option<PathBuf> {
    [ROOT_FOLDER_ENV, ROOT_ENV]
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
        .map(PathBuf::from)
}

/// Locates a module's TOML config file
pub struct RootFolderResolver {
    module_name: String,
}

impl RootFolderResolver {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
        }
    }

    /// Default TOML path for this module (`~/.config/tchamusic/<module>.toml`)
    pub fn config_file_path(&self) -> Option<PathBuf> {
        dirs::config_dir().map(|d| {
            d.join("tchamusic")
                .join(format!("{}.toml", self.module_name))
        })
    }
}

/// Creates the root folder on first run
pub struct RootFolderInitializer {
    root_folder: PathBuf,
}

impl RootFolderInitializer {
    pub fn new(root_folder: PathBuf) -> Self {
        Self { root_folder }
    }

    /// Create the root folder (and parents) if missing; idempotent
    pub fn ensure_directory_exists(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root_folder)?;
        Ok(())
    }
}
