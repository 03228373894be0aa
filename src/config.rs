//! User configuration.
//!
//! An optional TOML file; every key is optional and command line flags win
//! over it.
//!
//! ```toml
//! search-dir = "/tmp/app"
//! mailboxes = "~/mailbox_list"
//! signals = "~/signal_list"
//! little-endian = false
//! poll-interval-ms = 100
//! niceness = 19
//! pager = "less -SRXNi"
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use etcetera::base_strategy::{BaseStrategy, choose_base_strategy};
use serde::Deserialize;

use crate::path::format_path_for_display;

pub const CONFIG_PATH_ENV: &str = "SHIPTRACE_CONFIG_PATH";

/// Override for the config path, set via the --config CLI flag
static CONFIG_PATH: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {}", format_path_for_display(path))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {}", format_path_for_display(path))]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ShipConfig {
    /// Directory searched for `*.ship` files
    pub search_dir: Option<PathBuf>,
    /// Mailbox table in `um list` layout
    pub mailboxes: Option<PathBuf>,
    /// Signal list of `NAME HEX DEC` lines
    pub signals: Option<PathBuf>,
    /// Read 4-byte `procId`/`connId` tags as little-endian
    #[serde(default)]
    pub little_endian: bool,
    pub poll_interval_ms: Option<u64>,
    pub niceness: Option<i32>,
    /// Pager command for `present`
    pub pager: Option<String>,
}

impl ShipConfig {
    /// Load from the configured location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_path() {
            Some(path) => Self::load_from_path(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Set the config path override (called from the --config CLI flag)
pub fn set_config_path(path: PathBuf) {
    CONFIG_PATH.set(path).ok();
}

/// Config file location.
///
/// Priority:
/// 1. CLI --config flag (set via `set_config_path`)
/// 2. SHIPTRACE_CONFIG_PATH environment variable
/// 3. Platform config directory, `shiptrace/config.toml`
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = CONFIG_PATH.get() {
        return Some(path.clone());
    }

    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }

    // XDG on Linux and macOS, %APPDATA% on Windows
    let strategy = choose_base_strategy().ok()?;
    Some(strategy.config_dir().join("shiptrace").join("config.toml"))
}
