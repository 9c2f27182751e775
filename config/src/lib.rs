//! User settings for linkcard.
//!
//! Settings are a small TOML file with every section optional; a missing
//! file, section, or key falls back to the documented default. The host
//! persists the file, this crate only reads it.
//!
//! ```toml
//! [network]
//! timeout_ms = 5000
//!
//! [clipboard]
//! enabled = true
//! converter = "bookmark-card"
//! bookmark-blacklist = ["internal.example"]
//! ```

use std::path::{Path, PathBuf};
use std::{env, fs};

use serde::Deserialize;
use thiserror::Error;

use linkcard_providers::FetchOptions;
use linkcard_types::ConvertKind;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "LINKCARD_CONFIG";

const CONFIG_FILE: &str = "linkcard/config.toml";

const fn default_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

impl ConfigError {
    #[must_use]
    pub fn path(&self) -> &PathBuf {
        match self {
            ConfigError::Read { path, .. } | ConfigError::Parse { path, .. } => path,
        }
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct LinkcardConfig {
    pub network: Option<NetworkConfig>,
    pub clipboard: Option<ClipboardConfig>,
}

impl LinkcardConfig {
    /// The network section, defaulted when absent.
    #[must_use]
    pub fn network(&self) -> NetworkConfig {
        self.network.clone().unwrap_or_default()
    }

    /// The clipboard section, defaulted when absent.
    #[must_use]
    pub fn clipboard(&self) -> ClipboardConfig {
        self.clipboard.clone().unwrap_or_default()
    }
}

/// Knobs applied to every proxied fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Override for the fixed desktop User-Agent.
    pub user_agent: Option<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Override for the public oEmbed provider directory URL.
    pub provider_directory: Option<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            user_agent: None,
            timeout_ms: default_timeout_ms(),
            provider_directory: None,
        }
    }
}

impl NetworkConfig {
    /// Resolver fetch options for this configuration.
    #[must_use]
    pub fn fetch_options(&self) -> FetchOptions {
        let mut options = FetchOptions {
            timeout_ms: self.timeout_ms,
            ..FetchOptions::default()
        };
        if let Some(user_agent) = &self.user_agent {
            options.user_agent = user_agent.clone();
        }
        options
    }
}

/// Policy for converting URLs pasted from the clipboard.
///
/// Each converter carries its own domain blacklist; a URL matching the
/// preferred converter's blacklist may still be handled by the other one.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClipboardConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub converter: ConvertKind,
    #[serde(default)]
    pub embed_blacklist: Vec<String>,
    #[serde(default)]
    pub bookmark_blacklist: Vec<String>,
}

impl ClipboardConfig {
    /// The blacklist guarding `kind`.
    #[must_use]
    pub fn blacklist(&self, kind: ConvertKind) -> &[String] {
        match kind {
            ConvertKind::Embed => &self.embed_blacklist,
            ConvertKind::BookmarkCard => &self.bookmark_blacklist,
        }
    }
}

/// Location of the config file: env override first, then the platform config
/// directory.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = env::var_os(CONFIG_PATH_ENV) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_FILE))
}

/// Load settings from the default location; a missing file means defaults.
pub fn load() -> Result<LinkcardConfig, ConfigError> {
    match config_path() {
        Some(path) => load_from(&path),
        None => Ok(LinkcardConfig::default()),
    }
}

/// Load settings from `path`; a missing file means defaults.
pub fn load_from(path: &Path) -> Result<LinkcardConfig, ConfigError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "no config file, using defaults");
        return Ok(LinkcardConfig::default());
    }
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
