//! Configuration types for rmr.
//!
//! [`Config::load`] reads `~/.config/rmr/config.toml`, creating it with
//! hardcoded defaults if it does not yet exist. [`Config::load_from`] reads
//! an explicit path (the `--config` flag) and fails if the file is missing.
//! [`Config::defaults`] returns the built-in defaults without touching the
//! filesystem (useful in tests).

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// Embedded defaults
// ---------------------------------------------------------------------------

const DEFAULT_CONFIG: &str = r#"
[server]
bind = "127.0.0.1:8090"

[fleet]
api_base     = "http://127.0.0.1:9000"
fragment_id  = ""
timeout_secs = 10

[query]
lookback_hours = 24
log_limit      = 10

[ui]
page_title       = "Read My Receipts"
timestamp_format = "%Y-%m-%d %H:%M UTC"
"#;

// ---------------------------------------------------------------------------
// Public config types
// ---------------------------------------------------------------------------

/// Top-level application configuration, loaded from `~/.config/rmr/config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub fleet: FleetConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub query: QueryConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

/// `[server]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address the dashboard listens on.
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "127.0.0.1:8090".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// `[fleet]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct FleetConfig {
    /// Base URL of the fleet cloud API.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Fragment (fleet template) whose machines the dashboard shows.
    #[serde(default)]
    pub fragment_id: String,
    /// Per-request timeout for cloud calls, in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_base() -> String {
    "http://127.0.0.1:9000".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            fragment_id: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// `[auth]` section of `config.toml`.
///
/// The cookie itself is read from the `RMR_COOKIE` environment variable
/// first; `cookie_file` is the fallback location.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthConfig {
    /// File containing the operator's cloud session cookie string.
    #[serde(default)]
    pub cookie_file: Option<PathBuf>,
}

/// `[query]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// How far back the per-machine "current receipt" view looks, in hours.
    #[serde(default = "default_lookback_hours")]
    pub lookback_hours: u32,
    /// How many records the fleet-wide inventory log shows.
    #[serde(default = "default_log_limit")]
    pub log_limit: u32,
}

fn default_lookback_hours() -> u32 {
    24
}
fn default_log_limit() -> u32 {
    10
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            lookback_hours: default_lookback_hours(),
            log_limit: default_log_limit(),
        }
    }
}

/// `[ui]` section of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_page_title")]
    pub page_title: String,
    /// `chrono` format string for timestamps in the rendered views.
    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_page_title() -> String {
    "Read My Receipts".to_string()
}
fn default_timestamp_format() -> String {
    "%Y-%m-%d %H:%M UTC".to_string()
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            page_title: default_page_title(),
            timestamp_format: default_timestamp_format(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::defaults()
    }
}

impl Config {
    /// Load from `~/.config/rmr/config.toml`, layered on top of the built-in
    /// defaults. Creates the file with defaults if it does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let path = config_path();

        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, DEFAULT_CONFIG.trim_start())?;
        }

        Self::layered(&path, false)
    }

    /// Load from an explicit path, layered on top of the built-in defaults.
    /// Unlike [`Config::load`] this fails if the file is missing.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        Self::layered(path, true)
    }

    /// Return the built-in defaults without touching the filesystem.
    pub fn defaults() -> Self {
        config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .build()
            .expect("built-in default config must be valid TOML")
            .try_deserialize()
            .expect("built-in default config must deserialize correctly")
    }

    fn layered(path: &Path, required: bool) -> anyhow::Result<Self> {
        config::Config::builder()
            .add_source(config::File::from_str(
                DEFAULT_CONFIG,
                config::FileFormat::Toml,
            ))
            .add_source(config::File::from(path).required(required))
            .build()?
            .try_deserialize()
            .map_err(Into::into)
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

fn config_path() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()))
                .join(".config")
        })
        .join("rmr")
        .join("config.toml")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
