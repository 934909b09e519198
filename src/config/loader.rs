//! Configuration structures and loading logic.

use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub upstream: UpstreamConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// HTTP service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Origins allowed by CORS. Empty allows any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Instagram access configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Browser user agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Instagram web app id sent as `X-IG-App-ID`.
    #[serde(default = "default_app_id")]
    pub app_id: String,

    /// GraphQL document id for shortcode queries (rotates every few weeks).
    #[serde(default = "default_graphql_doc_id")]
    pub graphql_doc_id: String,

    /// Timeout for metadata requests.
    #[serde(default = "default_metadata_timeout")]
    pub metadata_timeout_secs: u64,

    /// Timeout for opening an asset and between streamed chunks.
    #[serde(default = "default_asset_timeout")]
    pub asset_timeout_secs: u64,

    /// Attempts per metadata fetch, including the first (at most 2).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base delay before a metadata retry; jitter is added on top.
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            app_id: default_app_id(),
            graphql_doc_id: default_graphql_doc_id(),
            metadata_timeout_secs: default_metadata_timeout(),
            asset_timeout_secs: default_asset_timeout(),
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay(),
        }
    }
}

impl UpstreamConfig {
    pub fn metadata_timeout(&self) -> Duration {
        Duration::from_secs(self.metadata_timeout_secs)
    }

    pub fn asset_timeout(&self) -> Duration {
        Duration::from_secs(self.asset_timeout_secs)
    }

    pub fn retry_base_delay(&self) -> Duration {
        Duration::from_millis(self.retry_base_delay_ms)
    }
}

/// Metadata cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Whether analyze results are memoized.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Seconds a resolved descriptor stays valid.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,

    /// Maximum number of cached references.
    #[serde(default = "default_cache_entries")]
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: default_cache_ttl(),
            max_entries: default_cache_entries(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// CLI download output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Base directory for downloads.
    #[serde(default)]
    pub download_directory: Option<PathBuf>,

    /// Whether to show download progress.
    #[serde(default = "default_true")]
    pub show_progress: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            download_directory: None,
            show_progress: true,
        }
    }
}

fn default_bind_addr() -> String {
    "127.0.0.1:8001".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36".to_string()
}

fn default_app_id() -> String {
    "936619743392459".to_string()
}

fn default_graphql_doc_id() -> String {
    "8845758582119845".to_string()
}

fn default_metadata_timeout() -> u64 {
    10
}

fn default_asset_timeout() -> u64 {
    30
}

fn default_max_attempts() -> u32 {
    2
}

fn default_retry_base_delay() -> u64 {
    500
}

fn default_cache_ttl() -> u64 {
    60
}

fn default_cache_entries() -> usize {
    256
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Per-user configuration file location, e.g. `~/.config/insta-downloader/config.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "insta-downloader")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Get the effective download directory.
    pub fn download_directory(&self) -> PathBuf {
        self.output
            .download_directory
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}
