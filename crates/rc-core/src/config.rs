//! Application configuration types.
//!
//! The top-level [`Config`] struct is deserialized from JSON and carries the
//! server, storage, and streaming sections. Every section defaults sensibly
//! so a completely empty `{}` file is valid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::Error;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub streaming: StreamingConfig,
}

impl Config {
    /// Deserialize a `Config` from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self> {
        serde_json::from_str(json_str)
            .map_err(|e| Error::Validation(format!("config parse error: {e}")))
    }

    /// Read and parse a config file, failing on any I/O or parse error.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a file path, falling back to defaults if the
    /// path is `None` or the file does not exist.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).unwrap_or_else(|e| {
                tracing::warn!("Failed to parse config file {}: {e}", path.display());
                Self::default()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("No config file at {}; using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                tracing::warn!("Failed to read config file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    /// Return a list of validation warnings (non-fatal issues).
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            warnings.push("server.port is 0; a random port will be assigned".into());
        }

        if self.storage.upload_dir.as_os_str().is_empty() {
            warnings.push("storage.upload_dir is empty; uploads land in the working directory".into());
        }

        if self.storage.max_upload_bytes == 0 {
            warnings.push("storage.max_upload_bytes is 0; every upload will be rejected".into());
        }

        if self.streaming.chunk_size == 0 {
            warnings.push(format!(
                "streaming.chunk_size is 0; falling back to {DEFAULT_CHUNK_SIZE}"
            ));
        }

        if self.streaming.content_type.trim().is_empty() {
            warnings.push("streaming.content_type is empty".into());
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
            db_path: PathBuf::from("data/reelcast.db"),
        }
    }
}

/// Where uploaded media is written and how large it may be.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub max_upload_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            max_upload_bytes: 2 * 1024 * 1024 * 1024,
        }
    }
}

/// What to do with a stream request that carries no `Range` header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoRangePolicy {
    /// Answer `200 OK` with the whole file.
    #[default]
    ServeFull,
    /// Refuse the request; clients must ask for an explicit range.
    Reject,
}

impl fmt::Display for NoRangePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServeFull => write!(f, "serve_full"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

/// Read size used when none (or zero) is configured.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Streaming response settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    pub no_range_policy: NoRangePolicy,
    /// Read size for each body chunk, in bytes.
    pub chunk_size: usize,
    pub content_type: String,
}

impl StreamingConfig {
    /// The configured chunk size, or [`DEFAULT_CHUNK_SIZE`] when unset.
    pub fn effective_chunk_size(&self) -> usize {
        if self.chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            self.chunk_size
        }
    }
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            no_range_policy: NoRangePolicy::default(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            content_type: "video/mp4".into(),
        }
    }
}
