//! Configuration for chunkdc.
//!
//! Resolution order: environment variables → config file → defaults.
//!
//! Config file location:
//!   1. $CHUNKDC_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/chunkdc/config.toml
//!   3. ~/.config/chunkdc/config.toml

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::wire::HEADER_LENGTH;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkdcConfig {
    pub chunking: ChunkingConfig,
    pub gc: GcConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Full wire size of a chunk, header included.
    pub chunk_size: u32,
    /// First id handed out to outgoing messages.
    pub first_message_id: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GcConfig {
    /// Collectors idle for longer than this are discarded.
    pub max_age_secs: u64,
    /// How often the sweeper runs.
    pub interval_secs: u64,
}

// ── Defaults ──────────────────────────────────────────────────────────────────

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 16384,
            first_message_id: 0,
        }
    }
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 30,
            interval_secs: 5,
        }
    }
}

impl GcConfig {
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
        .join("chunkdc")
}

fn home_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl ChunkdcConfig {
    /// Load config: env vars → file → defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::file_path();
        let mut config = if path.exists() {
            let text = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadFailed(path.clone(), e))?;
            toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(path.clone(), e))?
        } else {
            ChunkdcConfig::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("CHUNKDC_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&ChunkdcConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Reject settings the chunker or sweeper cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let min = HEADER_LENGTH as u32 + 1;
        if self.chunking.chunk_size < min {
            return Err(ConfigError::Invalid(format!(
                "chunking.chunk_size must be at least {min}, got {}",
                self.chunking.chunk_size
            )));
        }
        if self.gc.interval_secs == 0 {
            return Err(ConfigError::Invalid("gc.interval_secs must be non-zero".into()));
        }
        Ok(())
    }

    /// Apply CHUNKDC_* env var overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("CHUNKDC_CHUNKING__CHUNK_SIZE") {
            if let Ok(n) = v.parse() {
                self.chunking.chunk_size = n;
            }
        }
        if let Ok(v) = std::env::var("CHUNKDC_GC__MAX_AGE_SECS") {
            if let Ok(n) = v.parse() {
                self.gc.max_age_secs = n;
            }
        }
        if let Ok(v) = std::env::var("CHUNKDC_GC__INTERVAL_SECS") {
            if let Ok(n) = v.parse() {
                self.gc.interval_secs = n;
            }
        }
    }
}
