//! Optional TOML configuration passed with `--config`.
//!
//! Every key is optional. A missing or empty file yields `Config::default()`.
//! Unknown keys are ignored by serde, though we log a warning when the file
//! contains potential typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::feed::FetchPolicy;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Run settings for a discovery batch.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `User-Agent` header sent with every request.
    pub user_agent: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// Attempts per URL on transport errors (values below 1 count as 1).
    pub attempts: u32,

    /// Pause between attempts, in milliseconds.
    pub retry_delay_ms: u64,

    /// Pause between sites, in milliseconds.
    pub site_delay_ms: u64,

    /// Response bodies larger than this are rejected.
    pub max_body_bytes: usize,
}

pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (compatible; FeedVerifier/1.0; +https://example.local)";

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: 12,
            attempts: 2,
            retry_delay_ms: 600,
            site_delay_ms: 400,
            max_body_bytes: 5 * 1024 * 1024,
        }
    }
}

impl Config {
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: &'static [&'static str] = &[
        "user_agent",
        "timeout_secs",
        "attempts",
        "retry_delay_ms",
        "site_delay_ms",
        "max_body_bytes",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            attempts = config.attempts,
            timeout_secs = config.timeout_secs,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// HTTP settings for [`crate::feed::Fetcher`].
    pub fn fetch_policy(&self) -> FetchPolicy {
        FetchPolicy {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
            attempts: self.attempts.max(1),
            retry_delay: Duration::from_millis(self.retry_delay_ms),
            max_body_bytes: self.max_body_bytes,
        }
    }

    pub fn site_delay(&self) -> Duration {
        Duration::from_millis(self.site_delay_ms)
    }
}

// ============================================================================
// Tests
// ============================================================================
