//! Core configuration.
//!
//! # Responsibility
//! - Load tunables from a JSON file and `KBVIEW_*` environment overrides.
//! - Hand configured builders to the reconciliation services.
//!
//! # Invariants
//! - Every field has a default, so an empty object is a valid config.
//! - The poll interval is never below one second.

use crate::logging::{default_log_level, init_logging, LoggingError};
use crate::service::heading_outline::{HeadingExtractor, DEFAULT_HEADING_ID_PREFIX};
use crate::tree::forest::{ForestBuilder, DEFAULT_MAX_ANCESTOR_DEPTH};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_LOG_LEVEL: &str = "KBVIEW_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "KBVIEW_LOG_DIR";
pub const ENV_POLL_INTERVAL_SECS: &str = "KBVIEW_POLL_INTERVAL_SECS";

const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    /// Config file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Config file is not valid JSON for `CoreConfig`.
    Parse(serde_json::Error),
    /// A field holds a value outside its contract.
    InvalidValue {
        field: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
            Self::InvalidValue { field, message } => {
                write!(f, "invalid config field `{field}`: {message}")
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::InvalidValue { .. } => None,
        }
    }
}

/// Tunables for the reconciliation core and notification session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub log_level: String,
    /// Absolute directory for rolling logs. `None` leaves logging off.
    pub log_dir: Option<PathBuf>,
    pub poll_interval_secs: u64,
    pub max_ancestor_depth: usize,
    pub heading_id_prefix: String,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            max_ancestor_depth: DEFAULT_MAX_ANCESTOR_DEPTH,
            heading_id_prefix: DEFAULT_HEADING_ID_PREFIX.to_string(),
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: CoreConfig = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Applies `KBVIEW_*` process environment overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`. Unparseable or blank values are ignored.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|value| !value.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
        if let Some(dir) = lookup(ENV_LOG_DIR).filter(|value| !value.trim().is_empty()) {
            self.log_dir = Some(PathBuf::from(dir.trim()));
        }
        if let Some(secs) = lookup(ENV_POLL_INTERVAL_SECS)
            .and_then(|value| value.trim().parse::<u64>().ok())
        {
            self.poll_interval_secs = secs;
        }
        self
    }

    /// Checks field contracts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_ancestor_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_ancestor_depth",
                message: "must be at least 1".to_string(),
            });
        }
        if self.heading_id_prefix.trim().is_empty()
            || self.heading_id_prefix.contains(char::is_whitespace)
        {
            return Err(ConfigError::InvalidValue {
                field: "heading_id_prefix",
                message: "must be non-empty and contain no whitespace".to_string(),
            });
        }
        Ok(())
    }

    /// Status poll interval, at least one second.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }

    pub fn forest_builder(&self) -> ForestBuilder {
        ForestBuilder::new().max_ancestor_depth(self.max_ancestor_depth)
    }

    pub fn heading_extractor(&self) -> HeadingExtractor {
        HeadingExtractor::new(self.heading_id_prefix.clone())
    }

    /// Starts logging when `log_dir` is set. Returns `Ok(false)` when it is not.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match &self.log_dir {
            Some(dir) => init_logging(&self.log_level, dir).map(|()| true),
            None => Ok(false),
        }
    }
}
