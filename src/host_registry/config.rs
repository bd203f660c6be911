//! Registry configuration loaded from JSON.
//!
//! A representative document is:
//!
//! ```json
//! {
//!   "endpoints": ["agent-1:7007", "agent-2:7007"],
//!   "retry_interval_secs": 30
//! }
//! ```
//!
//! Both fields are optional. Endpoints default to none and the retry
//! interval defaults to thirty seconds.

use crate::host_registry::domain::AgentEndpoint;
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_RETRY_INTERVAL_SECS: u64 = 30;

/// Errors returned while loading registry configuration.
#[derive(Debug, Error)]
pub enum RegistryConfigError {
    /// The configuration file could not be read.
    #[error("failed to read registry config {path}: {source}")]
    Read {
        /// Path that was read.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The document is not valid configuration JSON.
    #[error("failed to parse registry config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The retry interval is zero.
    #[error("retry interval must be greater than zero")]
    ZeroRetryInterval,
}

/// Agent endpoints to connect to and the cadence for retrying them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    #[serde(default)]
    endpoints: Vec<AgentEndpoint>,
    #[serde(default = "default_retry_interval_secs")]
    retry_interval_secs: u64,
}

const fn default_retry_interval_secs() -> u64 {
    DEFAULT_RETRY_INTERVAL_SECS
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            retry_interval_secs: DEFAULT_RETRY_INTERVAL_SECS,
        }
    }
}

impl RegistryConfig {
    /// Creates a configuration from already validated parts.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryConfigError::ZeroRetryInterval`] when the interval
    /// is shorter than one second.
    pub fn new(
        endpoints: Vec<AgentEndpoint>,
        retry_interval: Duration,
    ) -> Result<Self, RegistryConfigError> {
        let config = Self {
            endpoints,
            retry_interval_secs: retry_interval.as_secs(),
        };
        config.validate()
    }

    /// Parses configuration from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryConfigError::Parse`] for malformed JSON, unknown
    /// fields or invalid endpoints, and
    /// [`RegistryConfigError::ZeroRetryInterval`] for a zero interval.
    pub fn from_json_str(document: &str) -> Result<Self, RegistryConfigError> {
        let config: Self = serde_json::from_str(document)?;
        config.validate()
    }

    /// Reads and parses configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryConfigError::Read`] when the file cannot be opened
    /// or read, otherwise the errors of [`RegistryConfig::from_json_str`].
    pub fn from_path(path: &Utf8Path) -> Result<Self, RegistryConfigError> {
        let read_error = |source| RegistryConfigError::Read {
            path: path.to_owned(),
            source,
        };
        let file_name = path
            .file_name()
            .ok_or_else(|| read_error(std::io::Error::other("path must include a file name")))?;
        let parent = match path.parent() {
            Some(dir) if !dir.as_str().is_empty() => dir,
            _ => Utf8Path::new("."),
        };
        let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(read_error)?;
        let document = dir.read_to_string(file_name).map_err(read_error)?;
        Self::from_json_str(&document)
    }

    /// Returns the agent endpoints in configured order.
    #[must_use]
    pub fn endpoints(&self) -> &[AgentEndpoint] {
        &self.endpoints
    }

    /// Returns the delay between retry passes.
    #[must_use]
    pub const fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval_secs)
    }

    fn validate(self) -> Result<Self, RegistryConfigError> {
        if self.retry_interval_secs == 0 {
            return Err(RegistryConfigError::ZeroRetryInterval);
        }
        Ok(self)
    }
}
