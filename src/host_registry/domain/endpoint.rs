//! Validated agent endpoint address.

use super::{HostId, HostRegistryDomainError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Network address of a remote agent, for example `agent-1:7007`.
///
/// The address is opaque to the registry; only the connector interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentEndpoint(String);

impl AgentEndpoint {
    /// Creates a validated endpoint.
    ///
    /// The input is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`HostRegistryDomainError::EmptyEndpoint`] when the value is
    /// empty after trimming, or [`HostRegistryDomainError::InvalidEndpoint`]
    /// when it contains inner whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, HostRegistryDomainError> {
        let raw = value.into();
        let normalized = raw.trim();

        if normalized.is_empty() {
            return Err(HostRegistryDomainError::EmptyEndpoint);
        }

        if normalized.chars().any(char::is_whitespace) {
            return Err(HostRegistryDomainError::InvalidEndpoint(raw));
        }

        Ok(Self(normalized.to_owned()))
    }

    /// Returns the endpoint as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the host identity used for an agent that has never answered.
    #[must_use]
    pub fn placeholder_host_id(&self) -> HostId {
        HostId::from_validated(self.0.clone())
    }
}

impl TryFrom<String> for AgentEndpoint {
    type Error = HostRegistryDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<AgentEndpoint> for String {
    fn from(endpoint: AgentEndpoint) -> Self {
        endpoint.0
    }
}

impl AsRef<str> for AgentEndpoint {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for AgentEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
