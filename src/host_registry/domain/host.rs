//! Docker host metadata snapshot.

use super::{AgentEndpoint, HostId, ParseHostKindError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a docker host is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostKind {
    /// The docker daemon local to this process.
    Local,
    /// A remote agent reached over the network.
    Agent,
    /// A swarm node discovered through the local daemon.
    Swarm,
}

impl HostKind {
    /// Returns the canonical string representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Agent => "agent",
            Self::Swarm => "swarm",
        }
    }
}

impl fmt::Display for HostKind {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

impl TryFrom<&str> for HostKind {
    type Error = ParseHostKindError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "local" => Ok(Self::Local),
            "agent" => Ok(Self::Agent),
            "swarm" => Ok(Self::Swarm),
            _ => Err(ParseHostKindError(value.to_owned())),
        }
    }
}

/// Metadata describing a connected (or expected) docker host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Host {
    id: HostId,
    name: String,
    endpoint: String,
    available: bool,
    kind: HostKind,
}

impl Host {
    /// Creates an available host snapshot.
    #[must_use]
    pub fn new(
        id: HostId,
        name: impl Into<String>,
        endpoint: impl Into<String>,
        kind: HostKind,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            endpoint: endpoint.into(),
            available: true,
            kind,
        }
    }

    /// Creates the placeholder reported for an agent that has not connected.
    ///
    /// Identity, name and endpoint all carry the endpoint address.
    #[must_use]
    pub fn unreachable_agent(endpoint: &AgentEndpoint) -> Self {
        Self {
            id: endpoint.placeholder_host_id(),
            name: endpoint.as_str().to_owned(),
            endpoint: endpoint.as_str().to_owned(),
            available: false,
            kind: HostKind::Agent,
        }
    }

    /// Returns a copy with the given availability.
    #[must_use]
    pub const fn with_availability(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Returns the host identity.
    #[must_use]
    pub const fn id(&self) -> &HostId {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the address the host is reached through.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Returns whether the host answered its last query.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        self.available
    }

    /// Returns how the host is reached.
    #[must_use]
    pub const fn kind(&self) -> HostKind {
        self.kind
    }
}
