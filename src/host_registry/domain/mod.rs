//! Domain model for docker host identity and availability.
//!
//! Hosts are metadata snapshots produced by querying a connected client.
//! They are recomputed on demand and never owned by the registry itself.
//! Infrastructure concerns remain outside this boundary.

mod endpoint;
mod error;
mod host;
mod ids;

pub use endpoint::AgentEndpoint;
pub use error::{HostRegistryDomainError, ParseHostKindError};
pub use host::{Host, HostKind};
pub use ids::{HostId, ScopeId};
