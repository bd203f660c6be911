//! Error types for host registry domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing host registry domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HostRegistryDomainError {
    /// The host identifier is empty after trimming.
    #[error("host identifier must not be empty")]
    EmptyHostId,

    /// The agent endpoint is empty after trimming.
    #[error("agent endpoint must not be empty")]
    EmptyEndpoint,

    /// The agent endpoint contains whitespace.
    #[error("agent endpoint '{0}' must not contain whitespace")]
    InvalidEndpoint(String),
}

/// Error returned while parsing a host kind tag.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown host kind: {0}")]
pub struct ParseHostKindError(pub String);
