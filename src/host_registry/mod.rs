//! Live registry of docker host clients with retry and availability fan-out.
//!
//! The registry tracks which local and agent hosts are currently connected,
//! keeps agent endpoints that could not be reached in a pending list, retries
//! them on demand or on a fixed interval, and notifies subscribers when a
//! pending agent becomes available. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]
//! - Configuration loading in [`config`]

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;
