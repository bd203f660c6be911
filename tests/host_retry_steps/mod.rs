//! Step definitions for host retry BDD scenarios.

pub mod when;
