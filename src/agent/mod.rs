//! Agents and their work sessions.
//!
//! The roster of known agents, the port to the external orchestration
//! system that runs agent sessions, and the dispatch that turns board
//! activity into session requests. Layout:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
