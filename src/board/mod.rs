//! The task board.
//!
//! Tasks move through Backlog, In Progress, Review, Done and Blocked. The
//! lifecycle engine in [`services`] owns those transitions and their side
//! effects; comments, action items, the activity log and command-bar chat
//! hang off tasks. Layout:
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
