//! Taskboard: a collaborative kanban board for humans and agents.
//!
//! Tasks move through Backlog, In Progress, Review, Done and Blocked. Moving
//! a task can raise action items, spawn an agent session through the
//! orchestration gateway, or release the agent when the supervisor accepts
//! the work. Every change is pushed to connected viewers as a JSON event.
//!
//! # Architecture
//!
//! The board follows hexagonal architecture principles:
//!
//! - **Domain**: Pure business logic with no infrastructure dependencies
//! - **Ports**: Abstract trait interfaces for persistence, sessions and
//!   live channels
//! - **Adapters**: In-memory and `PostgreSQL` stores, the gateway client,
//!   WebSocket channels
//!
//! # Modules
//!
//! - [`board`]: Tasks, comments, action items, activity and chat
//! - [`agent`]: Roster, mention scanning, prompts and session coordination
//! - [`live`]: Event broadcasting to connected viewers
//! - [`effects`]: Supervised fire-and-forget work
//! - [`config`]: Layered configuration
//! - [`http`]: JSON API and WebSocket endpoint
//! - [`app`]: Wiring a running board from configuration

pub mod agent;
pub mod app;
pub mod board;
pub mod config;
pub mod effects;
pub mod http;
pub mod live;

#[cfg(test)]
mod test_support;
