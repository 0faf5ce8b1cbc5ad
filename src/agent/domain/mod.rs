//! Domain model for agents and their work sessions.
//!
//! The roster is a closed set: every agent the board can spawn or mention is
//! listed with its external orchestration identifier, and unknown names are
//! rejected where they enter the system.

mod error;
mod mention;
mod roster;
mod session;

pub use error::AgentDomainError;
pub use mention::MentionScanner;
pub use roster::{AgentRoster, ExternalAgentId, RosterAgent, UNASSIGNED};
pub use session::{
    SessionCleanup, SessionInfo, SessionKey, SessionSummary, SpawnRequest, SpawnedSession,
};
