//! Error types for agent roster and session values.

use thiserror::Error;

/// Errors returned while constructing agent roster and session values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AgentDomainError {
    /// An agent display name is empty after trimming.
    #[error("agent name must not be empty")]
    EmptyAgentName,

    /// An external agent identifier is empty after trimming.
    #[error("external agent identifier must not be empty")]
    EmptyExternalId,

    /// Two roster entries share a name, compared case-insensitively.
    #[error("duplicate roster agent '{0}'")]
    DuplicateAgent(String),

    /// A reserved identity (supervisor, system author, unassigned) is also
    /// listed as a roster agent.
    #[error("'{0}' is reserved and cannot be a roster agent")]
    ReservedName(String),

    /// A session key is empty after trimming.
    #[error("session key must not be empty")]
    EmptySessionKey,

    /// A prompt template failed to compile or render.
    #[error("prompt template '{template}' failed: {reason}")]
    TemplateRender {
        /// Template name.
        template: String,
        /// Rendering failure description.
        reason: String,
    },
}
