//! Error types for board domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing or validating board values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BoardDomainError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The named agent is not part of the board roster.
    #[error("unknown agent '{0}'")]
    UnknownAgent(String),

    /// The author name is empty after trimming.
    #[error("agent name must not be empty")]
    EmptyAgentName,

    /// The author name exceeds the configured length limit.
    #[error("agent name has {actual} characters, exceeds limit of {max}")]
    AgentNameTooLong {
        /// Length of the rejected name in characters.
        actual: usize,
        /// Maximum permitted length.
        max: usize,
    },

    /// Free-text content exceeds the configured size limit.
    #[error("content size {actual_bytes} exceeds limit of {limit_bytes} bytes")]
    ContentTooLarge {
        /// Size of the rejected content in bytes.
        actual_bytes: usize,
        /// Maximum permitted size in bytes.
        limit_bytes: usize,
    },

    /// The task status value is not recognised.
    #[error(transparent)]
    InvalidStatus(#[from] ParseTaskStatusError),

    /// The task priority value is not recognised.
    #[error(transparent)]
    InvalidPriority(#[from] ParseTaskPriorityError),

    /// The action item type value is not recognised.
    #[error(transparent)]
    InvalidActionItemType(#[from] ParseActionItemTypeError),

    /// The due date is not an ISO-8601 calendar date.
    #[error("invalid due date '{0}', expected YYYY-MM-DD")]
    InvalidDueDate(String),
}

/// Error returned while parsing task statuses.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseTaskStatusError(pub String);

/// Error returned while parsing task priorities.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task priority: {0}")]
pub struct ParseTaskPriorityError(pub String);

/// Error returned while parsing action item types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown action item type: {0}")]
pub struct ParseActionItemTypeError(pub String);

/// Error returned while parsing chat roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown chat role: {0}")]
pub struct ParseChatRoleError(pub String);

/// Error returned while parsing activity actions from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown activity action: {0}")]
pub struct ParseActivityActionError(pub String);
