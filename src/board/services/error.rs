//! Errors surfaced by board services.

use thiserror::Error;

use crate::board::{
    domain::{ActionItemId, BoardDomainError, TaskId},
    ports::BoardStoreError,
};

/// Service-level errors for board operations.
#[derive(Debug, Clone, Error)]
pub enum BoardServiceError {
    /// The referenced task does not exist.
    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    /// The referenced action item does not exist.
    #[error("action item {0} not found")]
    ActionItemNotFound(ActionItemId),

    /// The acting agent may not perform the transition.
    #[error("only {supervisor} can mark tasks as done, not '{agent}'")]
    PermissionDenied {
        /// Agent that attempted the transition.
        agent: String,
        /// Identity allowed to perform it.
        supervisor: String,
    },

    /// Input was rejected before any write.
    #[error(transparent)]
    Validation(#[from] BoardDomainError),

    /// Persistence failed.
    #[error(transparent)]
    Store(BoardStoreError),
}

impl From<BoardStoreError> for BoardServiceError {
    fn from(err: BoardStoreError) -> Self {
        match err {
            BoardStoreError::TaskNotFound(id) => Self::TaskNotFound(id),
            BoardStoreError::ActionItemNotFound(id) => Self::ActionItemNotFound(id),
            other => Self::Store(other),
        }
    }
}

/// Result type for board service operations.
pub type BoardServiceResult<T> = Result<T, BoardServiceError>;
