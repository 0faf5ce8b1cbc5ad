//! Port for the external agent orchestration system.

use crate::agent::domain::{SessionInfo, SessionKey, SpawnRequest, SpawnedSession};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Result type for session coordinator operations.
pub type SessionCoordinatorResult<T> = Result<T, SessionCoordinatorError>;

/// Contract for spawning, messaging and tearing down agent work sessions.
///
/// Every call is asynchronous, fallible and time-bounded by the
/// implementation. Callers treat failures as degraded automation, never as
/// a reason to fail a board mutation.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionCoordinator: Send + Sync {
    /// Starts a new agent session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionCoordinatorError`] when the orchestration system is
    /// unavailable or rejects the request.
    async fn spawn_session(&self, request: SpawnRequest)
    -> SessionCoordinatorResult<SpawnedSession>;

    /// Delivers a message to a running session without waiting for a reply.
    ///
    /// Returns `false` when the orchestration system did not accept the
    /// message.
    ///
    /// # Errors
    ///
    /// Returns [`SessionCoordinatorError`] on transport failure.
    async fn send_to_session(
        &self,
        session_key: &SessionKey,
        message: &str,
    ) -> SessionCoordinatorResult<bool>;

    /// Delivers a message and waits for the session's reply.
    ///
    /// Returns `None` when the session accepted the message but produced no
    /// reply.
    ///
    /// # Errors
    ///
    /// Returns [`SessionCoordinatorError`] when delivery fails or times out.
    async fn converse(
        &self,
        session_key: &SessionKey,
        message: &str,
    ) -> SessionCoordinatorResult<Option<String>>;

    /// Lists the sessions currently known to the orchestration system.
    ///
    /// # Errors
    ///
    /// Returns [`SessionCoordinatorError`] when the listing cannot be fetched.
    async fn list_sessions(&self) -> SessionCoordinatorResult<Vec<SessionInfo>>;

    /// Asks a session to abort its current run.
    ///
    /// # Errors
    ///
    /// Returns [`SessionCoordinatorError`] when the stop signal cannot be sent.
    async fn stop_session(&self, session_key: &SessionKey) -> SessionCoordinatorResult<()>;

    /// Removes a session from the orchestration system.
    ///
    /// Returns `true` when the session existed and was removed.
    ///
    /// # Errors
    ///
    /// Returns [`SessionCoordinatorError`] on transport failure.
    async fn delete_session(&self, session_key: &SessionKey) -> SessionCoordinatorResult<bool>;

    /// Wakes the coordinating agent with a free-text notification.
    ///
    /// # Errors
    ///
    /// Returns [`SessionCoordinatorError`] when the notification is rejected.
    async fn notify(&self, text: &str) -> SessionCoordinatorResult<()>;
}

/// Errors returned by session coordinator implementations.
#[derive(Debug, Clone, Error)]
pub enum SessionCoordinatorError {
    /// The orchestration integration is disabled or unreachable.
    #[error("agent orchestration is unavailable")]
    Unavailable,

    /// The call did not complete within its time bound.
    #[error("agent orchestration call timed out after {0:?}")]
    Timeout(Duration),

    /// The orchestration system refused the request.
    #[error("agent orchestration rejected the request: {0}")]
    Rejected(String),

    /// Transport-level failure.
    #[error("agent orchestration transport error: {0}")]
    Transport(Arc<dyn std::error::Error + Send + Sync>),
}

impl SessionCoordinatorError {
    /// Wraps a transport error.
    pub fn transport(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Transport(Arc::new(err))
    }
}
