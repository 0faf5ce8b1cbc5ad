//! Session coordinator used when no orchestration gateway is configured.

use async_trait::async_trait;

use crate::agent::{
    domain::{SessionInfo, SessionKey, SpawnRequest, SpawnedSession},
    ports::{SessionCoordinator, SessionCoordinatorError, SessionCoordinatorResult},
};

/// Coordinator that reports [`SessionCoordinatorError::Unavailable`] for
/// every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledSessionCoordinator;

#[async_trait]
impl SessionCoordinator for DisabledSessionCoordinator {
    async fn spawn_session(&self, _: SpawnRequest) -> SessionCoordinatorResult<SpawnedSession> {
        Err(SessionCoordinatorError::Unavailable)
    }

    async fn send_to_session(&self, _: &SessionKey, _: &str) -> SessionCoordinatorResult<bool> {
        Err(SessionCoordinatorError::Unavailable)
    }

    async fn converse(&self, _: &SessionKey, _: &str) -> SessionCoordinatorResult<Option<String>> {
        Err(SessionCoordinatorError::Unavailable)
    }

    async fn list_sessions(&self) -> SessionCoordinatorResult<Vec<SessionInfo>> {
        Err(SessionCoordinatorError::Unavailable)
    }

    async fn stop_session(&self, _: &SessionKey) -> SessionCoordinatorResult<()> {
        Err(SessionCoordinatorError::Unavailable)
    }

    async fn delete_session(&self, _: &SessionKey) -> SessionCoordinatorResult<bool> {
        Err(SessionCoordinatorError::Unavailable)
    }

    async fn notify(&self, _: &str) -> SessionCoordinatorResult<()> {
        Err(SessionCoordinatorError::Unavailable)
    }
}
