//! In-memory session coordinator that records every call.
//!
//! Used by tests and local development to observe dispatch behaviour
//! without an orchestration gateway.

use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::agent::{
    domain::{SessionInfo, SessionKey, SpawnRequest, SpawnedSession},
    ports::{SessionCoordinator, SessionCoordinatorError, SessionCoordinatorResult},
};

/// A message delivered to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredMessage {
    /// Target session.
    pub session_key: SessionKey,
    /// Message body.
    pub message: String,
}

/// Recording session coordinator with scripted outcomes.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionCoordinator {
    state: Arc<Mutex<RecorderState>>,
}

#[derive(Debug, Default)]
struct RecorderState {
    fail_spawns: bool,
    reject_messages: bool,
    reply: Option<String>,
    sessions: Vec<SessionInfo>,
    spawned: Vec<SpawnRequest>,
    sent: Vec<DeliveredMessage>,
    conversed: Vec<DeliveredMessage>,
    stopped: Vec<SessionKey>,
    deleted: Vec<SessionKey>,
    notifications: Vec<String>,
    next_run: u64,
}

impl InMemorySessionCoordinator {
    /// Creates a coordinator that accepts every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> SessionCoordinatorResult<MutexGuard<'_, RecorderState>> {
        self.state.lock().map_err(|err| {
            SessionCoordinatorError::transport(std::io::Error::other(err.to_string()))
        })
    }

    fn read<T>(&self, project: impl FnOnce(&RecorderState) -> T) -> T {
        let guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        project(&guard)
    }

    fn write(&self, update: impl FnOnce(&mut RecorderState)) {
        let mut guard = self
            .state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        update(&mut guard);
    }

    /// Makes subsequent spawns fail with a rejection.
    pub fn fail_spawns(&self, fail: bool) {
        self.write(|state| state.fail_spawns = fail);
    }

    /// Makes subsequent deliveries report `false`.
    pub fn reject_messages(&self, reject: bool) {
        self.write(|state| state.reject_messages = reject);
    }

    /// Sets the reply returned by conversational calls.
    pub fn set_reply(&self, reply: Option<String>) {
        self.write(|state| state.reply = reply);
    }

    /// Sets the sessions reported by listing calls.
    pub fn set_sessions(&self, sessions: Vec<SessionInfo>) {
        self.write(|state| state.sessions = sessions);
    }

    /// Returns every spawn request received.
    #[must_use]
    pub fn spawned(&self) -> Vec<SpawnRequest> {
        self.read(|state| state.spawned.clone())
    }

    /// Returns every fire-and-forget delivery received.
    #[must_use]
    pub fn sent(&self) -> Vec<DeliveredMessage> {
        self.read(|state| state.sent.clone())
    }

    /// Returns every conversational delivery received.
    #[must_use]
    pub fn conversed(&self) -> Vec<DeliveredMessage> {
        self.read(|state| state.conversed.clone())
    }

    /// Returns every stopped session.
    #[must_use]
    pub fn stopped(&self) -> Vec<SessionKey> {
        self.read(|state| state.stopped.clone())
    }

    /// Returns every deleted session.
    #[must_use]
    pub fn deleted(&self) -> Vec<SessionKey> {
        self.read(|state| state.deleted.clone())
    }

    /// Returns every wake notification received.
    #[must_use]
    pub fn notifications(&self) -> Vec<String> {
        self.read(|state| state.notifications.clone())
    }
}

#[async_trait]
impl SessionCoordinator for InMemorySessionCoordinator {
    async fn spawn_session(
        &self,
        request: SpawnRequest,
    ) -> SessionCoordinatorResult<SpawnedSession> {
        let mut state = self.lock()?;
        if state.fail_spawns {
            return Err(SessionCoordinatorError::Rejected(format!(
                "spawn refused for {}",
                request.agent_id
            )));
        }
        state.next_run += 1;
        let run = state.next_run;
        let session_key = SessionKey::new(format!("agent:{}:subagent:{run}", request.agent_id))
            .map_err(|err| SessionCoordinatorError::Rejected(err.to_string()))?;
        state.spawned.push(request);
        Ok(SpawnedSession {
            session_key: Some(session_key),
            run_id: Some(format!("run-{run}")),
        })
    }

    async fn send_to_session(
        &self,
        session_key: &SessionKey,
        message: &str,
    ) -> SessionCoordinatorResult<bool> {
        let mut state = self.lock()?;
        if state.reject_messages {
            return Ok(false);
        }
        state.sent.push(DeliveredMessage {
            session_key: session_key.clone(),
            message: message.to_owned(),
        });
        Ok(true)
    }

    async fn converse(
        &self,
        session_key: &SessionKey,
        message: &str,
    ) -> SessionCoordinatorResult<Option<String>> {
        let mut state = self.lock()?;
        if state.reject_messages {
            return Err(SessionCoordinatorError::Rejected(format!(
                "session {session_key} rejected the message"
            )));
        }
        state.conversed.push(DeliveredMessage {
            session_key: session_key.clone(),
            message: message.to_owned(),
        });
        Ok(state.reply.clone())
    }

    async fn list_sessions(&self) -> SessionCoordinatorResult<Vec<SessionInfo>> {
        Ok(self.lock()?.sessions.clone())
    }

    async fn stop_session(&self, session_key: &SessionKey) -> SessionCoordinatorResult<()> {
        self.lock()?.stopped.push(session_key.clone());
        Ok(())
    }

    async fn delete_session(&self, session_key: &SessionKey) -> SessionCoordinatorResult<bool> {
        let mut state = self.lock()?;
        let existed = state
            .sessions
            .iter()
            .any(|session| session.key == session_key.as_str());
        state
            .sessions
            .retain(|session| session.key != session_key.as_str());
        state.deleted.push(session_key.clone());
        Ok(existed)
    }

    async fn notify(&self, text: &str) -> SessionCoordinatorResult<()> {
        self.lock()?.notifications.push(text.to_owned());
        Ok(())
    }
}
