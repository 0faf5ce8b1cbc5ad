//! Session management surface: listing, creating, stopping and deleting
//! agent sessions.
//!
//! Orchestration failures are reported in the returned outcomes; only board
//! store failures surface as errors.

use mockable::Clock;
use serde::Serialize;
use std::collections::HashSet;
use tracing::warn;

use crate::agent::domain::{
    ExternalAgentId, SessionKey, SessionSummary, SpawnRequest, SpawnedSession,
};
use crate::board::{
    ports::BoardStore,
    services::{BoardRuntime, BoardServiceResult},
};
use crate::live::domain::BoardEvent;

const DEFAULT_SESSION_TASK: &str = "New session started from Task Board. Awaiting instructions.";

/// Sessions known to the orchestration system, minus deleted ones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionListing {
    /// Main sessions first, then most recently updated.
    pub sessions: Vec<SessionSummary>,
    /// Why the listing could not be fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Request payload for starting a session by hand.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateSessionRequest {
    /// External agent identifier; the main agent when absent.
    pub agent_id: Option<String>,
    /// Session label; generated from the time when absent.
    pub label: Option<String>,
    /// Initial instructions.
    pub task: Option<String>,
}

/// Outcome of a single-session operation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionOutcome {
    /// Whether the orchestration system accepted the request.
    pub success: bool,
    /// Human-readable result.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Why the request failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Spawned session details, for creations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<SpawnedSession>,
    /// Whether the orchestration system removed the session, for deletions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinator_deleted: Option<bool>,
}

impl SessionOutcome {
    fn succeeded(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            ..Self::default()
        }
    }

    fn failed(error: impl ToString) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Outcome of stopping every non-main session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StopAllOutcome {
    /// Whether the session listing was fetched.
    pub success: bool,
    /// Sessions that were stopped.
    pub stopped: Vec<String>,
    /// Sessions whose stop signal failed.
    pub errors: Vec<String>,
    /// Human-readable summary.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Why the listing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Session administration service.
pub struct SessionAdminService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    runtime: BoardRuntime<S, C>,
    main_label: String,
}

impl<S, C> Clone for SessionAdminService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            main_label: self.main_label.clone(),
        }
    }
}

impl<S, C> SessionAdminService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    /// Creates the service. The main session is labelled after the
    /// coordinating agent.
    #[must_use]
    pub fn new(runtime: BoardRuntime<S, C>) -> Self {
        let main_label = format!("🛡️ {} (Main)", runtime.prompts().context().main_agent_name);
        Self {
            runtime,
            main_label,
        }
    }

    /// Overrides the main session label.
    #[must_use]
    pub fn with_main_label(mut self, label: impl Into<String>) -> Self {
        self.main_label = label.into();
        self
    }

    /// Lists live sessions, hiding those deleted from the board and
    /// forgetting deletions the orchestration system no longer reports.
    ///
    /// # Errors
    ///
    /// Returns [`crate::board::services::BoardServiceError::Store`] when the
    /// deleted-session records cannot be read or pruned.
    pub async fn list(&self) -> BoardServiceResult<SessionListing> {
        let reported = match self.runtime.coordinator().list_sessions().await {
            Ok(sessions) => sessions,
            Err(err) => {
                warn!(error = %err, "session listing failed");
                return Ok(SessionListing {
                    sessions: Vec::new(),
                    error: Some(err.to_string()),
                });
            }
        };

        let store = self.runtime.store();
        let deleted: HashSet<String> = store.deleted_sessions().await?.into_iter().collect();
        let live: HashSet<&str> = reported.iter().map(|info| info.key.as_str()).collect();
        let orphaned: Vec<String> = deleted
            .iter()
            .filter(|key| !live.contains(key.as_str()))
            .cloned()
            .collect();
        store.forget_deleted_sessions(&orphaned).await?;

        let mut sessions: Vec<SessionSummary> = reported
            .into_iter()
            .filter(|info| !deleted.contains(&info.key))
            .map(|info| SessionSummary::from_info(info, &self.main_label))
            .collect();
        sessions.sort_by(|left, right| {
            right
                .is_main()
                .cmp(&left.is_main())
                .then(right.updated_at.cmp(&left.updated_at))
        });
        Ok(SessionListing {
            sessions,
            error: None,
        })
    }

    /// Starts a session for an agent.
    pub async fn create(&self, request: CreateSessionRequest) -> SessionOutcome {
        let agent_id = match ExternalAgentId::new(
            request
                .agent_id
                .unwrap_or_else(|| ExternalAgentId::MAIN.to_owned()),
        ) {
            Ok(agent_id) => agent_id,
            Err(err) => return SessionOutcome::failed(err),
        };
        let label = request.label.unwrap_or_else(|| {
            format!("taskboard-{}", self.runtime.clock().utc().format("%H%M%S"))
        });
        let task = request
            .task
            .unwrap_or_else(|| DEFAULT_SESSION_TASK.to_owned());
        match self
            .runtime
            .coordinator()
            .spawn_session(SpawnRequest::new(agent_id, task, label))
            .await
        {
            Ok(spawned) => SessionOutcome {
                success: true,
                result: Some(spawned),
                ..SessionOutcome::default()
            },
            Err(err) => {
                warn!(error = %err, "session creation failed");
                SessionOutcome::failed(err)
            }
        }
    }

    /// Aborts a session's current run.
    pub async fn stop(&self, session_key: &str) -> SessionOutcome {
        let key = match SessionKey::new(session_key) {
            Ok(key) => key,
            Err(err) => return SessionOutcome::failed(err),
        };
        match self.runtime.coordinator().stop_session(&key).await {
            Ok(()) => SessionOutcome::succeeded(format!("Stopped session: {key}")),
            Err(err) => {
                warn!(session_key = %key, error = %err, "session stop failed");
                SessionOutcome::failed(err)
            }
        }
    }

    /// Stops every session that is not a main session.
    pub async fn stop_all(&self) -> StopAllOutcome {
        let sessions = match self.runtime.coordinator().list_sessions().await {
            Ok(sessions) => sessions,
            Err(err) => {
                return StopAllOutcome {
                    error: Some(err.to_string()),
                    ..StopAllOutcome::default()
                };
            }
        };
        let mut outcome = StopAllOutcome {
            success: true,
            ..StopAllOutcome::default()
        };
        for info in sessions {
            if info.key.is_empty() || info.key.to_lowercase().contains("main") {
                continue;
            }
            if self.stop(&info.key).await.success {
                outcome.stopped.push(info.key);
            } else {
                outcome.errors.push(info.key);
            }
        }
        outcome.message = Some(format!("Stopped {} sessions", outcome.stopped.len()));
        outcome
    }

    /// Stops a session, drops its chat history, hides it from listings and
    /// asks the orchestration system to remove it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::board::services::BoardServiceError::Store`] when the
    /// local chat history or deletion record cannot be written.
    pub async fn delete(&self, session_key: &str) -> BoardServiceResult<SessionOutcome> {
        let key = match SessionKey::new(session_key) {
            Ok(key) => key,
            Err(err) => return Ok(SessionOutcome::failed(err)),
        };
        let coordinator = self.runtime.coordinator();
        if let Err(err) = coordinator.stop_session(&key).await {
            warn!(session_key = %key, error = %err, "stop before delete failed");
        }

        let store = self.runtime.store();
        store.delete_chat_history(key.as_str()).await?;
        store
            .record_deleted_session(key.as_str(), self.runtime.clock().utc())
            .await?;

        let removed = match coordinator.delete_session(&key).await {
            Ok(removed) => removed,
            Err(err) => {
                warn!(session_key = %key, error = %err, "orchestration delete failed");
                false
            }
        };
        self.runtime
            .publish(BoardEvent::SessionDeleted {
                session_key: key.as_str().to_owned(),
            })
            .await;
        Ok(SessionOutcome {
            coordinator_deleted: Some(removed),
            ..SessionOutcome::succeeded(format!("Deleted session: {key}"))
        })
    }
}
