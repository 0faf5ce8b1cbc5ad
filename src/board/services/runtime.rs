//! Collaborators shared by every board service.

use mockable::Clock;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::debug;

use super::{BoardServiceError, BoardServiceResult, TaskLocks};
use crate::agent::{
    adapters::DisabledSessionCoordinator,
    domain::{AgentRoster, SessionKey},
    ports::SessionCoordinator,
    services::PromptRenderer,
};
use crate::board::{
    domain::{Comment, ContentLimits, NewComment, Task, TaskId},
    ports::{BoardStore, BoardStoreResult, TaskCommit},
};
use crate::effects::DetachedEffects;
use crate::live::{domain::BoardEvent, services::Broadcaster};

/// Shared handles used by the board services.
///
/// Cloning is cheap; every collaborator sits behind an [`Arc`].
pub struct BoardRuntime<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
    roster: Arc<AgentRoster>,
    broadcaster: Arc<Broadcaster>,
    coordinator: Arc<dyn SessionCoordinator>,
    effects: Arc<DetachedEffects>,
    prompts: Arc<PromptRenderer>,
    limits: ContentLimits,
    locks: Arc<TaskLocks>,
}

impl<S, C> Clone for BoardRuntime<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
            roster: Arc::clone(&self.roster),
            broadcaster: Arc::clone(&self.broadcaster),
            coordinator: Arc::clone(&self.coordinator),
            effects: Arc::clone(&self.effects),
            prompts: Arc::clone(&self.prompts),
            limits: self.limits,
            locks: Arc::clone(&self.locks),
        }
    }
}

impl<S, C> BoardRuntime<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    /// Creates a runtime with a fresh broadcaster, no orchestration and
    /// default limits.
    #[must_use]
    pub fn new(store: Arc<S>, clock: Arc<C>, roster: Arc<AgentRoster>) -> Self {
        Self {
            store,
            clock,
            roster,
            broadcaster: Arc::new(Broadcaster::new()),
            coordinator: Arc::new(DisabledSessionCoordinator),
            effects: Arc::new(DetachedEffects::default()),
            prompts: Arc::new(PromptRenderer::default()),
            limits: ContentLimits::default(),
            locks: Arc::new(TaskLocks::new()),
        }
    }

    /// Uses an existing broadcaster.
    #[must_use]
    pub fn with_broadcaster(mut self, broadcaster: Arc<Broadcaster>) -> Self {
        self.broadcaster = broadcaster;
        self
    }

    /// Uses an agent orchestration coordinator.
    #[must_use]
    pub fn with_coordinator(mut self, coordinator: Arc<dyn SessionCoordinator>) -> Self {
        self.coordinator = coordinator;
        self
    }

    /// Uses an existing effect runner.
    #[must_use]
    pub fn with_effects(mut self, effects: Arc<DetachedEffects>) -> Self {
        self.effects = effects;
        self
    }

    /// Uses a configured prompt renderer.
    #[must_use]
    pub fn with_prompts(mut self, prompts: Arc<PromptRenderer>) -> Self {
        self.prompts = prompts;
        self
    }

    /// Overrides content limits.
    #[must_use]
    pub const fn with_limits(mut self, limits: ContentLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Returns the board store.
    #[must_use]
    pub const fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Returns the clock.
    #[must_use]
    pub const fn clock(&self) -> &Arc<C> {
        &self.clock
    }

    /// Returns the agent roster.
    #[must_use]
    pub const fn roster(&self) -> &Arc<AgentRoster> {
        &self.roster
    }

    /// Returns the live update broadcaster.
    #[must_use]
    pub const fn broadcaster(&self) -> &Arc<Broadcaster> {
        &self.broadcaster
    }

    /// Returns the agent orchestration coordinator.
    #[must_use]
    pub const fn coordinator(&self) -> &Arc<dyn SessionCoordinator> {
        &self.coordinator
    }

    /// Returns the detached effect runner.
    #[must_use]
    pub const fn effects(&self) -> &Arc<DetachedEffects> {
        &self.effects
    }

    /// Returns the prompt renderer.
    #[must_use]
    pub const fn prompts(&self) -> &Arc<PromptRenderer> {
        &self.prompts
    }

    /// Returns the content limits.
    #[must_use]
    pub const fn limits(&self) -> ContentLimits {
        self.limits
    }

    pub(crate) async fn lock_task(&self, task_id: TaskId) -> OwnedMutexGuard<()> {
        self.locks.acquire(task_id).await
    }

    pub(crate) async fn publish(&self, event: BoardEvent) {
        let report = self.broadcaster.broadcast(&event).await;
        debug!(
            event = event.type_tag(),
            delivered = report.delivered,
            evicted = report.evicted,
            "board event published"
        );
    }

    pub(crate) async fn require_task(&self, task_id: TaskId) -> BoardServiceResult<Task> {
        self.store
            .find_task(task_id)
            .await?
            .ok_or(BoardServiceError::TaskNotFound(task_id))
    }

    /// Stores a comment authored by the system identity and broadcasts it.
    ///
    /// System comments never trigger mention dispatch.
    pub(crate) async fn post_system_comment(
        &self,
        task_id: TaskId,
        content: String,
    ) -> BoardStoreResult<Comment> {
        let comment = self
            .store
            .insert_comment(NewComment {
                task_id,
                agent: self.roster.system_author().to_owned(),
                content,
                created_at: self.clock.utc(),
            })
            .await?;
        self.publish(BoardEvent::CommentAdded {
            task_id,
            comment: comment.clone(),
        })
        .await;
        Ok(comment)
    }

    /// Binds a freshly spawned session to a task that is still being worked.
    ///
    /// Returns `None` when the task was deleted or left the agent-active
    /// columns in the meantime.
    pub(crate) async fn bind_session(
        &self,
        task_id: TaskId,
        session_key: SessionKey,
    ) -> BoardServiceResult<Option<Task>> {
        let _guard = self.lock_task(task_id).await;
        let Some(mut task) = self.store.find_task(task_id).await? else {
            return Ok(None);
        };
        if !task.status().is_agent_active() {
            debug!(
                task_id = %task_id,
                status = %task.status(),
                "task left active columns, session not bound"
            );
            return Ok(None);
        }
        let expected = task.updated_at();
        task.bind_session(session_key, &*self.clock);
        let committed = self
            .store
            .commit_task(TaskCommit::new(task, expected))
            .await?;
        self.publish(BoardEvent::TaskUpdated {
            task: committed.task.clone(),
        })
        .await;
        Ok(Some(committed.task))
    }
}
