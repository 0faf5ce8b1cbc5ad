//! Agent dispatch triggered by board activity.
//!
//! Every method here schedules detached effects and returns at once. The
//! board mutation that triggered the dispatch has already committed; a
//! failed spawn or message only reaches the log and the effect failure log.

use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::agent::{
    domain::{
        AgentDomainError, MentionScanner, RosterAgent, SessionCleanup, SessionKey, SpawnRequest,
    },
    ports::SessionCoordinatorError,
    services::format_prior_comments,
};
use crate::board::{
    domain::{Comment, CommentId, Task, TaskId},
    ports::{BoardStore, BoardStoreError},
    services::{BoardRuntime, BoardServiceError},
};

/// Comment previews in external notifications are cut to this many
/// characters.
const NOTIFY_PREVIEW_CHARS: usize = 200;

/// Failure of a single dispatch effect.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// The orchestration system failed or refused.
    #[error(transparent)]
    Coordinator(#[from] SessionCoordinatorError),

    /// A board read or write failed.
    #[error(transparent)]
    Board(#[from] BoardServiceError),

    /// A prompt could not be rendered.
    #[error(transparent)]
    Prompt(#[from] AgentDomainError),

    /// The session did not accept the message.
    #[error("session {0} did not accept the message")]
    NotDelivered(SessionKey),
}

impl From<BoardStoreError> for DispatchError {
    fn from(err: BoardStoreError) -> Self {
        Self::Board(err.into())
    }
}

/// What a comment dispatch scheduled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommentDispatch {
    /// Agents a review session was requested for.
    pub mentioned: Vec<String>,
    /// Whether the comment is being forwarded to the assignee's session.
    pub forwarded: bool,
    /// Whether the coordinating agent is being notified.
    pub notified: bool,
}

/// Schedules agent sessions and messages in response to board changes.
pub struct AgentDispatcher<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    runtime: BoardRuntime<S, C>,
    scanner: Arc<MentionScanner>,
}

impl<S, C> Clone for AgentDispatcher<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            scanner: Arc::clone(&self.scanner),
        }
    }
}

impl<S, C> AgentDispatcher<S, C>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a dispatcher; the mention scanner is built from the runtime's
    /// roster once, here.
    #[must_use]
    pub fn new(runtime: BoardRuntime<S, C>) -> Self {
        let scanner = Arc::new(MentionScanner::new(runtime.roster()));
        Self { runtime, scanner }
    }

    /// Requests a work session for the task's assignee.
    ///
    /// Returns `false` without scheduling anything when the assignee is the
    /// supervisor, unassigned or not on the roster.
    pub fn dispatch_assignment(&self, task: &Task) -> bool {
        let Some(agent) = self.runtime.roster().spawnable(task.agent()).cloned() else {
            return false;
        };
        let runtime = self.runtime.clone();
        let task = task.clone();
        let label = format!("spawn {} for task {}", agent.name(), task.id());
        self.runtime.effects().spawn(label, async move {
            let prompt = runtime.prompts().assignment(&agent, &task)?;
            let request = SpawnRequest::new(
                agent.external_id().clone(),
                prompt,
                format!("task-{}", task.id()),
            );
            let spawned = runtime.coordinator().spawn_session(request).await?;
            info!(
                task_id = %task.id(),
                agent = agent.name(),
                session_key = ?spawned.session_key,
                "agent session spawned"
            );
            if let Some(session_key) = spawned.session_key.clone() {
                runtime.bind_session(task.id(), session_key).await?;
            }
            let announcement = format!(
                "🤖 **{}** agent spawned automatically.\n\nSession: `{}`\nRun ID: `{}`\n\n💬 *Reply to this task and the agent will respond.*",
                agent.name(),
                spawned
                    .session_key
                    .as_ref()
                    .map_or("unknown", SessionKey::as_str),
                spawned.run_id.as_deref().unwrap_or("unknown"),
            );
            runtime.post_system_comment(task.id(), announcement).await?;
            Ok::<(), DispatchError>(())
        });
        true
    }

    /// Tells the session that worked a task that the task is done.
    pub fn dispatch_completion(&self, task_id: TaskId, session_key: SessionKey) {
        let runtime = self.runtime.clone();
        self.runtime
            .effects()
            .spawn(format!("completion notice for task {task_id}"), async move {
                let message = format!(
                    "✅ **Task #{task_id} marked as Done by {}.**\n\nYour work is complete. This session will now end. Thank you!",
                    runtime.roster().supervisor(),
                );
                if runtime
                    .coordinator()
                    .send_to_session(&session_key, &message)
                    .await?
                {
                    info!(
                        task_id = %task_id,
                        session_key = %session_key,
                        "agent session released"
                    );
                    Ok(())
                } else {
                    Err(DispatchError::NotDelivered(session_key))
                }
            });
    }

    /// Reacts to a stored comment: review sessions for mentioned agents,
    /// forwarding of supervisor replies, and external notification.
    pub fn dispatch_comment(&self, task: &Task, comment: &Comment) -> CommentDispatch {
        let roster = self.runtime.roster();
        let author = comment.agent.as_str();
        let mut outcome = CommentDispatch::default();

        for name in self.scanner.scan(&comment.content) {
            if name.eq_ignore_ascii_case(author.trim()) {
                continue;
            }
            let Some(agent) = roster.lookup(&name).cloned() else {
                continue;
            };
            self.spawn_mention(agent, task.clone(), comment.clone());
            outcome.mentioned.push(name);
        }

        if roster.is_supervisor(author) && task.status().is_agent_active() {
            if let Some(agent) = roster.spawnable(task.agent()).cloned() {
                self.forward_reply(agent, task.id(), comment.clone());
                outcome.forwarded = true;
            }
        } else if !roster.is_known_identity(author) {
            self.notify_coordinator(task, comment);
            outcome.notified = true;
        }
        outcome
    }

    fn spawn_mention(&self, agent: RosterAgent, task: Task, comment: Comment) {
        let runtime = self.runtime.clone();
        let label = format!("mention {} on task {}", agent.name(), task.id());
        self.runtime.effects().spawn(label, async move {
            let context = prior_context(&runtime, task.id(), comment.id).await?;
            let prompt = runtime.prompts().mention(
                &agent,
                &task,
                &comment.agent,
                &comment.content,
                &context,
            )?;
            let request = SpawnRequest::new(
                agent.external_id().clone(),
                prompt,
                format!("task-{}-mention-{}", task.id(), agent.external_id()),
            )
            .with_cleanup(SessionCleanup::Delete);
            runtime.coordinator().spawn_session(request).await?;
            info!(
                task_id = %task.id(),
                agent = agent.name(),
                mentioner = %comment.agent,
                "mentioned agent spawned"
            );
            runtime
                .post_system_comment(
                    task.id(),
                    format!(
                        "📢 **{}** was tagged by {} and is now reviewing this task.",
                        agent.name(),
                        comment.agent
                    ),
                )
                .await?;
            Ok::<(), DispatchError>(())
        });
    }

    /// Delivers a supervisor reply to the bound session, or spawns a
    /// follow-up session when nothing is bound or delivery fails.
    ///
    /// Any delivery failure is treated as a finished session, including
    /// transient transport errors.
    fn forward_reply(&self, agent: RosterAgent, task_id: TaskId, comment: Comment) {
        let runtime = self.runtime.clone();
        let label = format!("forward reply to {} on task {task_id}", agent.name());
        self.runtime.effects().spawn(label, async move {
            let task = runtime.require_task(task_id).await?;
            if let Some(session_key) = task.agent_session_key() {
                let message = format!(
                    "💬 **{} replied on Task #{task_id}:**\n\n{}\n\n---\nRespond by posting a comment to the task.",
                    comment.agent, comment.content
                );
                match runtime
                    .coordinator()
                    .send_to_session(session_key, &message)
                    .await
                {
                    Ok(true) => return Ok(()),
                    Ok(false) => {
                        warn!(
                            task_id = %task_id,
                            session_key = %session_key,
                            "session refused reply, spawning follow-up"
                        );
                    }
                    Err(err) => {
                        warn!(
                            task_id = %task_id,
                            session_key = %session_key,
                            error = %err,
                            "reply delivery failed, spawning follow-up"
                        );
                    }
                }
            }

            let context = prior_context(&runtime, task_id, comment.id).await?;
            let prompt = runtime
                .prompts()
                .followup(&agent, &task, &context, &comment.content)?;
            let request = SpawnRequest::new(
                agent.external_id().clone(),
                prompt,
                format!("task-{task_id}-followup"),
            );
            let spawned = runtime.coordinator().spawn_session(request).await?;
            info!(task_id = %task_id, agent = agent.name(), "follow-up session spawned");
            if let Some(session_key) = spawned.session_key {
                runtime.bind_session(task_id, session_key).await?;
            }
            Ok::<(), DispatchError>(())
        });
    }

    fn notify_coordinator(&self, task: &Task, comment: &Comment) {
        let runtime = self.runtime.clone();
        let preview: String = comment.content.chars().take(NOTIFY_PREVIEW_CHARS).collect();
        let ellipsis = if comment.content.chars().count() > NOTIFY_PREVIEW_CHARS {
            "..."
        } else {
            ""
        };
        let text = format!(
            "💬 Task Board: New comment on #{} ({}) from {}:\n\n{preview}{ellipsis}\n\nCheck and respond: {}",
            task.id(),
            task.title(),
            comment.agent,
            self.runtime.prompts().context().board_url,
        );
        let label = format!("notify comment on task {}", task.id());
        self.runtime.effects().spawn(label, async move {
            runtime.coordinator().notify(&text).await
        });
    }
}

async fn prior_context<S, C>(
    runtime: &BoardRuntime<S, C>,
    task_id: TaskId,
    current: CommentId,
) -> Result<String, DispatchError>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    let limits = runtime.limits();
    let comments = runtime
        .store()
        .recent_comments(task_id, limits.context_window, Some(current))
        .await?;
    Ok(format_prior_comments(&comments, limits.context_truncate_chars))
}
