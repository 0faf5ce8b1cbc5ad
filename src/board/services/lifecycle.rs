//! Task Lifecycle Engine.
//!
//! Owns every write to a task's status, working agent and session binding.
//! Each mutation runs under the task's lock: the store commit (task row,
//! activity entry, auto-created action item) lands first, then the events
//! are broadcast, then agent dispatch is scheduled as detached effects.

use chrono::NaiveDate;
use mockable::Clock;

use super::{ActivityRecorder, BoardRuntime, BoardServiceError, BoardServiceResult};
use crate::agent::{domain::UNASSIGNED, services::AgentDispatcher};
use crate::board::{
    domain::{
        ActionItem, ActionItemType, ActivityAction, BoardDomainError, DEFAULT_BOARD,
        NewActionItem, NewTask, Task, TaskChanges, TaskId, TaskPriority, TaskStatus,
        summarize_changes,
    },
    ports::{BoardStore, TaskCommit, TaskFilter},
};
use crate::live::domain::BoardEvent;

/// Request payload for creating a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateTaskRequest {
    title: String,
    description: String,
    status: TaskStatus,
    priority: TaskPriority,
    agent: Option<String>,
    due_date: Option<NaiveDate>,
    board: Option<String>,
    source_file: Option<String>,
    source_ref: Option<String>,
}

impl CreateTaskRequest {
    /// Creates a backlog request with medium priority.
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: String::new(),
            status: TaskStatus::Backlog,
            priority: TaskPriority::Medium,
            agent: None,
            due_date: None,
            board: None,
            source_file: None,
            source_ref: None,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the initial column.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    /// Sets the priority.
    #[must_use]
    pub const fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Assigns the task.
    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Sets the due date.
    #[must_use]
    pub const fn with_due_date(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }

    /// Places the task on a named board.
    #[must_use]
    pub fn with_board(mut self, board: impl Into<String>) -> Self {
        self.board = Some(board.into());
        self
    }

    /// Records where the task was imported from.
    #[must_use]
    pub fn with_source(
        mut self,
        source_file: Option<String>,
        source_ref: Option<String>,
    ) -> Self {
        self.source_file = source_file;
        self.source_ref = source_ref;
        self
    }
}

/// Request payload for moving a task between columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveTaskRequest {
    status: TaskStatus,
    agent: Option<String>,
    reason: Option<String>,
}

impl MoveTaskRequest {
    /// Creates a move to `status` with no acting agent.
    #[must_use]
    pub const fn new(status: TaskStatus) -> Self {
        Self {
            status,
            agent: None,
            reason: None,
        }
    }

    /// Sets the acting agent.
    #[must_use]
    pub fn by(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Sets the reason recorded on auto-created action items.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Observable outcome of a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// The task after the move.
    pub task: Task,
    /// Column the task left.
    pub previous_status: TaskStatus,
    /// Action item created by the transition, if any.
    pub action_item: Option<ActionItem>,
    /// Whether a work session was requested for the assignee.
    pub agent_spawned: bool,
    /// Whether a bound session was released.
    pub session_cleared: bool,
}

impl MoveOutcome {
    /// Returns `true` when the transition created an action item.
    #[must_use]
    pub const fn action_item_created(&self) -> bool {
        self.action_item.is_some()
    }
}

/// Task lifecycle orchestration service.
pub struct TaskLifecycleService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    runtime: BoardRuntime<S, C>,
    activity: ActivityRecorder<S, C>,
    dispatcher: AgentDispatcher<S, C>,
}

impl<S, C> Clone for TaskLifecycleService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            activity: self.activity.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<S, C> TaskLifecycleService<S, C>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a lifecycle service.
    #[must_use]
    pub fn new(runtime: BoardRuntime<S, C>) -> Self {
        Self {
            activity: ActivityRecorder::new(runtime.clone()),
            dispatcher: AgentDispatcher::new(runtime.clone()),
            runtime,
        }
    }

    /// Creates a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`] for an empty title or an
    /// assignee outside the roster, or [`BoardServiceError::Store`] when
    /// persistence fails.
    pub async fn create(&self, request: CreateTaskRequest) -> BoardServiceResult<Task> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(BoardDomainError::EmptyTitle.into());
        }
        let agent = self.assignee(request.agent.as_deref())?;
        let task = self
            .runtime
            .store()
            .insert_task(NewTask {
                title: title.to_owned(),
                description: request.description,
                status: request.status,
                priority: request.priority,
                agent,
                due_date: request.due_date,
                board: request.board.unwrap_or_else(|| DEFAULT_BOARD.to_owned()),
                source_file: request.source_file,
                source_ref: request.source_ref,
                created_at: self.runtime.clock().utc(),
            })
            .await?;
        self.activity
            .record(
                task.id(),
                ActivityAction::Created,
                Some(task.agent()),
                format!("Created: {}", task.title()),
            )
            .await?;
        self.runtime
            .publish(BoardEvent::TaskCreated { task: task.clone() })
            .await;
        Ok(task)
    }

    /// Fetches a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`] when absent.
    pub async fn get(&self, task_id: TaskId) -> BoardServiceResult<Task> {
        self.runtime.require_task(task_id).await
    }

    /// Lists a board's tasks by priority, newest first within a priority.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Store`] when the read fails.
    pub async fn list(&self, filter: &TaskFilter) -> BoardServiceResult<Vec<Task>> {
        Ok(self.runtime.store().list_tasks(filter).await?)
    }

    /// Lists an agent's open work queue, oldest first within a priority.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Store`] when the read fails.
    pub async fn agent_tasks(&self, agent: &str) -> BoardServiceResult<Vec<Task>> {
        Ok(self.runtime.store().list_open_tasks_for_agent(agent).await?)
    }

    /// Applies a partial update.
    ///
    /// Only fields that differ are written and summarised in the activity
    /// log. An update that changes nothing writes nothing, logs nothing and
    /// broadcasts nothing. Status changes here never create action items
    /// or spawn sessions; those belong to [`Self::move_task`].
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`],
    /// [`BoardServiceError::PermissionDenied`] for a non-supervisor moving
    /// the task to Done, [`BoardServiceError::Validation`] or
    /// [`BoardServiceError::Store`].
    pub async fn update(
        &self,
        task_id: TaskId,
        mut changes: TaskChanges,
        acting_agent: Option<&str>,
    ) -> BoardServiceResult<Task> {
        if let Some(title) = changes.title.as_mut() {
            *title = title.trim().to_owned();
            if title.is_empty() {
                return Err(BoardDomainError::EmptyTitle.into());
            }
        }
        if let Some(agent) = changes.agent.take() {
            changes.agent = Some(self.assignee(Some(&agent))?);
        }

        let _guard = self.runtime.lock_task(task_id).await;
        let mut task = self.runtime.require_task(task_id).await?;
        if changes.status == Some(TaskStatus::Done) && task.status() != TaskStatus::Done {
            self.authorize_done(acting_agent)?;
        }

        let previous_owner = task.agent().to_owned();
        let expected = task.updated_at();
        let applied = task.apply_changes(&changes, &**self.runtime.clock());
        if applied.is_empty() {
            return Ok(task);
        }
        if task.status() == TaskStatus::Done {
            task.release_agent();
        }

        let entry = self.activity.entry(
            task_id,
            ActivityAction::Updated,
            Some(acting_agent.unwrap_or(&previous_owner)),
            summarize_changes(&applied),
        );
        let committed = self
            .runtime
            .store()
            .commit_task(TaskCommit::new(task, expected).with_activity(entry))
            .await?;
        self.runtime
            .publish(BoardEvent::TaskUpdated {
                task: committed.task.clone(),
            })
            .await;
        Ok(committed.task)
    }

    /// Deletes a task together with its comments and action items.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`] or
    /// [`BoardServiceError::Store`].
    pub async fn delete(&self, task_id: TaskId) -> BoardServiceResult<Task> {
        let _guard = self.runtime.lock_task(task_id).await;
        let task = self.runtime.store().delete_task(task_id).await?;
        self.activity
            .record(
                task_id,
                ActivityAction::Deleted,
                None,
                format!("Deleted: {}", task.title()),
            )
            .await?;
        self.runtime
            .publish(BoardEvent::TaskDeleted { task_id })
            .await;
        Ok(task)
    }

    /// Moves a task to another column.
    ///
    /// Entering Review or Blocked from a different column creates one
    /// unresolved completion or blocker item. Entering In Progress from a
    /// different column requests a work session for the assignee. Every
    /// move to Done clears the working agent and session binding, and a
    /// bound session is told the work is complete.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`] before any permission
    /// check, [`BoardServiceError::PermissionDenied`] when anyone but the
    /// supervisor moves the task to Done, or [`BoardServiceError::Store`].
    /// A task changed by another writer after it was read fails with
    /// [`crate::board::ports::BoardStoreError::Conflict`] and nothing is
    /// written.
    pub async fn move_task(
        &self,
        task_id: TaskId,
        request: MoveTaskRequest,
    ) -> BoardServiceResult<MoveOutcome> {
        let acting_agent = request
            .agent
            .as_deref()
            .map(str::trim)
            .filter(|agent| !agent.is_empty());
        let reason = request
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty());
        let status = request.status;

        // The commit is conditional on the version read here, so a move that
        // loses a race fails with a conflict instead of stacking on the winner.
        let mut task = self.runtime.require_task(task_id).await?;
        if status == TaskStatus::Done {
            self.authorize_done(acting_agent)?;
        }
        let expected = task.updated_at();
        let _guard = self.runtime.lock_task(task_id).await;
        let previous_status = task.move_to(status, &**self.runtime.clock());
        let released = if status == TaskStatus::Done {
            task.release_agent()
        } else {
            None
        };

        let action_item = transition_item(&task, previous_status, reason)
            .map(|(item_type, content)| NewActionItem {
                task_id,
                comment_id: None,
                agent: acting_agent.unwrap_or(task.agent()).to_owned(),
                content,
                item_type,
                created_at: self.runtime.clock().utc(),
            });
        let entry = self.activity.entry(
            task_id,
            ActivityAction::Moved,
            acting_agent,
            format!("Moved to {status}"),
        );
        let mut commit = TaskCommit::new(task, expected).with_activity(entry);
        if let Some(item) = action_item {
            commit = commit.with_action_item(item);
        }
        let committed = self.runtime.store().commit_task(commit).await?;

        self.runtime
            .publish(BoardEvent::TaskUpdated {
                task: committed.task.clone(),
            })
            .await;
        if let Some(item) = committed.action_item.clone() {
            self.runtime
                .publish(BoardEvent::ActionItemAdded { task_id, item })
                .await;
        }
        if status == TaskStatus::Done {
            self.runtime
                .publish(BoardEvent::WorkStopped { task_id })
                .await;
        }

        let agent_spawned = status == TaskStatus::InProgress
            && previous_status != TaskStatus::InProgress
            && self.dispatcher.dispatch_assignment(&committed.task);
        let session_cleared = released.is_some();
        if let Some(session_key) = released {
            self.dispatcher.dispatch_completion(task_id, session_key);
        }

        Ok(MoveOutcome {
            task: committed.task,
            previous_status,
            action_item: committed.action_item,
            agent_spawned,
            session_cleared,
        })
    }

    /// Marks an agent as actively working on a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`],
    /// [`BoardServiceError::Validation`] for an invalid agent name, or
    /// [`BoardServiceError::Store`].
    pub async fn start_work(&self, task_id: TaskId, agent: &str) -> BoardServiceResult<Task> {
        let agent = self.runtime.limits().validate_author(agent)?.to_owned();
        let _guard = self.runtime.lock_task(task_id).await;
        let mut task = self.runtime.require_task(task_id).await?;
        let expected = task.updated_at();
        task.start_work(agent.clone(), &**self.runtime.clock());
        let committed = self
            .runtime
            .store()
            .commit_task(TaskCommit::new(task, expected))
            .await?;
        self.runtime
            .publish(BoardEvent::WorkStarted { task_id, agent })
            .await;
        Ok(committed.task)
    }

    /// Clears the working indicator. Stopping an idle task succeeds without
    /// writing or broadcasting.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::TaskNotFound`] or
    /// [`BoardServiceError::Store`].
    pub async fn stop_work(&self, task_id: TaskId) -> BoardServiceResult<Task> {
        let _guard = self.runtime.lock_task(task_id).await;
        let mut task = self.runtime.require_task(task_id).await?;
        let expected = task.updated_at();
        if !task.stop_work(&**self.runtime.clock()) {
            return Ok(task);
        }
        let committed = self
            .runtime
            .store()
            .commit_task(TaskCommit::new(task, expected))
            .await?;
        self.runtime
            .publish(BoardEvent::WorkStopped { task_id })
            .await;
        Ok(committed.task)
    }

    fn assignee(&self, agent: Option<&str>) -> BoardServiceResult<String> {
        let roster = self.runtime.roster();
        let Some(name) = agent.map(str::trim).filter(|name| !name.is_empty()) else {
            return Ok(UNASSIGNED.to_owned());
        };
        roster
            .canonical_assignee(name)
            .map(str::to_owned)
            .ok_or_else(|| BoardDomainError::UnknownAgent(name.to_owned()).into())
    }

    fn authorize_done(&self, acting_agent: Option<&str>) -> BoardServiceResult<()> {
        let roster = self.runtime.roster();
        if acting_agent.is_some_and(|agent| roster.is_supervisor(agent)) {
            return Ok(());
        }
        Err(BoardServiceError::PermissionDenied {
            agent: acting_agent.unwrap_or_default().to_owned(),
            supervisor: roster.supervisor().to_owned(),
        })
    }
}

/// Action item created when a task enters Review or Blocked from another
/// column.
fn transition_item(
    task: &Task,
    previous: TaskStatus,
    reason: Option<&str>,
) -> Option<(ActionItemType, String)> {
    let status = task.status();
    if status == previous {
        return None;
    }
    match status {
        TaskStatus::Review => Some((
            ActionItemType::Completion,
            reason.map_or_else(
                || format!("Ready for review: {}", task.title()),
                str::to_owned,
            ),
        )),
        TaskStatus::Blocked => Some((
            ActionItemType::Blocker,
            reason.map_or_else(
                || format!("Blocked: {} - reason not specified", task.title()),
                str::to_owned,
            ),
        )),
        _ => None,
    }
}
