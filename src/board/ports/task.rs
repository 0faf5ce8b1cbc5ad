//! Repository port for tasks and the atomic task commit.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::BoardStoreResult;
use crate::board::domain::{
    ActionItem, NewActionItem, NewActivityEntry, NewTask, Task, TaskId, TaskStatus,
};

/// Listing filter for tasks on one board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskFilter {
    board: String,
    agent: Option<String>,
    status: Option<TaskStatus>,
}

impl TaskFilter {
    /// Creates a filter matching every task on `board`.
    #[must_use]
    pub fn new(board: impl Into<String>) -> Self {
        Self {
            board: board.into(),
            agent: None,
            status: None,
        }
    }

    /// Restricts the listing to one owning agent.
    #[must_use]
    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    /// Restricts the listing to one column.
    #[must_use]
    pub const fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns the board grouping key.
    #[must_use]
    pub fn board(&self) -> &str {
        &self.board
    }

    /// Returns the agent restriction, if any.
    #[must_use]
    pub fn agent(&self) -> Option<&str> {
        self.agent.as_deref()
    }

    /// Returns the status restriction, if any.
    #[must_use]
    pub const fn status(&self) -> Option<TaskStatus> {
        self.status
    }

    /// Returns `true` when the task passes the filter.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        task.board() == self.board
            && self.agent.as_deref().is_none_or(|agent| task.agent() == agent)
            && self.status.is_none_or(|status| task.status() == status)
    }
}

/// Ordering contracts for task listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskOrder {
    /// Most urgent first, then newest first.
    Board,
    /// Most urgent first, then oldest first.
    AgentQueue,
}

impl TaskOrder {
    /// Sorts tasks in place. Ties fall back to the identifier.
    pub fn sort(self, tasks: &mut [Task]) {
        tasks.sort_by(|left, right| {
            let by_created = match self {
                Self::Board => right.created_at().cmp(&left.created_at()),
                Self::AgentQueue => left.created_at().cmp(&right.created_at()),
            };
            left.priority()
                .rank()
                .cmp(&right.priority().rank())
                .then(by_created)
                .then(left.id().cmp(&right.id()))
        });
    }
}

/// A task write applied atomically together with its audit entry and an
/// optional auto-created action item.
///
/// The write is conditional: it is refused with
/// [`super::BoardStoreError::Conflict`] when the stored task's update
/// timestamp no longer equals `expected_updated_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCommit {
    /// The task state to store.
    pub task: Task,
    /// Update timestamp the task had when it was read.
    pub expected_updated_at: DateTime<Utc>,
    /// Activity entry appended in the same transaction.
    pub activity: Option<NewActivityEntry>,
    /// Action item created in the same transaction.
    pub action_item: Option<NewActionItem>,
}

impl TaskCommit {
    /// Creates a commit of `task` read at `expected_updated_at`.
    #[must_use]
    pub const fn new(task: Task, expected_updated_at: DateTime<Utc>) -> Self {
        Self {
            task,
            expected_updated_at,
            activity: None,
            action_item: None,
        }
    }

    /// Appends an activity entry with the write.
    #[must_use]
    pub fn with_activity(mut self, activity: NewActivityEntry) -> Self {
        self.activity = Some(activity);
        self
    }

    /// Creates an action item with the write.
    #[must_use]
    pub fn with_action_item(mut self, action_item: NewActionItem) -> Self {
        self.action_item = Some(action_item);
        self
    }
}

/// The stored result of a [`TaskCommit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedTask {
    /// The task as stored.
    pub task: Task,
    /// The action item created by the commit, if any.
    pub action_item: Option<ActionItem>,
}

/// Task persistence contract.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Stores a new task and assigns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardStoreError::Persistence`] when the write fails.
    async fn insert_task(&self, task: NewTask) -> BoardStoreResult<Task>;

    /// Finds a task by identifier.
    ///
    /// Returns `None` when the task does not exist.
    async fn find_task(&self, id: TaskId) -> BoardStoreResult<Option<Task>>;

    /// Lists tasks matching the filter, most urgent first, then newest first.
    async fn list_tasks(&self, filter: &TaskFilter) -> BoardStoreResult<Vec<Task>>;

    /// Lists an agent's tasks that are neither done nor blocked, most urgent
    /// first, then oldest first.
    async fn list_open_tasks_for_agent(&self, agent: &str) -> BoardStoreResult<Vec<Task>>;

    /// Applies a conditional task write with its side records atomically.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardStoreError::TaskNotFound`] when the task does not
    /// exist and [`super::BoardStoreError::Conflict`] when it changed since
    /// it was read.
    async fn commit_task(&self, commit: TaskCommit) -> BoardStoreResult<CommittedTask>;

    /// Deletes a task together with its comments and action items and
    /// returns it. Activity entries are kept.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardStoreError::TaskNotFound`] when the task does not
    /// exist.
    async fn delete_task(&self, id: TaskId) -> BoardStoreResult<Task>;
}
