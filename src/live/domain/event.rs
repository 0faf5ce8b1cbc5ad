//! Events pushed to live viewers.

use serde::Serialize;

use crate::board::domain::{ActionItem, ActionItemId, ChatMessage, Comment, Task, TaskId};

/// A state change pushed to every connected viewer.
///
/// Serialised as a JSON object whose `type` field discriminates the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BoardEvent {
    /// A task was created.
    TaskCreated {
        /// The new task.
        task: Task,
    },
    /// A task changed.
    TaskUpdated {
        /// The task after the change.
        task: Task,
    },
    /// A task was deleted.
    TaskDeleted {
        /// Identifier of the deleted task.
        task_id: TaskId,
    },
    /// An agent started working on a task.
    WorkStarted {
        /// Task being worked on.
        task_id: TaskId,
        /// Working agent.
        agent: String,
    },
    /// The working indicator was cleared.
    WorkStopped {
        /// Task no longer being worked on.
        task_id: TaskId,
    },
    /// A comment was posted.
    CommentAdded {
        /// Commented task.
        task_id: TaskId,
        /// The new comment.
        comment: Comment,
    },
    /// An action item was created.
    ActionItemAdded {
        /// Owning task.
        task_id: TaskId,
        /// The new item.
        item: ActionItem,
    },
    /// An action item was resolved.
    ActionItemResolved {
        /// Owning task.
        task_id: TaskId,
        /// Resolved item.
        item_id: ActionItemId,
    },
    /// An action item was archived.
    ActionItemArchived {
        /// Owning task.
        task_id: TaskId,
        /// Archived item.
        item_id: ActionItemId,
    },
    /// An action item was restored from the archive.
    ActionItemUnarchived {
        /// Owning task.
        task_id: TaskId,
        /// Restored item.
        item_id: ActionItemId,
    },
    /// An action item was deleted.
    ActionItemDeleted {
        /// Owning task.
        task_id: TaskId,
        /// Deleted item.
        item_id: ActionItemId,
    },
    /// A command-bar chat message was stored.
    CommandBarMessage {
        /// The stored message.
        message: ChatMessage,
    },
    /// An agent session was deleted.
    SessionDeleted {
        /// Key of the deleted session.
        session_key: String,
    },
}

impl BoardEvent {
    /// Returns the wire type tag.
    #[must_use]
    pub const fn type_tag(&self) -> &'static str {
        match self {
            Self::TaskCreated { .. } => "task_created",
            Self::TaskUpdated { .. } => "task_updated",
            Self::TaskDeleted { .. } => "task_deleted",
            Self::WorkStarted { .. } => "work_started",
            Self::WorkStopped { .. } => "work_stopped",
            Self::CommentAdded { .. } => "comment_added",
            Self::ActionItemAdded { .. } => "action_item_added",
            Self::ActionItemResolved { .. } => "action_item_resolved",
            Self::ActionItemArchived { .. } => "action_item_archived",
            Self::ActionItemUnarchived { .. } => "action_item_unarchived",
            Self::ActionItemDeleted { .. } => "action_item_deleted",
            Self::CommandBarMessage { .. } => "command_bar_message",
            Self::SessionDeleted { .. } => "session_deleted",
        }
    }
}
