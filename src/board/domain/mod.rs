//! Domain model for the task board.
//!
//! Tasks, comments, action items, the activity log and command-bar chat
//! history. Everything here is free of infrastructure concerns; mutation of
//! task status and agent bindings is reserved for the board services.

mod action_item;
mod activity;
mod chat;
mod comment;
mod error;
mod ids;
mod limits;
mod task;

pub use action_item::{ActionItem, ActionItemFilter, ActionItemType, NewActionItem};
pub use activity::{ActivityAction, ActivityEntry, NewActivityEntry};
pub use chat::{ChatAttachment, ChatMessage, ChatRole, NewChatMessage};
pub use comment::{Comment, NewComment};
pub use error::{
    BoardDomainError, ParseActionItemTypeError, ParseActivityActionError, ParseChatRoleError,
    ParseTaskPriorityError, ParseTaskStatusError,
};
pub use ids::{ActionItemId, ActivityId, ChatMessageId, CommentId, TaskId};
pub use limits::ContentLimits;
pub use task::{
    FieldChange, NewTask, PersistedTaskData, Task, TaskChanges, TaskPriority, TaskStatus,
    parse_due_date, summarize_changes,
};

/// Default board grouping key.
pub const DEFAULT_BOARD: &str = "tasks";

/// Default chat session name.
pub const DEFAULT_CHAT_SESSION: &str = "main";
