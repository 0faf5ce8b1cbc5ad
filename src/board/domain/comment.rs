//! Task comments.

use super::{CommentId, TaskId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// An immutable comment posted on a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Comment {
    /// Store-assigned identifier.
    pub id: CommentId,
    /// Task the comment belongs to.
    pub task_id: TaskId,
    /// Authoring agent name.
    pub agent: String,
    /// Comment body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A validated comment awaiting an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    /// Task the comment belongs to.
    pub task_id: TaskId,
    /// Authoring agent name.
    pub agent: String,
    /// Comment body.
    pub content: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewComment {
    /// Materialises the comment once the store has assigned an identifier.
    #[must_use]
    pub fn into_comment(self, id: CommentId) -> Comment {
        Comment {
            id,
            task_id: self.task_id,
            agent: self.agent,
            content: self.content,
            created_at: self.created_at,
        }
    }
}
