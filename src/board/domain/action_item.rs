//! Action items: questions, completion notices and blockers raised on tasks.

use super::{ActionItemId, CommentId, ParseActionItemTypeError, TaskId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of action item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionItemType {
    /// An agent needs an answer from the supervisor.
    Question,
    /// Work is ready for review.
    Completion,
    /// Work cannot proceed.
    Blocker,
}

impl ActionItemType {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Completion => "completion",
            Self::Blocker => "blocker",
        }
    }
}

impl fmt::Display for ActionItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ActionItemType {
    type Error = ParseActionItemTypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "question" => Ok(Self::Question),
            "completion" => Ok(Self::Completion),
            "blocker" => Ok(Self::Blocker),
            _ => Err(ParseActionItemTypeError(value.to_owned())),
        }
    }
}

/// An action item attached to a task.
///
/// Resolution and archiving are independent flags; every combination is
/// reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionItem {
    /// Store-assigned identifier.
    pub id: ActionItemId,
    /// Owning task.
    pub task_id: TaskId,
    /// Comment that raised the item, if any.
    pub comment_id: Option<CommentId>,
    /// Authoring agent name.
    pub agent: String,
    /// Item text.
    pub content: String,
    /// Item kind.
    pub item_type: ActionItemType,
    /// Whether the item has been resolved.
    pub resolved: bool,
    /// Whether the item is hidden from the default view.
    pub archived: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Resolution timestamp, set by [`ActionItem::resolve`].
    pub resolved_at: Option<DateTime<Utc>>,
}

impl ActionItem {
    /// Marks the item resolved at the current clock time.
    pub fn resolve(&mut self, clock: &impl Clock) {
        self.resolved = true;
        self.resolved_at = Some(clock.utc());
    }

    /// Hides the item from the default view.
    pub const fn archive(&mut self) {
        self.archived = true;
    }

    /// Restores the item to the default view.
    pub const fn unarchive(&mut self) {
        self.archived = false;
    }
}

/// A validated action item awaiting an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActionItem {
    /// Owning task.
    pub task_id: TaskId,
    /// Comment that raised the item, if any.
    pub comment_id: Option<CommentId>,
    /// Authoring agent name.
    pub agent: String,
    /// Item text.
    pub content: String,
    /// Item kind.
    pub item_type: ActionItemType,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewActionItem {
    /// Materialises the item once the store has assigned an identifier.
    #[must_use]
    pub fn into_action_item(self, id: ActionItemId) -> ActionItem {
        ActionItem {
            id,
            task_id: self.task_id,
            comment_id: self.comment_id,
            agent: self.agent,
            content: self.content,
            item_type: self.item_type,
            resolved: false,
            archived: false,
            created_at: self.created_at,
            resolved_at: None,
        }
    }
}

/// Visibility filter for listing a task's action items.
///
/// Requesting archived items returns only archived items and ignores the
/// resolved flag. Otherwise only unarchived items whose resolved flag
/// matches are returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionItemFilter {
    /// Resolved flag to match among unarchived items.
    pub resolved: bool,
    /// Return archived items instead.
    pub archived: bool,
}

impl ActionItemFilter {
    /// Returns `true` when the item is visible under this filter.
    #[must_use]
    pub const fn matches(self, item: &ActionItem) -> bool {
        if self.archived {
            item.archived
        } else {
            !item.archived && item.resolved == self.resolved
        }
    }
}
