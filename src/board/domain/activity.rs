//! Append-only audit trail of task changes.

use super::{ActivityId, ParseActivityActionError, TaskId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of task change recorded in the activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityAction {
    /// Task was created.
    Created,
    /// Task fields were edited.
    Updated,
    /// Task changed column.
    Moved,
    /// Task was deleted.
    Deleted,
}

impl ActivityAction {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Updated => "updated",
            Self::Moved => "moved",
            Self::Deleted => "deleted",
        }
    }
}

impl fmt::Display for ActivityAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ActivityAction {
    type Error = ParseActivityActionError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "created" => Ok(Self::Created),
            "updated" => Ok(Self::Updated),
            "moved" => Ok(Self::Moved),
            "deleted" => Ok(Self::Deleted),
            other => Err(ParseActivityActionError(other.to_owned())),
        }
    }
}

/// A write-once activity log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    /// Store-assigned identifier.
    pub id: ActivityId,
    /// Task the entry refers to. The task may since have been deleted.
    pub task_id: TaskId,
    /// Kind of change.
    pub action: ActivityAction,
    /// Acting agent, if known.
    pub agent: Option<String>,
    /// Human-readable detail.
    pub details: String,
    /// Time of the change.
    pub timestamp: DateTime<Utc>,
}

/// An activity entry awaiting an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewActivityEntry {
    /// Task the entry refers to.
    pub task_id: TaskId,
    /// Kind of change.
    pub action: ActivityAction,
    /// Acting agent, if known.
    pub agent: Option<String>,
    /// Human-readable detail.
    pub details: String,
    /// Time of the change.
    pub timestamp: DateTime<Utc>,
}

impl NewActivityEntry {
    /// Materialises the entry once the store has assigned an identifier.
    #[must_use]
    pub fn into_entry(self, id: ActivityId) -> ActivityEntry {
        ActivityEntry {
            id,
            task_id: self.task_id,
            action: self.action,
            agent: self.agent,
            details: self.details,
            timestamp: self.timestamp,
        }
    }
}
