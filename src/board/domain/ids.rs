//! Identifier types for board records.
//!
//! All board records are keyed by store-assigned integers. Each record kind
//! gets its own newtype so a comment identifier can never be passed where a
//! task identifier is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a store-assigned identifier value.
            #[must_use]
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            /// Returns the underlying identifier value.
            #[must_use]
            pub const fn value(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id! {
    /// Identifier of a task card.
    ///
    /// # Examples
    ///
    /// ```
    /// use taskboard::board::domain::TaskId;
    ///
    /// let id = TaskId::new(7);
    /// assert_eq!(id.value(), 7);
    /// assert_eq!(id.to_string(), "7");
    /// ```
    TaskId
}

record_id! {
    /// Identifier of a comment posted on a task.
    CommentId
}

record_id! {
    /// Identifier of an action item attached to a task.
    ActionItemId
}

record_id! {
    /// Identifier of an activity log entry.
    ActivityId
}

record_id! {
    /// Identifier of a persisted command-bar chat message.
    ChatMessageId
}
