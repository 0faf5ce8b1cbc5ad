//! Repository ports for task-attached records.

use async_trait::async_trait;

use super::BoardStoreResult;
use crate::board::domain::{
    ActionItem, ActionItemFilter, ActionItemId, ActivityEntry, Comment, CommentId, NewActionItem,
    NewActivityEntry, NewComment, TaskId,
};

/// Comment persistence contract.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Stores a comment and assigns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardStoreError::TaskNotFound`] when the task does not
    /// exist.
    async fn insert_comment(&self, comment: NewComment) -> BoardStoreResult<Comment>;

    /// Lists a task's comments, oldest first.
    async fn list_comments(&self, task_id: TaskId) -> BoardStoreResult<Vec<Comment>>;

    /// Returns up to `limit` of a task's most recent comments, oldest first,
    /// optionally leaving one comment out.
    async fn recent_comments(
        &self,
        task_id: TaskId,
        limit: usize,
        excluding: Option<CommentId>,
    ) -> BoardStoreResult<Vec<Comment>>;
}

/// Action item persistence contract.
#[async_trait]
pub trait ActionItemRepository: Send + Sync {
    /// Stores an action item and assigns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardStoreError::TaskNotFound`] when the task does not
    /// exist.
    async fn insert_action_item(&self, item: NewActionItem) -> BoardStoreResult<ActionItem>;

    /// Finds an action item by identifier.
    async fn find_action_item(&self, id: ActionItemId) -> BoardStoreResult<Option<ActionItem>>;

    /// Persists the flags and timestamps of an existing action item.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardStoreError::ActionItemNotFound`] when the item
    /// does not exist.
    async fn save_action_item(&self, item: &ActionItem) -> BoardStoreResult<()>;

    /// Deletes an action item and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardStoreError::ActionItemNotFound`] when the item
    /// does not exist.
    async fn delete_action_item(&self, id: ActionItemId) -> BoardStoreResult<ActionItem>;

    /// Lists a task's action items visible under `filter`, oldest first.
    async fn list_action_items(
        &self,
        task_id: TaskId,
        filter: ActionItemFilter,
    ) -> BoardStoreResult<Vec<ActionItem>>;
}

/// Activity log persistence contract. Entries are never updated or deleted.
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Appends an entry and assigns its identifier.
    async fn append_activity(&self, entry: NewActivityEntry) -> BoardStoreResult<ActivityEntry>;

    /// Returns up to `limit` entries across all tasks, newest first.
    async fn recent_activity(&self, limit: usize) -> BoardStoreResult<Vec<ActivityEntry>>;

    /// Returns every entry for one task, oldest first.
    async fn task_activity(&self, task_id: TaskId) -> BoardStoreResult<Vec<ActivityEntry>>;
}
