//! Action item management.

use mockable::Clock;

use super::{BoardRuntime, BoardServiceError, BoardServiceResult};
use crate::board::{
    domain::{
        ActionItem, ActionItemFilter, ActionItemId, ActionItemType, CommentId, NewActionItem,
        TaskId,
    },
    ports::BoardStore,
};
use crate::live::domain::BoardEvent;

/// Request payload for creating an action item by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateActionItemRequest {
    /// Author of the item.
    pub agent: String,
    /// Question, notice or blocker text.
    pub content: String,
    /// Item kind.
    pub item_type: ActionItemType,
    /// Comment that prompted the item.
    pub comment_id: Option<CommentId>,
}

/// Creates, lists and changes the state of action items.
pub struct ActionItemService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    runtime: BoardRuntime<S, C>,
}

impl<S, C> Clone for ActionItemService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
        }
    }
}

impl<S, C> ActionItemService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    /// Creates an action item service.
    #[must_use]
    pub const fn new(runtime: BoardRuntime<S, C>) -> Self {
        Self { runtime }
    }

    /// Attaches a new unresolved item to a task.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Validation`],
    /// [`BoardServiceError::TaskNotFound`] or [`BoardServiceError::Store`].
    pub async fn create(
        &self,
        task_id: TaskId,
        request: CreateActionItemRequest,
    ) -> BoardServiceResult<ActionItem> {
        let limits = self.runtime.limits();
        let agent = limits.validate_author(&request.agent)?.to_owned();
        limits.validate_content(&request.content)?;
        let item = self
            .runtime
            .store()
            .insert_action_item(NewActionItem {
                task_id,
                comment_id: request.comment_id,
                agent,
                content: request.content,
                item_type: request.item_type,
                created_at: self.runtime.clock().utc(),
            })
            .await?;
        self.runtime
            .publish(BoardEvent::ActionItemAdded {
                task_id,
                item: item.clone(),
            })
            .await;
        Ok(item)
    }

    /// Lists a task's items in creation order.
    ///
    /// With `archived` set only archived items are returned, whatever their
    /// resolution.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::Store`] when the read fails.
    pub async fn list(
        &self,
        task_id: TaskId,
        filter: ActionItemFilter,
    ) -> BoardServiceResult<Vec<ActionItem>> {
        Ok(self
            .runtime
            .store()
            .list_action_items(task_id, filter)
            .await?)
    }

    /// Marks an item resolved.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::ActionItemNotFound`] or
    /// [`BoardServiceError::Store`].
    pub async fn resolve(&self, item_id: ActionItemId) -> BoardServiceResult<ActionItem> {
        let clock = self.runtime.clock();
        self.change(
            item_id,
            |item| item.resolve(&**clock),
            |task_id, item_id| BoardEvent::ActionItemResolved { task_id, item_id },
        )
        .await
    }

    /// Hides an item from the default listing.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::ActionItemNotFound`] or
    /// [`BoardServiceError::Store`].
    pub async fn archive(&self, item_id: ActionItemId) -> BoardServiceResult<ActionItem> {
        self.change(item_id, ActionItem::archive, |task_id, item_id| {
            BoardEvent::ActionItemArchived { task_id, item_id }
        })
        .await
    }

    /// Restores an archived item.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::ActionItemNotFound`] or
    /// [`BoardServiceError::Store`].
    pub async fn unarchive(&self, item_id: ActionItemId) -> BoardServiceResult<ActionItem> {
        self.change(item_id, ActionItem::unarchive, |task_id, item_id| {
            BoardEvent::ActionItemUnarchived { task_id, item_id }
        })
        .await
    }

    /// Deletes an item.
    ///
    /// # Errors
    ///
    /// Returns [`BoardServiceError::ActionItemNotFound`] or
    /// [`BoardServiceError::Store`].
    pub async fn delete(&self, item_id: ActionItemId) -> BoardServiceResult<ActionItem> {
        let item = self.runtime.store().delete_action_item(item_id).await?;
        self.runtime
            .publish(BoardEvent::ActionItemDeleted {
                task_id: item.task_id,
                item_id,
            })
            .await;
        Ok(item)
    }

    async fn change(
        &self,
        item_id: ActionItemId,
        apply: impl FnOnce(&mut ActionItem),
        event: impl FnOnce(TaskId, ActionItemId) -> BoardEvent,
    ) -> BoardServiceResult<ActionItem> {
        let store = self.runtime.store();
        let mut item = store
            .find_action_item(item_id)
            .await?
            .ok_or(BoardServiceError::ActionItemNotFound(item_id))?;
        apply(&mut item);
        store.save_action_item(&item).await?;
        self.runtime.publish(event(item.task_id, item_id)).await;
        Ok(item)
    }
}
