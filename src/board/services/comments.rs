//! Comment posting and mention dispatch.

use mockable::Clock;

use super::{BoardRuntime, BoardServiceResult};
use crate::agent::services::{AgentDispatcher, CommentDispatch};
use crate::board::{
    domain::{Comment, NewComment, TaskId},
    ports::BoardStore,
};
use crate::live::domain::BoardEvent;

/// A stored comment and the agent dispatch it triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedComment {
    /// The stored comment.
    pub comment: Comment,
    /// Follow-up work scheduled for the comment.
    pub dispatch: CommentDispatch,
}

/// Stores comments and hands them to the agent dispatcher.
pub struct CommentService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    runtime: BoardRuntime<S, C>,
    dispatcher: AgentDispatcher<S, C>,
}

impl<S, C> Clone for CommentService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    fn clone(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            dispatcher: self.dispatcher.clone(),
        }
    }
}

impl<S, C> CommentService<S, C>
where
    S: BoardStore + 'static,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a comment service.
    #[must_use]
    pub fn new(runtime: BoardRuntime<S, C>) -> Self {
        Self {
            dispatcher: AgentDispatcher::new(runtime.clone()),
            runtime,
        }
    }

    /// Stores a comment, broadcasts it, then dispatches mentions and
    /// replies.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Validation`] for an invalid
    /// author or oversized content, [`super::BoardServiceError::TaskNotFound`],
    /// or [`super::BoardServiceError::Store`]. Dispatch failures are never
    /// returned.
    pub async fn add_comment(
        &self,
        task_id: TaskId,
        agent: &str,
        content: &str,
    ) -> BoardServiceResult<PostedComment> {
        let limits = self.runtime.limits();
        let agent = limits.validate_author(agent)?;
        limits.validate_content(content)?;

        let task = self.runtime.require_task(task_id).await?;
        let comment = self
            .runtime
            .store()
            .insert_comment(NewComment {
                task_id,
                agent: agent.to_owned(),
                content: content.to_owned(),
                created_at: self.runtime.clock().utc(),
            })
            .await?;
        self.runtime
            .publish(BoardEvent::CommentAdded {
                task_id,
                comment: comment.clone(),
            })
            .await;

        let dispatch = self.dispatcher.dispatch_comment(&task, &comment);
        Ok(PostedComment { comment, dispatch })
    }

    /// Lists a task's comments, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Store`] when the read fails.
    pub async fn list_comments(&self, task_id: TaskId) -> BoardServiceResult<Vec<Comment>> {
        Ok(self.runtime.store().list_comments(task_id).await?)
    }
}
