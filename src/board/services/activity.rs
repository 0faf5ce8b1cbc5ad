//! Activity Recorder: append-only audit trail of task changes.

use mockable::Clock;

use super::{BoardRuntime, BoardServiceResult};
use crate::board::{
    domain::{ActivityAction, ActivityEntry, NewActivityEntry, TaskId},
    ports::BoardStore,
};

/// Number of entries returned by the activity feed when no limit is given.
pub const DEFAULT_ACTIVITY_LIMIT: usize = 50;

/// Writes and reads activity log entries.
pub struct ActivityRecorder<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    runtime: BoardRuntime<S, C>,
}

impl<S, C> Clone for ActivityRecorder<S, C>
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

impl<S, C> ActivityRecorder<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    /// Creates a recorder.
    #[must_use]
    pub const fn new(runtime: BoardRuntime<S, C>) -> Self {
        Self { runtime }
    }

    /// Builds an entry stamped with the current time, for writes that
    /// commit it together with a task change.
    #[must_use]
    pub fn entry(
        &self,
        task_id: TaskId,
        action: ActivityAction,
        agent: Option<&str>,
        details: impl Into<String>,
    ) -> NewActivityEntry {
        NewActivityEntry {
            task_id,
            action,
            agent: agent.map(str::to_owned),
            details: details.into(),
            timestamp: self.runtime.clock().utc(),
        }
    }

    /// Appends an entry on its own.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Store`] when the append fails.
    pub async fn record(
        &self,
        task_id: TaskId,
        action: ActivityAction,
        agent: Option<&str>,
        details: impl Into<String>,
    ) -> BoardServiceResult<ActivityEntry> {
        let entry = self.entry(task_id, action, agent, details);
        Ok(self.runtime.store().append_activity(entry).await?)
    }

    /// Returns the most recent entries across the board, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Store`] when the read fails.
    pub async fn recent(&self, limit: Option<usize>) -> BoardServiceResult<Vec<ActivityEntry>> {
        let limit = limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT);
        Ok(self.runtime.store().recent_activity(limit).await?)
    }

    /// Returns the full history of one task, oldest first.
    ///
    /// Entries outlive the task they describe.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Store`] when the read fails.
    pub async fn task_history(&self, task_id: TaskId) -> BoardServiceResult<Vec<ActivityEntry>> {
        Ok(self.runtime.store().task_activity(task_id).await?)
    }
}
