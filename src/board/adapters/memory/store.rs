//! Thread-safe in-memory implementation of every board port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::board::{
    domain::{
        ActionItem, ActionItemFilter, ActionItemId, ActivityEntry, ActivityId, ChatMessage,
        ChatMessageId, Comment, CommentId, NewActionItem, NewActivityEntry, NewChatMessage,
        NewComment, NewTask, Task, TaskId, TaskStatus,
    },
    ports::{
        ActionItemRepository, ActivityRepository, BoardStoreError, BoardStoreResult,
        ChatRepository, CommentRepository, CommittedTask, TaskCommit, TaskFilter, TaskOrder,
        TaskRepository,
    },
};

/// Thread-safe in-memory board store.
///
/// Identifiers are assigned from per-kind counters starting at 1.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBoardStore {
    state: Arc<RwLock<InMemoryBoardState>>,
}

#[derive(Debug, Default)]
struct InMemoryBoardState {
    tasks: BTreeMap<TaskId, Task>,
    comments: BTreeMap<CommentId, Comment>,
    action_items: BTreeMap<ActionItemId, ActionItem>,
    activity: Vec<ActivityEntry>,
    chat: Vec<ChatMessage>,
    deleted_sessions: HashMap<String, DateTime<Utc>>,
    sequences: Sequences,
}

#[derive(Debug, Default)]
struct Sequences {
    task: i64,
    comment: i64,
    action_item: i64,
    activity: i64,
    chat: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

impl InMemoryBoardStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> BoardStoreResult<RwLockReadGuard<'_, InMemoryBoardState>> {
        self.state
            .read()
            .map_err(|err| BoardStoreError::persistence(std::io::Error::other(err.to_string())))
    }

    fn write(&self) -> BoardStoreResult<RwLockWriteGuard<'_, InMemoryBoardState>> {
        self.state
            .write()
            .map_err(|err| BoardStoreError::persistence(std::io::Error::other(err.to_string())))
    }
}

impl InMemoryBoardState {
    fn require_task(&self, id: TaskId) -> BoardStoreResult<&Task> {
        self.tasks.get(&id).ok_or(BoardStoreError::TaskNotFound(id))
    }

    fn push_activity(&mut self, entry: NewActivityEntry) -> ActivityEntry {
        let id = ActivityId::new(next(&mut self.sequences.activity));
        let stored = entry.into_entry(id);
        self.activity.push(stored.clone());
        stored
    }

    fn push_action_item(&mut self, item: NewActionItem) -> ActionItem {
        let id = ActionItemId::new(next(&mut self.sequences.action_item));
        let stored = item.into_action_item(id);
        self.action_items.insert(id, stored.clone());
        stored
    }
}

#[async_trait]
impl TaskRepository for InMemoryBoardStore {
    async fn insert_task(&self, task: NewTask) -> BoardStoreResult<Task> {
        let mut state = self.write()?;
        let id = TaskId::new(next(&mut state.sequences.task));
        let stored = task.into_task(id);
        state.tasks.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_task(&self, id: TaskId) -> BoardStoreResult<Option<Task>> {
        Ok(self.read()?.tasks.get(&id).cloned())
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> BoardStoreResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| filter.matches(task))
            .cloned()
            .collect();
        TaskOrder::Board.sort(&mut tasks);
        Ok(tasks)
    }

    async fn list_open_tasks_for_agent(&self, agent: &str) -> BoardStoreResult<Vec<Task>> {
        let state = self.read()?;
        let mut tasks: Vec<Task> = state
            .tasks
            .values()
            .filter(|task| {
                task.agent() == agent
                    && !matches!(task.status(), TaskStatus::Done | TaskStatus::Blocked)
            })
            .cloned()
            .collect();
        TaskOrder::AgentQueue.sort(&mut tasks);
        Ok(tasks)
    }

    async fn commit_task(&self, commit: TaskCommit) -> BoardStoreResult<CommittedTask> {
        let mut state = self.write()?;
        let task_id = commit.task.id();
        let current = state.require_task(task_id)?;
        if current.updated_at() != commit.expected_updated_at {
            return Err(BoardStoreError::Conflict(task_id));
        }

        state.tasks.insert(task_id, commit.task.clone());
        if let Some(entry) = commit.activity {
            state.push_activity(entry);
        }
        let action_item = commit.action_item.map(|item| state.push_action_item(item));
        Ok(CommittedTask {
            task: commit.task,
            action_item,
        })
    }

    async fn delete_task(&self, id: TaskId) -> BoardStoreResult<Task> {
        let mut state = self.write()?;
        let removed = state
            .tasks
            .remove(&id)
            .ok_or(BoardStoreError::TaskNotFound(id))?;
        state.comments.retain(|_, comment| comment.task_id != id);
        state.action_items.retain(|_, item| item.task_id != id);
        Ok(removed)
    }
}

#[async_trait]
impl CommentRepository for InMemoryBoardStore {
    async fn insert_comment(&self, comment: NewComment) -> BoardStoreResult<Comment> {
        let mut state = self.write()?;
        state.require_task(comment.task_id)?;
        let id = CommentId::new(next(&mut state.sequences.comment));
        let stored = comment.into_comment(id);
        state.comments.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_comments(&self, task_id: TaskId) -> BoardStoreResult<Vec<Comment>> {
        let state = self.read()?;
        Ok(state
            .comments
            .values()
            .filter(|comment| comment.task_id == task_id)
            .cloned()
            .collect())
    }

    async fn recent_comments(
        &self,
        task_id: TaskId,
        limit: usize,
        excluding: Option<CommentId>,
    ) -> BoardStoreResult<Vec<Comment>> {
        let state = self.read()?;
        let mut recent: Vec<Comment> = state
            .comments
            .values()
            .rev()
            .filter(|comment| comment.task_id == task_id && Some(comment.id) != excluding)
            .take(limit)
            .cloned()
            .collect();
        recent.reverse();
        Ok(recent)
    }
}

#[async_trait]
impl ActionItemRepository for InMemoryBoardStore {
    async fn insert_action_item(&self, item: NewActionItem) -> BoardStoreResult<ActionItem> {
        let mut state = self.write()?;
        state.require_task(item.task_id)?;
        Ok(state.push_action_item(item))
    }

    async fn find_action_item(&self, id: ActionItemId) -> BoardStoreResult<Option<ActionItem>> {
        Ok(self.read()?.action_items.get(&id).cloned())
    }

    async fn save_action_item(&self, item: &ActionItem) -> BoardStoreResult<()> {
        let mut state = self.write()?;
        let stored = state
            .action_items
            .get_mut(&item.id)
            .ok_or(BoardStoreError::ActionItemNotFound(item.id))?;
        *stored = item.clone();
        Ok(())
    }

    async fn delete_action_item(&self, id: ActionItemId) -> BoardStoreResult<ActionItem> {
        self.write()?
            .action_items
            .remove(&id)
            .ok_or(BoardStoreError::ActionItemNotFound(id))
    }

    async fn list_action_items(
        &self,
        task_id: TaskId,
        filter: ActionItemFilter,
    ) -> BoardStoreResult<Vec<ActionItem>> {
        let state = self.read()?;
        Ok(state
            .action_items
            .values()
            .filter(|item| item.task_id == task_id && filter.matches(item))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ActivityRepository for InMemoryBoardStore {
    async fn append_activity(&self, entry: NewActivityEntry) -> BoardStoreResult<ActivityEntry> {
        Ok(self.write()?.push_activity(entry))
    }

    async fn recent_activity(&self, limit: usize) -> BoardStoreResult<Vec<ActivityEntry>> {
        let state = self.read()?;
        let mut entries: Vec<ActivityEntry> = state.activity.clone();
        entries.sort_by(|left, right| {
            right
                .timestamp
                .cmp(&left.timestamp)
                .then(right.id.cmp(&left.id))
        });
        entries.truncate(limit);
        Ok(entries)
    }

    async fn task_activity(&self, task_id: TaskId) -> BoardStoreResult<Vec<ActivityEntry>> {
        let state = self.read()?;
        Ok(state
            .activity
            .iter()
            .filter(|entry| entry.task_id == task_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ChatRepository for InMemoryBoardStore {
    async fn append_chat_message(
        &self,
        message: NewChatMessage,
    ) -> BoardStoreResult<ChatMessage> {
        let mut state = self.write()?;
        let id = ChatMessageId::new(next(&mut state.sequences.chat));
        let stored = message.into_message(id);
        state.chat.push(stored.clone());
        Ok(stored)
    }

    async fn chat_history(
        &self,
        session_key: &str,
        limit: usize,
    ) -> BoardStoreResult<Vec<ChatMessage>> {
        let state = self.read()?;
        let mut history: Vec<ChatMessage> = state
            .chat
            .iter()
            .rev()
            .filter(|message| message.session_key == session_key)
            .take(limit)
            .cloned()
            .collect();
        history.reverse();
        Ok(history)
    }

    async fn delete_chat_history(&self, session_key: &str) -> BoardStoreResult<usize> {
        let mut state = self.write()?;
        let before = state.chat.len();
        state.chat.retain(|message| message.session_key != session_key);
        Ok(before - state.chat.len())
    }

    async fn record_deleted_session(
        &self,
        session_key: &str,
        deleted_at: DateTime<Utc>,
    ) -> BoardStoreResult<()> {
        self.write()?
            .deleted_sessions
            .insert(session_key.to_owned(), deleted_at);
        Ok(())
    }

    async fn deleted_sessions(&self) -> BoardStoreResult<Vec<String>> {
        let mut keys: Vec<String> = self.read()?.deleted_sessions.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn forget_deleted_sessions(&self, session_keys: &[String]) -> BoardStoreResult<()> {
        let mut state = self.write()?;
        for key in session_keys {
            state.deleted_sessions.remove(key);
        }
        Ok(())
    }
}
