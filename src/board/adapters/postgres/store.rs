//! `PostgreSQL` implementation of every board port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::connection::SimpleConnection;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::Error as DieselError;

use super::{
    models::{
        ActionItemChangeset, ActionItemRow, ActivityRow, ChatMessageRow, CommentRow,
        DeletedSessionRow, NewActionItemRow, NewActivityRow, NewChatMessageRow, NewCommentRow,
        NewTaskRow, TaskChangeset, TaskRow,
    },
    schema::{action_items, activity_log, chat_messages, comments, deleted_sessions, tasks},
};
use crate::agent::domain::SessionKey;
use crate::board::{
    domain::{
        ActionItem, ActionItemFilter, ActionItemId, ActionItemType, ActivityAction,
        ActivityEntry, ActivityId, ChatAttachment, ChatMessage, ChatMessageId, ChatRole, Comment,
        CommentId, NewActionItem, NewActivityEntry, NewChatMessage, NewComment, NewTask,
        PersistedTaskData, Task, TaskId, TaskPriority, TaskStatus,
    },
    ports::{
        ActionItemRepository, ActivityRepository, BoardStoreError, BoardStoreResult,
        ChatRepository, CommentRepository, CommittedTask, TaskCommit, TaskFilter, TaskOrder,
        TaskRepository,
    },
};

const SCHEMA_SQL: &str = include_str!("../../../../migrations/0001_create_board.sql");

/// `PostgreSQL` connection pool type used by the board store.
pub type BoardPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed board store.
#[derive(Debug, Clone)]
pub struct PostgresBoardStore {
    pool: BoardPgPool,
}

/// Error carrier for diesel transactions, which need `From<DieselError>`.
struct TxError(BoardStoreError);

impl From<DieselError> for TxError {
    fn from(err: DieselError) -> Self {
        Self(BoardStoreError::persistence(err))
    }
}

impl From<BoardStoreError> for TxError {
    fn from(err: BoardStoreError) -> Self {
        Self(err)
    }
}

impl PostgresBoardStore {
    /// Creates a store from a connection pool.
    #[must_use]
    pub const fn new(pool: BoardPgPool) -> Self {
        Self { pool }
    }

    /// Builds a pool for `database_url` and returns a store using it.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::Persistence`] when the pool cannot be
    /// established.
    pub fn connect(database_url: &str, max_connections: u32) -> BoardStoreResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = Pool::builder()
            .max_size(max_connections.max(1))
            .build(manager)
            .map_err(BoardStoreError::persistence)?;
        Ok(Self::new(pool))
    }

    /// Creates the board tables when they do not exist yet.
    ///
    /// # Errors
    ///
    /// Returns [`BoardStoreError::Persistence`] when the schema statements
    /// fail.
    pub async fn ensure_schema(&self) -> BoardStoreResult<()> {
        self.run_blocking(|connection| {
            connection
                .batch_execute(SCHEMA_SQL)
                .map_err(BoardStoreError::persistence)
        })
        .await
    }

    async fn run_blocking<F, T>(&self, f: F) -> BoardStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> BoardStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(BoardStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(BoardStoreError::persistence)?
    }
}

fn sql_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn row_to_task(row: TaskRow) -> BoardStoreResult<Task> {
    let status = TaskStatus::try_from(row.status.as_str()).map_err(BoardStoreError::persistence)?;
    let priority =
        TaskPriority::try_from(row.priority.as_str()).map_err(BoardStoreError::persistence)?;
    let agent_session_key = row
        .agent_session_key
        .map(SessionKey::new)
        .transpose()
        .map_err(BoardStoreError::persistence)?;
    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::new(row.id),
        title: row.title,
        description: row.description,
        status,
        priority,
        agent: row.agent,
        due_date: row.due_date,
        created_at: row.created_at,
        updated_at: row.updated_at,
        board: row.board,
        source_file: row.source_file,
        source_ref: row.source_ref,
        working_agent: row.working_agent,
        agent_session_key,
    }))
}

fn task_changeset(task: &Task) -> TaskChangeset {
    TaskChangeset {
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        status: task.status().as_str().to_owned(),
        priority: task.priority().as_str().to_owned(),
        agent: task.agent().to_owned(),
        due_date: task.due_date(),
        updated_at: task.updated_at(),
        board: task.board().to_owned(),
        source_file: task.source_file().map(str::to_owned),
        source_ref: task.source_ref().map(str::to_owned),
        working_agent: task.working_agent().map(str::to_owned),
        agent_session_key: task.agent_session_key().map(|key| key.as_str().to_owned()),
    }
}

fn row_to_comment(row: CommentRow) -> Comment {
    Comment {
        id: CommentId::new(row.id),
        task_id: TaskId::new(row.task_id),
        agent: row.agent,
        content: row.content,
        created_at: row.created_at,
    }
}

fn row_to_action_item(row: ActionItemRow) -> BoardStoreResult<ActionItem> {
    let item_type =
        ActionItemType::try_from(row.item_type.as_str()).map_err(BoardStoreError::persistence)?;
    Ok(ActionItem {
        id: ActionItemId::new(row.id),
        task_id: TaskId::new(row.task_id),
        comment_id: row.comment_id.map(CommentId::new),
        agent: row.agent,
        content: row.content,
        item_type,
        resolved: row.resolved,
        archived: row.archived,
        created_at: row.created_at,
        resolved_at: row.resolved_at,
    })
}

fn new_action_item_row(item: NewActionItem) -> NewActionItemRow {
    NewActionItemRow {
        task_id: item.task_id.value(),
        comment_id: item.comment_id.map(CommentId::value),
        agent: item.agent,
        content: item.content,
        item_type: item.item_type.as_str().to_owned(),
        created_at: item.created_at,
    }
}

fn row_to_activity(row: ActivityRow) -> BoardStoreResult<ActivityEntry> {
    let action =
        ActivityAction::try_from(row.action.as_str()).map_err(BoardStoreError::persistence)?;
    Ok(ActivityEntry {
        id: ActivityId::new(row.id),
        task_id: TaskId::new(row.task_id),
        action,
        agent: row.agent,
        details: row.details,
        timestamp: row.recorded_at,
    })
}

fn new_activity_row(entry: NewActivityEntry) -> NewActivityRow {
    NewActivityRow {
        task_id: entry.task_id.value(),
        action: entry.action.as_str().to_owned(),
        agent: entry.agent,
        details: entry.details,
        recorded_at: entry.timestamp,
    }
}

fn row_to_chat_message(row: ChatMessageRow) -> BoardStoreResult<ChatMessage> {
    let role = ChatRole::try_from(row.role.as_str()).map_err(BoardStoreError::persistence)?;
    let attachments = row
        .attachments
        .map(serde_json::from_value::<Vec<ChatAttachment>>)
        .transpose()
        .map_err(BoardStoreError::persistence)?
        .unwrap_or_default();
    Ok(ChatMessage {
        id: ChatMessageId::new(row.id),
        session_key: row.session_key,
        role,
        content: row.content,
        attachments,
        created_at: row.created_at,
    })
}

fn require_task_exists(connection: &mut PgConnection, id: TaskId) -> BoardStoreResult<()> {
    let found = tasks::table
        .find(id.value())
        .select(tasks::id)
        .first::<i64>(connection)
        .optional()
        .map_err(BoardStoreError::persistence)?;
    found.map(|_| ()).ok_or(BoardStoreError::TaskNotFound(id))
}

fn apply_commit(
    connection: &mut PgConnection,
    commit: TaskCommit,
) -> Result<CommittedTask, TxError> {
    let task_id = commit.task.id();
    let stored_at = tasks::table
        .find(task_id.value())
        .select(tasks::updated_at)
        .for_update()
        .first::<DateTime<Utc>>(connection)
        .optional()?
        .ok_or(BoardStoreError::TaskNotFound(task_id))?;
    if stored_at != commit.expected_updated_at {
        return Err(BoardStoreError::Conflict(task_id).into());
    }

    let row = diesel::update(tasks::table.find(task_id.value()))
        .set(&task_changeset(&commit.task))
        .returning(TaskRow::as_returning())
        .get_result::<TaskRow>(connection)?;

    if let Some(entry) = commit.activity {
        diesel::insert_into(activity_log::table)
            .values(&new_activity_row(entry))
            .execute(connection)?;
    }

    let action_item = commit
        .action_item
        .map(|item| {
            diesel::insert_into(action_items::table)
                .values(&new_action_item_row(item))
                .returning(ActionItemRow::as_returning())
                .get_result::<ActionItemRow>(connection)
        })
        .transpose()?
        .map(row_to_action_item)
        .transpose()?;

    Ok(CommittedTask {
        task: row_to_task(row)?,
        action_item,
    })
}

#[async_trait]
impl TaskRepository for PostgresBoardStore {
    async fn insert_task(&self, task: NewTask) -> BoardStoreResult<Task> {
        let row = NewTaskRow {
            title: task.title,
            description: task.description,
            status: task.status.as_str().to_owned(),
            priority: task.priority.as_str().to_owned(),
            agent: task.agent,
            due_date: task.due_date,
            created_at: task.created_at,
            updated_at: task.created_at,
            board: task.board,
            source_file: task.source_file,
            source_ref: task.source_ref,
        };
        self.run_blocking(move |connection| {
            let stored = diesel::insert_into(tasks::table)
                .values(&row)
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .map_err(BoardStoreError::persistence)?;
            row_to_task(stored)
        })
        .await
    }

    async fn find_task(&self, id: TaskId) -> BoardStoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.value())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(BoardStoreError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn list_tasks(&self, filter: &TaskFilter) -> BoardStoreResult<Vec<Task>> {
        let board = filter.board().to_owned();
        let agent = filter.agent().map(str::to_owned);
        let status = filter.status().map(|status| status.as_str().to_owned());
        self.run_blocking(move |connection| {
            let mut query = tasks::table
                .filter(tasks::board.eq(board))
                .select(TaskRow::as_select())
                .into_boxed();
            if let Some(owner) = agent {
                query = query.filter(tasks::agent.eq(owner));
            }
            if let Some(column) = status {
                query = query.filter(tasks::status.eq(column));
            }
            let rows = query
                .load::<TaskRow>(connection)
                .map_err(BoardStoreError::persistence)?;
            let mut listed = rows
                .into_iter()
                .map(row_to_task)
                .collect::<BoardStoreResult<Vec<_>>>()?;
            TaskOrder::Board.sort(&mut listed);
            Ok(listed)
        })
        .await
    }

    async fn list_open_tasks_for_agent(&self, agent: &str) -> BoardStoreResult<Vec<Task>> {
        let owner = agent.to_owned();
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::agent.eq(owner))
                .filter(
                    tasks::status
                        .ne_all(vec![TaskStatus::Done.as_str(), TaskStatus::Blocked.as_str()]),
                )
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)
                .map_err(BoardStoreError::persistence)?;
            let mut listed = rows
                .into_iter()
                .map(row_to_task)
                .collect::<BoardStoreResult<Vec<_>>>()?;
            TaskOrder::AgentQueue.sort(&mut listed);
            Ok(listed)
        })
        .await
    }

    async fn commit_task(&self, commit: TaskCommit) -> BoardStoreResult<CommittedTask> {
        self.run_blocking(move |connection| {
            connection
                .transaction::<_, TxError, _>(|tx| apply_commit(tx, commit))
                .map_err(|TxError(err)| err)
        })
        .await
    }

    async fn delete_task(&self, id: TaskId) -> BoardStoreResult<Task> {
        self.run_blocking(move |connection| {
            let row = diesel::delete(tasks::table.find(id.value()))
                .returning(TaskRow::as_returning())
                .get_result::<TaskRow>(connection)
                .optional()
                .map_err(BoardStoreError::persistence)?
                .ok_or(BoardStoreError::TaskNotFound(id))?;
            row_to_task(row)
        })
        .await
    }
}

#[async_trait]
impl CommentRepository for PostgresBoardStore {
    async fn insert_comment(&self, comment: NewComment) -> BoardStoreResult<Comment> {
        self.run_blocking(move |connection| {
            require_task_exists(connection, comment.task_id)?;
            let row = NewCommentRow {
                task_id: comment.task_id.value(),
                agent: comment.agent,
                content: comment.content,
                created_at: comment.created_at,
            };
            diesel::insert_into(comments::table)
                .values(&row)
                .returning(CommentRow::as_returning())
                .get_result::<CommentRow>(connection)
                .map(row_to_comment)
                .map_err(BoardStoreError::persistence)
        })
        .await
    }

    async fn list_comments(&self, task_id: TaskId) -> BoardStoreResult<Vec<Comment>> {
        self.run_blocking(move |connection| {
            comments::table
                .filter(comments::task_id.eq(task_id.value()))
                .order((comments::created_at.asc(), comments::id.asc()))
                .select(CommentRow::as_select())
                .load::<CommentRow>(connection)
                .map(|rows| rows.into_iter().map(row_to_comment).collect())
                .map_err(BoardStoreError::persistence)
        })
        .await
    }

    async fn recent_comments(
        &self,
        task_id: TaskId,
        limit: usize,
        excluding: Option<CommentId>,
    ) -> BoardStoreResult<Vec<Comment>> {
        self.run_blocking(move |connection| {
            let mut query = comments::table
                .filter(comments::task_id.eq(task_id.value()))
                .select(CommentRow::as_select())
                .into_boxed();
            if let Some(skipped) = excluding {
                query = query.filter(comments::id.ne(skipped.value()));
            }
            let mut recent: Vec<Comment> = query
                .order((comments::created_at.desc(), comments::id.desc()))
                .limit(sql_limit(limit))
                .load::<CommentRow>(connection)
                .map_err(BoardStoreError::persistence)?
                .into_iter()
                .map(row_to_comment)
                .collect();
            recent.reverse();
            Ok(recent)
        })
        .await
    }
}

#[async_trait]
impl ActionItemRepository for PostgresBoardStore {
    async fn insert_action_item(&self, item: NewActionItem) -> BoardStoreResult<ActionItem> {
        self.run_blocking(move |connection| {
            require_task_exists(connection, item.task_id)?;
            let row = diesel::insert_into(action_items::table)
                .values(&new_action_item_row(item))
                .returning(ActionItemRow::as_returning())
                .get_result::<ActionItemRow>(connection)
                .map_err(BoardStoreError::persistence)?;
            row_to_action_item(row)
        })
        .await
    }

    async fn find_action_item(&self, id: ActionItemId) -> BoardStoreResult<Option<ActionItem>> {
        self.run_blocking(move |connection| {
            action_items::table
                .find(id.value())
                .select(ActionItemRow::as_select())
                .first::<ActionItemRow>(connection)
                .optional()
                .map_err(BoardStoreError::persistence)?
                .map(row_to_action_item)
                .transpose()
        })
        .await
    }

    async fn save_action_item(&self, item: &ActionItem) -> BoardStoreResult<()> {
        let id = item.id;
        let changes = ActionItemChangeset {
            resolved: item.resolved,
            archived: item.archived,
            resolved_at: item.resolved_at,
        };
        self.run_blocking(move |connection| {
            let updated = diesel::update(action_items::table.find(id.value()))
                .set(&changes)
                .execute(connection)
                .map_err(BoardStoreError::persistence)?;
            if updated == 0 {
                return Err(BoardStoreError::ActionItemNotFound(id));
            }
            Ok(())
        })
        .await
    }

    async fn delete_action_item(&self, id: ActionItemId) -> BoardStoreResult<ActionItem> {
        self.run_blocking(move |connection| {
            let row = diesel::delete(action_items::table.find(id.value()))
                .returning(ActionItemRow::as_returning())
                .get_result::<ActionItemRow>(connection)
                .optional()
                .map_err(BoardStoreError::persistence)?
                .ok_or(BoardStoreError::ActionItemNotFound(id))?;
            row_to_action_item(row)
        })
        .await
    }

    async fn list_action_items(
        &self,
        task_id: TaskId,
        filter: ActionItemFilter,
    ) -> BoardStoreResult<Vec<ActionItem>> {
        self.run_blocking(move |connection| {
            let mut query = action_items::table
                .filter(action_items::task_id.eq(task_id.value()))
                .select(ActionItemRow::as_select())
                .into_boxed();
            query = if filter.archived {
                query.filter(action_items::archived.eq(true))
            } else {
                query
                    .filter(action_items::archived.eq(false))
                    .filter(action_items::resolved.eq(filter.resolved))
            };
            query
                .order((action_items::created_at.asc(), action_items::id.asc()))
                .load::<ActionItemRow>(connection)
                .map_err(BoardStoreError::persistence)?
                .into_iter()
                .map(row_to_action_item)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl ActivityRepository for PostgresBoardStore {
    async fn append_activity(&self, entry: NewActivityEntry) -> BoardStoreResult<ActivityEntry> {
        self.run_blocking(move |connection| {
            let row = diesel::insert_into(activity_log::table)
                .values(&new_activity_row(entry))
                .returning(ActivityRow::as_returning())
                .get_result::<ActivityRow>(connection)
                .map_err(BoardStoreError::persistence)?;
            row_to_activity(row)
        })
        .await
    }

    async fn recent_activity(&self, limit: usize) -> BoardStoreResult<Vec<ActivityEntry>> {
        self.run_blocking(move |connection| {
            activity_log::table
                .order((activity_log::recorded_at.desc(), activity_log::id.desc()))
                .limit(sql_limit(limit))
                .select(ActivityRow::as_select())
                .load::<ActivityRow>(connection)
                .map_err(BoardStoreError::persistence)?
                .into_iter()
                .map(row_to_activity)
                .collect()
        })
        .await
    }

    async fn task_activity(&self, task_id: TaskId) -> BoardStoreResult<Vec<ActivityEntry>> {
        self.run_blocking(move |connection| {
            activity_log::table
                .filter(activity_log::task_id.eq(task_id.value()))
                .order((activity_log::recorded_at.asc(), activity_log::id.asc()))
                .select(ActivityRow::as_select())
                .load::<ActivityRow>(connection)
                .map_err(BoardStoreError::persistence)?
                .into_iter()
                .map(row_to_activity)
                .collect()
        })
        .await
    }
}

#[async_trait]
impl ChatRepository for PostgresBoardStore {
    async fn append_chat_message(
        &self,
        message: NewChatMessage,
    ) -> BoardStoreResult<ChatMessage> {
        let attachments = if message.attachments.is_empty() {
            None
        } else {
            Some(serde_json::to_value(&message.attachments).map_err(BoardStoreError::persistence)?)
        };
        let row = NewChatMessageRow {
            session_key: message.session_key,
            role: message.role.as_str().to_owned(),
            content: message.content,
            attachments,
            created_at: message.created_at,
        };
        self.run_blocking(move |connection| {
            let stored = diesel::insert_into(chat_messages::table)
                .values(&row)
                .returning(ChatMessageRow::as_returning())
                .get_result::<ChatMessageRow>(connection)
                .map_err(BoardStoreError::persistence)?;
            row_to_chat_message(stored)
        })
        .await
    }

    async fn chat_history(
        &self,
        session_key: &str,
        limit: usize,
    ) -> BoardStoreResult<Vec<ChatMessage>> {
        let session = session_key.to_owned();
        self.run_blocking(move |connection| {
            let mut history = chat_messages::table
                .filter(chat_messages::session_key.eq(session))
                .order(chat_messages::id.desc())
                .limit(sql_limit(limit))
                .select(ChatMessageRow::as_select())
                .load::<ChatMessageRow>(connection)
                .map_err(BoardStoreError::persistence)?
                .into_iter()
                .map(row_to_chat_message)
                .collect::<BoardStoreResult<Vec<_>>>()?;
            history.reverse();
            Ok(history)
        })
        .await
    }

    async fn delete_chat_history(&self, session_key: &str) -> BoardStoreResult<usize> {
        let session = session_key.to_owned();
        self.run_blocking(move |connection| {
            diesel::delete(chat_messages::table.filter(chat_messages::session_key.eq(session)))
                .execute(connection)
                .map_err(BoardStoreError::persistence)
        })
        .await
    }

    async fn record_deleted_session(
        &self,
        session_key: &str,
        deleted_at: DateTime<Utc>,
    ) -> BoardStoreResult<()> {
        let row = DeletedSessionRow {
            session_key: session_key.to_owned(),
            deleted_at,
        };
        self.run_blocking(move |connection| {
            diesel::insert_into(deleted_sessions::table)
                .values(&row)
                .on_conflict(deleted_sessions::session_key)
                .do_update()
                .set(deleted_sessions::deleted_at.eq(deleted_at))
                .execute(connection)
                .map(|_| ())
                .map_err(BoardStoreError::persistence)
        })
        .await
    }

    async fn deleted_sessions(&self) -> BoardStoreResult<Vec<String>> {
        self.run_blocking(|connection| {
            deleted_sessions::table
                .select(deleted_sessions::session_key)
                .order(deleted_sessions::session_key.asc())
                .load::<String>(connection)
                .map_err(BoardStoreError::persistence)
        })
        .await
    }

    async fn forget_deleted_sessions(&self, session_keys: &[String]) -> BoardStoreResult<()> {
        if session_keys.is_empty() {
            return Ok(());
        }
        let keys = session_keys.to_vec();
        self.run_blocking(move |connection| {
            diesel::delete(
                deleted_sessions::table.filter(deleted_sessions::session_key.eq_any(keys)),
            )
            .execute(connection)
            .map(|_| ())
            .map_err(BoardStoreError::persistence)
        })
        .await
    }
}
