//! Diesel row models for board persistence.

use super::schema::{action_items, activity_log, chat_messages, comments, deleted_sessions, tasks};
use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for tasks.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub agent: String,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub board: String,
    pub source_file: Option<String>,
    pub source_ref: Option<String>,
    pub working_agent: Option<String>,
    pub agent_session_key: Option<String>,
}

/// Insert model for tasks.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub agent: String,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub board: String,
    pub source_file: Option<String>,
    pub source_ref: Option<String>,
}

/// Full-row update for tasks. `None` clears nullable columns.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct TaskChangeset {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub agent: String,
    pub due_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
    pub board: String,
    pub source_file: Option<String>,
    pub source_ref: Option<String>,
    pub working_agent: Option<String>,
    pub agent_session_key: Option<String>,
}

/// Query result row for comments.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = comments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CommentRow {
    pub id: i64,
    pub task_id: i64,
    pub agent: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Insert model for comments.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = comments)]
pub struct NewCommentRow {
    pub task_id: i64,
    pub agent: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Query result row for action items.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = action_items)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActionItemRow {
    pub id: i64,
    pub task_id: i64,
    pub comment_id: Option<i64>,
    pub agent: String,
    pub content: String,
    pub item_type: String,
    pub resolved: bool,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Insert model for action items.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = action_items)]
pub struct NewActionItemRow {
    pub task_id: i64,
    pub comment_id: Option<i64>,
    pub agent: String,
    pub content: String,
    pub item_type: String,
    pub created_at: DateTime<Utc>,
}

/// Flag update for action items.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = action_items)]
#[diesel(treat_none_as_null = true)]
pub struct ActionItemChangeset {
    pub resolved: bool,
    pub archived: bool,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Query result row for activity entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = activity_log)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityRow {
    pub id: i64,
    pub task_id: i64,
    pub action: String,
    pub agent: Option<String>,
    pub details: String,
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for activity entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = activity_log)]
pub struct NewActivityRow {
    pub task_id: i64,
    pub action: String,
    pub agent: Option<String>,
    pub details: String,
    pub recorded_at: DateTime<Utc>,
}

/// Query result row for chat messages.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = chat_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ChatMessageRow {
    pub id: i64,
    pub session_key: String,
    pub role: String,
    pub content: String,
    pub attachments: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Insert model for chat messages.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = chat_messages)]
pub struct NewChatMessageRow {
    pub session_key: String,
    pub role: String,
    pub content: String,
    pub attachments: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Insert model for deleted-session records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = deleted_sessions)]
pub struct DeletedSessionRow {
    pub session_key: String,
    pub deleted_at: DateTime<Utc>,
}
