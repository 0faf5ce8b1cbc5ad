//! Repository port for command-bar chat history and deleted sessions.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::BoardStoreResult;
use crate::board::domain::{ChatMessage, NewChatMessage};

/// Chat history persistence contract.
#[async_trait]
pub trait ChatRepository: Send + Sync {
    /// Appends a message and assigns its identifier.
    async fn append_chat_message(&self, message: NewChatMessage)
    -> BoardStoreResult<ChatMessage>;

    /// Returns up to `limit` of a session's most recent messages, oldest first.
    async fn chat_history(
        &self,
        session_key: &str,
        limit: usize,
    ) -> BoardStoreResult<Vec<ChatMessage>>;

    /// Deletes a session's history and returns the number of messages removed.
    async fn delete_chat_history(&self, session_key: &str) -> BoardStoreResult<usize>;

    /// Records a session as deleted so it is hidden from listings.
    async fn record_deleted_session(
        &self,
        session_key: &str,
        deleted_at: DateTime<Utc>,
    ) -> BoardStoreResult<()>;

    /// Returns every session key recorded as deleted.
    async fn deleted_sessions(&self) -> BoardStoreResult<Vec<String>>;

    /// Drops deleted-session records for the given keys.
    async fn forget_deleted_sessions(&self, session_keys: &[String]) -> BoardStoreResult<()>;
}
