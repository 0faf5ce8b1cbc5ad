//! Command-bar chat with the coordinating agent.

use mockable::Clock;
use serde::Serialize;
use tracing::warn;

use super::{BoardRuntime, BoardServiceResult};
use crate::agent::domain::SessionKey;
use crate::board::{
    domain::{
        BoardDomainError, ChatAttachment, ChatMessage, ChatRole, DEFAULT_CHAT_SESSION,
        NewChatMessage,
    },
    ports::BoardStore,
};
use crate::live::domain::BoardEvent;

/// Number of messages returned by the history when no limit is given.
pub const DEFAULT_CHAT_HISTORY_LIMIT: usize = 100;

/// A message typed into the command bar.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendChatRequest {
    /// Message text.
    pub message: String,
    /// Target session; the main session when absent.
    pub session: Option<String>,
    /// Files attached to the message.
    pub attachments: Vec<ChatAttachment>,
}

/// Result of forwarding a command-bar message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatSendOutcome {
    /// Whether the session accepted the message.
    pub sent: bool,
    /// Session the message went to.
    pub session: String,
    /// The session's reply, when it produced one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    /// Why forwarding failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Persists command-bar chat and relays it to agent sessions.
pub struct ChatService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    runtime: BoardRuntime<S, C>,
}

impl<S, C> Clone for ChatService<S, C>
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

impl<S, C> ChatService<S, C>
where
    S: BoardStore,
    C: Clock + Send + Sync,
{
    /// Creates a chat service.
    #[must_use]
    pub const fn new(runtime: BoardRuntime<S, C>) -> Self {
        Self { runtime }
    }

    /// Returns the latest messages of a session in chronological order.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Store`] when the read fails.
    pub async fn history(
        &self,
        session: Option<&str>,
        limit: Option<usize>,
    ) -> BoardServiceResult<Vec<ChatMessage>> {
        let session = session_name(session);
        let limit = limit.unwrap_or(DEFAULT_CHAT_HISTORY_LIMIT);
        Ok(self.runtime.store().chat_history(&session, limit).await?)
    }

    /// Stores and broadcasts a user message, then forwards it to the
    /// session and stores the reply.
    ///
    /// A forwarding failure is reported in the outcome; the user message
    /// stays stored.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Validation`] for oversized
    /// content or [`super::BoardServiceError::Store`] when a write fails.
    pub async fn send(&self, request: SendChatRequest) -> BoardServiceResult<ChatSendOutcome> {
        let limits = self.runtime.limits();
        let total_bytes = request.message.len()
            + request
                .attachments
                .iter()
                .map(|attachment| attachment.data.as_ref().map_or(0, String::len))
                .sum::<usize>();
        if total_bytes > limits.max_content_bytes {
            return Err(BoardDomainError::ContentTooLarge {
                actual_bytes: total_bytes,
                limit_bytes: limits.max_content_bytes,
            }
            .into());
        }

        let session = session_name(request.session.as_deref());
        let forwarded = forwarded_text(
            self.runtime.roster().supervisor(),
            &request.message,
            &request.attachments,
        );
        let stored = self
            .append(&session, ChatRole::User, request.message, request.attachments)
            .await?;
        self.runtime
            .publish(BoardEvent::CommandBarMessage { message: stored })
            .await;

        let reply = match SessionKey::new(session.clone()) {
            Ok(key) => self.runtime.coordinator().converse(&key, &forwarded).await,
            Err(err) => {
                return Ok(ChatSendOutcome {
                    sent: false,
                    session,
                    response: None,
                    error: Some(err.to_string()),
                });
            }
        };
        match reply {
            Ok(response) => {
                if let Some(text) = response.as_ref() {
                    self.append(&session, ChatRole::Assistant, text.clone(), Vec::new())
                        .await?;
                }
                Ok(ChatSendOutcome {
                    sent: true,
                    session,
                    response,
                    error: None,
                })
            }
            Err(err) => {
                warn!(session = %session, error = %err, "command bar message not delivered");
                Ok(ChatSendOutcome {
                    sent: false,
                    session,
                    response: None,
                    error: Some(err.to_string()),
                })
            }
        }
    }

    /// Stores and broadcasts a reply pushed by the coordinating agent.
    ///
    /// # Errors
    ///
    /// Returns [`super::BoardServiceError::Validation`] when the reply
    /// exceeds the response limit, or [`super::BoardServiceError::Store`].
    pub async fn record_assistant_reply(
        &self,
        response: String,
        session: Option<&str>,
    ) -> BoardServiceResult<ChatMessage> {
        self.runtime.limits().validate_response(&response)?;
        let session = session_name(session);
        let stored = self
            .append(&session, ChatRole::Assistant, response, Vec::new())
            .await?;
        self.runtime
            .publish(BoardEvent::CommandBarMessage {
                message: stored.clone(),
            })
            .await;
        Ok(stored)
    }

    async fn append(
        &self,
        session: &str,
        role: ChatRole,
        content: String,
        attachments: Vec<ChatAttachment>,
    ) -> BoardServiceResult<ChatMessage> {
        Ok(self
            .runtime
            .store()
            .append_chat_message(NewChatMessage {
                session_key: session.to_owned(),
                role,
                content,
                attachments,
                created_at: self.runtime.clock().utc(),
            })
            .await?)
    }
}

fn session_name(session: Option<&str>) -> String {
    session
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_CHAT_SESSION)
        .to_owned()
}

fn forwarded_text(speaker: &str, message: &str, attachments: &[ChatAttachment]) -> String {
    let mut text =
        format!("System: [TASKBOARD_CHAT] {speaker} says: {message}\n\nRespond naturally.");
    for description in attachments.iter().filter_map(ChatAttachment::describe) {
        text.push_str("\n\n");
        text.push_str(&description);
    }
    text
}
