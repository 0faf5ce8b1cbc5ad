//! Command-bar chat history.

use super::{ChatMessageId, ParseChatRoleError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Author side of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The human operator.
    User,
    /// The agent answering in the session.
    Assistant,
}

impl ChatRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ChatRole {
    type Error = ParseChatRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            other => Err(ParseChatRoleError(other.to_owned())),
        }
    }
}

/// A file or image attached to a chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatAttachment {
    /// MIME type reported by the client.
    #[serde(rename = "type", default)]
    pub mime_type: String,
    /// Original file name, if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Inline payload (data URL or text), if supplied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl ChatAttachment {
    /// Describes the attachment for forwarding to an agent session.
    ///
    /// Images travel inline so the agent can inspect them; other files are
    /// referenced by name. Attachments without a payload are not forwarded.
    #[must_use]
    pub fn describe(&self) -> Option<String> {
        let data = self.data.as_deref().filter(|data| !data.is_empty())?;
        if self.mime_type.starts_with("image/") {
            return Some(format!("[IMAGE:{data}]"));
        }
        let name = self.filename.as_deref().unwrap_or("file");
        Some(format!("[Attached File: {name}]"))
    }
}

/// A persisted chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    /// Store-assigned identifier.
    pub id: ChatMessageId,
    /// Session the message belongs to.
    pub session_key: String,
    /// Author side.
    pub role: ChatRole,
    /// Message body.
    pub content: String,
    /// Structured attachments.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<ChatAttachment>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A chat message awaiting an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewChatMessage {
    /// Session the message belongs to.
    pub session_key: String,
    /// Author side.
    pub role: ChatRole,
    /// Message body.
    pub content: String,
    /// Structured attachments.
    pub attachments: Vec<ChatAttachment>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl NewChatMessage {
    /// Materialises the message once the store has assigned an identifier.
    #[must_use]
    pub fn into_message(self, id: ChatMessageId) -> ChatMessage {
        ChatMessage {
            id,
            session_key: self.session_key,
            role: self.role,
            content: self.content,
            attachments: self.attachments,
            created_at: self.created_at,
        }
    }
}
