//! Agent session handles and descriptors.

use super::{AgentDomainError, ExternalAgentId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle of a session in the external orchestration system.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionKey(String);

impl SessionKey {
    /// Validates and wraps a session key.
    ///
    /// # Errors
    ///
    /// Returns [`AgentDomainError::EmptySessionKey`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, AgentDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AgentDomainError::EmptySessionKey);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Key of the coordinating agent's primary session.
    #[must_use]
    pub fn main() -> Self {
        Self(ExternalAgentId::MAIN.to_owned())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for main sessions, which are never stopped in bulk.
    #[must_use]
    pub fn is_main(&self) -> bool {
        self.0.to_lowercase().contains("main")
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the orchestration system does with a session once its run ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionCleanup {
    /// Keep the session so follow-up messages can reach it.
    Keep,
    /// Delete the session after its run.
    Delete,
}

impl SessionCleanup {
    /// Returns the wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Keep => "keep",
            Self::Delete => "delete",
        }
    }
}

/// Parameters for starting a new agent session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpawnRequest {
    /// Agent to run.
    pub agent_id: ExternalAgentId,
    /// Initial instructions.
    pub prompt: String,
    /// Human-readable session label.
    pub label: String,
    /// Post-run cleanup policy.
    pub cleanup: SessionCleanup,
}

impl SpawnRequest {
    /// Creates a request that keeps the session after its run.
    #[must_use]
    pub fn new(
        agent_id: ExternalAgentId,
        prompt: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            agent_id,
            prompt: prompt.into(),
            label: label.into(),
            cleanup: SessionCleanup::Keep,
        }
    }

    /// Sets the post-run cleanup policy.
    #[must_use]
    pub const fn with_cleanup(mut self, cleanup: SessionCleanup) -> Self {
        self.cleanup = cleanup;
        self
    }
}

/// Result of a successful spawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SpawnedSession {
    /// Key of the new session, when the orchestration system reported one.
    pub session_key: Option<SessionKey>,
    /// Run identifier, when reported.
    pub run_id: Option<String>,
}

/// A session as reported by the orchestration system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    /// Session key.
    pub key: String,
    /// Label assigned at spawn time.
    pub label: Option<String>,
    /// Display name reported by the orchestration system.
    pub display_name: Option<String>,
    /// Delivery channel.
    pub channel: String,
    /// Model serving the session.
    pub model: String,
    /// Last activity, in milliseconds since the Unix epoch.
    pub updated_at: i64,
}

/// A session formatted for board viewers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    /// Session key.
    pub key: String,
    /// Display label.
    pub label: String,
    /// Delivery channel.
    pub channel: String,
    /// Model serving the session.
    pub model: String,
    /// Last activity, in milliseconds since the Unix epoch.
    pub updated_at: i64,
}

impl SessionSummary {
    /// Formats a reported session, deriving a display label from its key
    /// when no label was assigned.
    #[must_use]
    pub fn from_info(info: SessionInfo, main_label: &str) -> Self {
        let label = display_label(&info, main_label);
        Self {
            key: info.key,
            label,
            channel: info.channel,
            model: info.model,
            updated_at: info.updated_at,
        }
    }

    /// Returns `true` for main sessions.
    #[must_use]
    pub fn is_main(&self) -> bool {
        self.key.to_lowercase().contains("main")
    }
}

fn display_label(info: &SessionInfo, main_label: &str) -> String {
    let key = info.key.as_str();
    if key == "main" || key == "agent:main:main" {
        return main_label.to_owned();
    }
    if let Some(label) = info.label.as_deref().filter(|label| !label.is_empty()) {
        return format!("🤖 {label}");
    }
    if key.contains("subagent") {
        let tail = key.rsplit(':').next().unwrap_or(key);
        let short: String = tail.chars().take(8).collect();
        return format!("🤖 Session {short}");
    }
    if let Some(rest) = key.strip_prefix("agent:") {
        let agent = rest.split(':').next().unwrap_or(rest);
        return format!("🤖 {}", title_case(agent));
    }
    info.display_name.clone().unwrap_or_else(|| key.to_owned())
}

fn title_case(value: &str) -> String {
    let mut output = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_alphabetic() {
            if at_word_start {
                output.extend(ch.to_uppercase());
            } else {
                output.extend(ch.to_lowercase());
            }
            at_word_start = false;
        } else {
            output.push(ch);
            at_word_start = true;
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn info(key: &str, label: Option<&str>) -> SessionInfo {
        SessionInfo {
            key: key.to_owned(),
            label: label.map(str::to_owned),
            display_name: None,
            channel: String::new(),
            model: String::new(),
            updated_at: 0,
        }
    }

    #[rstest]
    #[case("agent:main:main", None, "Main")]
    #[case("agent:architect:subagent:1", Some("task-4"), "🤖 task-4")]
    #[case("agent:architect:subagent:0123456789ab", None, "🤖 Session 01234567")]
    #[case("agent:code-reviewer:x", None, "🤖 Code-Reviewer")]
    #[case("webchat-1", None, "webchat-1")]
    fn labels_are_derived_from_keys(
        #[case] key: &str,
        #[case] label: Option<&str>,
        #[case] expected: &str,
    ) {
        let summary = SessionSummary::from_info(info(key, label), "Main");
        assert_eq!(summary.label, expected);
    }

    #[rstest]
    fn blank_session_keys_are_rejected() {
        assert_eq!(SessionKey::new("  "), Err(AgentDomainError::EmptySessionKey));
    }

    #[rstest]
    #[case("agent:main:main", true)]
    #[case("agent:MAIN:x", true)]
    #[case("agent:architect:subagent:1", false)]
    fn main_sessions_are_detected(#[case] key: &str, #[case] expected: bool) {
        let session_key = SessionKey::new(key).expect("valid key");
        assert_eq!(session_key.is_main(), expected);
    }
}
