//! Size limits applied to free-text board content.

use super::BoardDomainError;

/// Bounds applied to authors and free-text content before any write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLimits {
    /// Maximum comment and chat message size in bytes.
    pub max_content_bytes: usize,
    /// Maximum author name length in characters.
    pub max_agent_name_chars: usize,
    /// Maximum size of an assistant reply pushed by an agent, in bytes.
    pub max_response_bytes: usize,
    /// Number of prior comments supplied as context to spawned sessions.
    pub context_window: usize,
    /// Per-comment truncation applied to prior-comment context, in characters.
    pub context_truncate_chars: usize,
}

impl ContentLimits {
    /// Default comment and chat size limit (10 MiB).
    pub const DEFAULT_MAX_CONTENT_BYTES: usize = 10 * 1024 * 1024;
    /// Default agent name length limit.
    pub const DEFAULT_MAX_AGENT_NAME_CHARS: usize = 100;
    /// Default assistant reply limit (1 MiB).
    pub const DEFAULT_MAX_RESPONSE_BYTES: usize = 1024 * 1024;

    /// Validates an author name and returns it trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::EmptyAgentName`] or
    /// [`BoardDomainError::AgentNameTooLong`].
    pub fn validate_author<'a>(&self, name: &'a str) -> Result<&'a str, BoardDomainError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(BoardDomainError::EmptyAgentName);
        }
        let actual = trimmed.chars().count();
        if actual > self.max_agent_name_chars {
            return Err(BoardDomainError::AgentNameTooLong {
                actual,
                max: self.max_agent_name_chars,
            });
        }
        Ok(trimmed)
    }

    /// Validates comment or chat content size.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::ContentTooLarge`] when the content exceeds
    /// [`Self::max_content_bytes`].
    pub const fn validate_content(&self, content: &str) -> Result<(), BoardDomainError> {
        check_size(content, self.max_content_bytes)
    }

    /// Validates an assistant reply size.
    ///
    /// # Errors
    ///
    /// Returns [`BoardDomainError::ContentTooLarge`] when the reply exceeds
    /// [`Self::max_response_bytes`].
    pub const fn validate_response(&self, content: &str) -> Result<(), BoardDomainError> {
        check_size(content, self.max_response_bytes)
    }
}

const fn check_size(content: &str, limit_bytes: usize) -> Result<(), BoardDomainError> {
    let actual_bytes = content.len();
    if actual_bytes > limit_bytes {
        return Err(BoardDomainError::ContentTooLarge {
            actual_bytes,
            limit_bytes,
        });
    }
    Ok(())
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            max_content_bytes: Self::DEFAULT_MAX_CONTENT_BYTES,
            max_agent_name_chars: Self::DEFAULT_MAX_AGENT_NAME_CHARS,
            max_response_bytes: Self::DEFAULT_MAX_RESPONSE_BYTES,
            context_window: 5,
            context_truncate_chars: 500,
        }
    }
}
