//! Port for a single viewer connection.

use async_trait::async_trait;
use thiserror::Error;

/// Result type for live channel operations.
pub type LiveChannelResult<T> = Result<T, LiveChannelError>;

/// A push-only connection to one viewer.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LiveChannel: Send + Sync {
    /// Pushes one serialised event frame.
    ///
    /// # Errors
    ///
    /// Returns [`LiveChannelError::Closed`] when the viewer is gone and
    /// [`LiveChannelError::Lagged`] when the frame was dropped because the
    /// viewer is not keeping up.
    async fn send(&self, frame: &str) -> LiveChannelResult<()>;
}

/// Delivery failures for a live channel.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum LiveChannelError {
    /// The connection is closed; the channel should be deregistered.
    #[error("live channel closed")]
    Closed,

    /// The frame was dropped; the viewer resynchronises by refetching state.
    #[error("live channel lagging, frame dropped")]
    Lagged,
}
