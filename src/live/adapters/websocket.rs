//! Channel adapter feeding a WebSocket writer task.

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::live::ports::{LiveChannel, LiveChannelError, LiveChannelResult};

/// Frames buffered per viewer before further frames are dropped.
pub const DEFAULT_OUTBOX_CAPACITY: usize = 256;

/// Live channel that queues frames for a connection's writer task.
///
/// Queueing never waits: a full outbox drops the frame.
#[derive(Debug, Clone)]
pub struct WebSocketChannel {
    outbox: mpsc::Sender<String>,
}

impl WebSocketChannel {
    /// Creates a channel and the receiver its writer task drains.
    #[must_use]
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<String>) {
        let (outbox, receiver) = mpsc::channel(capacity.max(1));
        (Self { outbox }, receiver)
    }

    /// Returns a sender for frames that originate from the connection itself,
    /// such as liveness replies.
    #[must_use]
    pub fn outbox(&self) -> mpsc::Sender<String> {
        self.outbox.clone()
    }
}

#[async_trait]
impl LiveChannel for WebSocketChannel {
    async fn send(&self, frame: &str) -> LiveChannelResult<()> {
        self.outbox
            .try_send(frame.to_owned())
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => LiveChannelError::Lagged,
                mpsc::error::TrySendError::Closed(_) => LiveChannelError::Closed,
            })
    }
}
