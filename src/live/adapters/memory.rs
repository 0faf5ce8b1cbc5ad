//! Recording live channel for tests.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::live::ports::{LiveChannel, LiveChannelError, LiveChannelResult};

/// Live channel that keeps every frame it receives.
#[derive(Debug, Clone, Default)]
pub struct RecordingChannel {
    frames: Arc<Mutex<Vec<String>>>,
    closed: Arc<AtomicBool>,
}

impl RecordingChannel {
    /// Creates an open channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates the viewer disconnecting.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    /// Returns every frame received so far.
    #[must_use]
    pub fn frames(&self) -> Vec<String> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the `type` tag of every frame received so far.
    #[must_use]
    pub fn event_types(&self) -> Vec<String> {
        self.frames()
            .iter()
            .filter_map(|frame| serde_json::from_str::<serde_json::Value>(frame).ok())
            .filter_map(|value| value.get("type").and_then(|tag| tag.as_str()).map(str::to_owned))
            .collect()
    }
}

#[async_trait]
impl LiveChannel for RecordingChannel {
    async fn send(&self, frame: &str) -> LiveChannelResult<()> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(LiveChannelError::Closed);
        }
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame.to_owned());
        Ok(())
    }
}
