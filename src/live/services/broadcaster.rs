//! Fan-out of board events to every connected viewer.

use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::live::{
    domain::{BoardEvent, ChannelId},
    ports::{LiveChannel, LiveChannelError},
};

/// Outcome of one broadcast pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Channels that accepted the event.
    pub delivered: usize,
    /// Channels that dropped the event but stay registered.
    pub lagged: usize,
    /// Channels removed because they were closed.
    pub evicted: usize,
}

/// Registry of live viewer channels.
///
/// Broadcasting snapshots the registry, delivers to every channel without
/// holding the registry lock, then removes the channels that turned out to
/// be closed. A failing channel never prevents delivery to the others.
#[derive(Default)]
pub struct Broadcaster {
    channels: RwLock<HashMap<ChannelId, Arc<dyn LiveChannel>>>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("channels", &self.channel_count())
            .finish_non_exhaustive()
    }
}

impl Broadcaster {
    /// Creates an empty broadcaster.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a channel and returns its identifier.
    pub fn connect(&self, channel: Arc<dyn LiveChannel>) -> ChannelId {
        let id = ChannelId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, channel);
        debug!(channel = %id, "live channel connected");
        id
    }

    /// Deregisters a channel. Removing an absent channel is a no-op.
    ///
    /// Returns `true` when the channel was registered.
    pub fn disconnect(&self, id: ChannelId) -> bool {
        let removed = self
            .channels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        if removed {
            debug!(channel = %id, "live channel disconnected");
        }
        removed
    }

    /// Returns the number of registered channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Sends an event to every registered channel.
    ///
    /// Never fails: closed channels are evicted after the pass and lagging
    /// channels simply miss the event.
    ///
    /// Only a closed channel counts as a failed receiver. A channel whose
    /// outbox is full stays registered, so a briefly slow viewer keeps its
    /// connection and resumes with later events.
    pub async fn broadcast(&self, event: &BoardEvent) -> BroadcastReport {
        let frame = match serde_json::to_string(event) {
            Ok(frame) => frame,
            Err(err) => {
                warn!(event = event.type_tag(), error = %err, "failed to serialise board event");
                return BroadcastReport::default();
            }
        };

        let snapshot: Vec<(ChannelId, Arc<dyn LiveChannel>)> = self
            .channels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(id, channel)| (*id, Arc::clone(channel)))
            .collect();

        let outcomes = join_all(snapshot.iter().map(|(id, channel)| {
            let frame_ref = frame.as_str();
            async move { (*id, channel.send(frame_ref).await) }
        }))
        .await;

        let mut report = BroadcastReport::default();
        let mut closed = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(()) => report.delivered += 1,
                Err(LiveChannelError::Lagged) => {
                    debug!(channel = %id, event = event.type_tag(), "live channel lagging");
                    report.lagged += 1;
                }
                Err(LiveChannelError::Closed) => closed.push(id),
            }
        }

        if !closed.is_empty() {
            let mut channels = self
                .channels
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            for id in &closed {
                if channels.remove(id).is_some() {
                    report.evicted += 1;
                    debug!(channel = %id, "evicted closed live channel");
                }
            }
        }
        report
    }
}
