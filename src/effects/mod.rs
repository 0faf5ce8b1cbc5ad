//! Detached follow-up effects.
//!
//! Secondary work triggered by a board mutation (spawning an agent session,
//! notifying a session, waking the coordinator) runs here, off the request
//! path. Each effect is time-bounded; failures are logged and kept in a
//! bounded failure log instead of reaching the caller.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

/// Default bound on a single effect.
pub const DEFAULT_EFFECT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of failures retained.
pub const DEFAULT_FAILURE_CAPACITY: usize = 100;

/// A recorded effect failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectFailure {
    /// Unique failure identifier.
    pub id: Uuid,
    /// Label supplied when the effect was scheduled.
    pub label: String,
    /// Failure description.
    pub reason: String,
    /// Time the failure was observed.
    pub failed_at: DateTime<Utc>,
}

/// Runner for fire-and-forget effects with a bounded failure log.
#[derive(Debug)]
pub struct DetachedEffects {
    timeout: Duration,
    capacity: usize,
    failures: Arc<Mutex<VecDeque<EffectFailure>>>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl Default for DetachedEffects {
    fn default() -> Self {
        Self::new(DEFAULT_EFFECT_TIMEOUT, DEFAULT_FAILURE_CAPACITY)
    }
}

impl DetachedEffects {
    /// Creates a runner with the given per-effect bound and failure capacity.
    #[must_use]
    pub fn new(timeout: Duration, capacity: usize) -> Self {
        Self {
            timeout,
            capacity: capacity.max(1),
            failures: Arc::new(Mutex::new(VecDeque::new())),
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Schedules an effect on the runtime and returns immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn spawn<F, E>(&self, label: impl Into<String>, effect: F)
    where
        F: Future<Output = Result<(), E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        let effect_label = label.into();
        let timeout = self.timeout;
        let capacity = self.capacity;
        let failures = Arc::clone(&self.failures);

        let handle = tokio::spawn(async move {
            let reason = match tokio::time::timeout(timeout, effect).await {
                Ok(Ok(())) => {
                    debug!(effect = %effect_label, "detached effect completed");
                    return;
                }
                Ok(Err(err)) => err.to_string(),
                Err(_) => format!("timed out after {timeout:?}"),
            };
            warn!(effect = %effect_label, %reason, "detached effect failed");
            let mut log = failures.lock().unwrap_or_else(PoisonError::into_inner);
            if log.len() >= capacity {
                log.pop_front();
            }
            log.push_back(EffectFailure {
                id: Uuid::new_v4(),
                label: effect_label,
                reason,
                failed_at: Utc::now(),
            });
        });

        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.retain(|task| !task.is_finished());
        pending.push(handle);
    }

    /// Waits until every scheduled effect, including effects scheduled by
    /// other effects, has finished.
    pub async fn settle(&self) {
        loop {
            let batch: Vec<JoinHandle<()>> = {
                let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
                pending.drain(..).collect()
            };
            if batch.is_empty() {
                return;
            }
            for handle in batch {
                if let Err(err) = handle.await {
                    warn!(error = %err, "detached effect panicked or was cancelled");
                }
            }
        }
    }

    /// Returns the retained failures, oldest first.
    #[must_use]
    pub fn failures(&self) -> Vec<EffectFailure> {
        self.failures
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn failures_are_recorded_not_propagated() {
        let effects = DetachedEffects::default();
        effects.spawn("always-fails", async { Err::<(), _>("gateway down") });
        effects.spawn("succeeds", async { Ok::<(), String>(()) });

        effects.settle().await;

        let failures = effects.failures();
        assert_eq!(failures.len(), 1);
        let failure = failures.first().expect("one failure");
        assert_eq!(failure.label, "always-fails");
        assert_eq!(failure.reason, "gateway down");
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn slow_effects_time_out() {
        let effects = DetachedEffects::new(Duration::from_millis(10), 4);
        effects.spawn("slow", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<(), String>(())
        });

        effects.settle().await;

        let failures = effects.failures();
        assert_eq!(failures.len(), 1);
        assert!(
            failures
                .first()
                .is_some_and(|failure| failure.reason.starts_with("timed out"))
        );
    }

    #[rstest]
    #[tokio::test(flavor = "multi_thread")]
    async fn failure_log_is_bounded() {
        let effects = DetachedEffects::new(DEFAULT_EFFECT_TIMEOUT, 2);
        for index in 0..3 {
            effects.spawn(format!("effect-{index}"), async move {
                Err::<(), _>(format!("failure {index}"))
            });
            effects.settle().await;
        }

        let labels: Vec<String> = effects
            .failures()
            .into_iter()
            .map(|failure| failure.label)
            .collect();
        assert_eq!(labels, vec!["effect-1".to_owned(), "effect-2".to_owned()]);
    }
}
