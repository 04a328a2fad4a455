// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory subscriber registry.
//!
//! This is the only shared mutable state outside the database. Critical
//! sections are limited to add, remove, and snapshot; fan-out delivery
//! happens on the snapshot, outside the lock. A subscriber whose queue is
//! full is evicted and its queue dropped — slow consumers never stall a
//! publish.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use harbor_core::{KernelError, MessageRecord};
use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::metrics::Metrics;

struct Subscriber {
    id: u64,
    source: String,
    tx: mpsc::Sender<MessageRecord>,
}

#[derive(Default)]
struct Inner {
    by_channel: HashMap<String, Vec<Subscriber>>,
    per_source: HashMap<String, usize>,
}

/// Registry of live subscribers keyed by channel.
pub struct SubscriberRegistry {
    queue_max: usize,
    per_source_max: usize,
    next_id: AtomicU64,
    inner: Mutex<Inner>,
    notifiers: Mutex<HashMap<String, Arc<Notify>>>,
    metrics: Metrics,
}

impl SubscriberRegistry {
    pub fn new(queue_max: usize, per_source_max: usize, metrics: Metrics) -> Arc<Self> {
        Arc::new(Self {
            queue_max,
            per_source_max,
            next_id: AtomicU64::new(1),
            inner: Mutex::new(Inner::default()),
            notifiers: Mutex::new(HashMap::new()),
            metrics,
        })
    }

    /// Attach a subscriber to a channel.
    ///
    /// Refused with Capacity when the source address already holds the
    /// maximum number of streams.
    pub fn subscribe(
        self: &Arc<Self>,
        channel: &str,
        source: &str,
    ) -> Result<SubscriberHandle, KernelError> {
        let (tx, rx) = mpsc::channel(self.queue_max);
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);

        {
            let mut inner = self.inner.lock();
            let held = inner.per_source.get(source).copied().unwrap_or(0);
            if held >= self.per_source_max {
                self.metrics.incr_sse_rejected();
                return Err(KernelError::capacity(format!(
                    "subscriber limit reached for {} ({} streams)",
                    source, self.per_source_max
                )));
            }
            *inner.per_source.entry(source.to_string()).or_insert(0) += 1;
            inner
                .by_channel
                .entry(channel.to_string())
                .or_default()
                .push(Subscriber {
                    id,
                    source: source.to_string(),
                    tx,
                });
        }

        self.metrics.incr_subscribers_connected();
        debug!(channel, source, id, "subscriber attached");

        Ok(SubscriberHandle {
            guard: SubscriberGuard {
                registry: Arc::clone(self),
                channel: channel.to_string(),
                id,
            },
            rx,
        })
    }

    /// Deliver a message to every live subscriber of `channel`.
    ///
    /// Returns the number of deliveries attempted. Subscribers with a full
    /// or closed queue are removed; full queues count as evictions.
    pub fn fanout(&self, channel: &str, message: &MessageRecord) -> usize {
        // Snapshot under the lock, deliver outside it.
        let snapshot: Vec<(u64, mpsc::Sender<MessageRecord>)> = {
            let inner = self.inner.lock();
            match inner.by_channel.get(channel) {
                Some(subs) => subs.iter().map(|s| (s.id, s.tx.clone())).collect(),
                None => Vec::new(),
            }
        };

        let mut delivered = 0;
        for (id, tx) in snapshot {
            match tx.try_send(message.clone()) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(channel, id, "subscriber queue full, evicting");
                    self.metrics.incr_subscribers_evicted();
                    self.remove(channel, id);
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    self.remove(channel, id);
                }
            }
        }
        delivered
    }

    /// Per-channel notifier used by history polls.
    pub fn notifier(&self, channel: &str) -> Arc<Notify> {
        Arc::clone(
            self.notifiers
                .lock()
                .entry(channel.to_string())
                .or_insert_with(|| Arc::new(Notify::new())),
        )
    }

    /// Wake any pollers waiting on `channel`.
    pub fn notify(&self, channel: &str) {
        if let Some(notify) = self.notifiers.lock().get(channel) {
            notify.notify_waiters();
        }
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.inner
            .lock()
            .by_channel
            .get(channel)
            .map_or(0, Vec::len)
    }

    fn remove(&self, channel: &str, id: u64) {
        let mut inner = self.inner.lock();
        let Some(subs) = inner.by_channel.get_mut(channel) else {
            return;
        };
        let Some(pos) = subs.iter().position(|s| s.id == id) else {
            return;
        };
        let sub = subs.swap_remove(pos);
        if subs.is_empty() {
            inner.by_channel.remove(channel);
        }
        if let Some(count) = inner.per_source.get_mut(&sub.source) {
            *count -= 1;
            if *count == 0 {
                inner.per_source.remove(&sub.source);
            }
        }
    }
}

/// A live subscription; detaches from the registry on drop.
pub struct SubscriberHandle {
    guard: SubscriberGuard,
    rx: mpsc::Receiver<MessageRecord>,
}

impl std::fmt::Debug for SubscriberHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberHandle")
            .field("channel", &self.guard.channel)
            .finish()
    }
}

impl SubscriberHandle {
    /// Receive the next delivered message; `None` after eviction.
    pub async fn recv(&mut self) -> Option<MessageRecord> {
        self.rx.recv().await
    }

    pub fn channel(&self) -> &str {
        &self.guard.channel
    }

    /// Split into the registration guard and the raw queue, for callers
    /// that need an owned receiver (the SSE pump).
    pub fn into_parts(self) -> (SubscriberGuard, mpsc::Receiver<MessageRecord>) {
        (self.guard, self.rx)
    }
}

/// Keeps the registration alive; dropping it detaches the subscriber.
pub struct SubscriberGuard {
    registry: Arc<SubscriberRegistry>,
    channel: String,
    id: u64,
}

impl Drop for SubscriberGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.channel, self.id);
    }
}

#[cfg(test)]
#[path = "subscribers_tests.rs"]
mod tests;
