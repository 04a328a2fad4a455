// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wall-clock access for the kernel.
//!
//! Every persisted timestamp — claims, leases, heartbeats, notes, audit
//! rows — lives on one scale: integer milliseconds since the Unix epoch,
//! matching the SQLite INTEGER columns they are compared against. The
//! trait is that scale's single read point, so lease expiry and staleness
//! derivation can be driven through a pinned clock in tests.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Source of the current epoch-millisecond timestamp.
pub trait Clock: Clone + Send + Sync + 'static {
    fn epoch_ms(&self) -> i64;
}

/// The real wall clock.
#[derive(Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn epoch_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as i64
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same timeline, so the fixture handle and the kernel
/// under test always agree on "now".
#[derive(Clone)]
pub struct FakeClock {
    epoch_ms: Arc<AtomicI64>,
}

/// Where a fresh [`FakeClock`] starts. Far enough from zero that
/// backdating a heartbeat past any threshold never goes negative.
const FAKE_EPOCH_START_MS: i64 = 1_700_000_000_000;

impl FakeClock {
    pub fn new() -> Self {
        Self::at(FAKE_EPOCH_START_MS)
    }

    /// Start the timeline at a specific millisecond.
    pub fn at(epoch_ms: i64) -> Self {
        Self {
            epoch_ms: Arc::new(AtomicI64::new(epoch_ms)),
        }
    }

    /// Step time forward.
    pub fn advance(&self, by: Duration) {
        self.epoch_ms
            .fetch_add(by.as_millis() as i64, Ordering::SeqCst);
    }

    /// Jump to an absolute millisecond.
    pub fn set_epoch_ms(&self, ms: i64) {
        self.epoch_ms.store(ms, Ordering::SeqCst);
    }
}

impl Default for FakeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for FakeClock {
    fn epoch_ms(&self) -> i64 {
        self.epoch_ms.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
