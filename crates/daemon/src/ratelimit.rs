// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-source fixed-window rate limiting.
//!
//! SSE streams are capped separately in the subscriber registry; this
//! limiter covers the request/response endpoints.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Requests allowed per source per window.
pub const DEFAULT_LIMIT: u32 = 100;

/// Window length.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

struct Window {
    started: Instant,
    count: u32,
}

/// Fixed-window counter per source address.
pub struct RateLimiter {
    limit: u32,
    window: Duration,
    windows: Mutex<HashMap<String, Window>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_LIMIT, DEFAULT_WINDOW)
    }
}

impl RateLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            limit,
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Record one request from `source`; false means refuse with 429.
    pub fn allow(&self, source: &str, now: Instant) -> bool {
        let mut windows = self.windows.lock();

        // Drop stale windows opportunistically so the map stays bounded.
        if windows.len() > 1024 {
            let window = self.window;
            windows.retain(|_, w| now.duration_since(w.started) < window);
        }

        let entry = windows.entry(source.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(entry.started) >= self.window {
            entry.started = now;
            entry.count = 0;
        }
        if entry.count >= self.limit {
            return false;
        }
        entry.count += 1;
        true
    }
}

#[cfg(test)]
#[path = "ratelimit_tests.rs"]
mod tests;
