// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pub/sub: durable channel history plus live fan-out.
//!
//! Publish commits the row first, then delivers to subscribers from the
//! committed record, so every subscriber observes the same ids in the same
//! order and a crash between the two steps only ever loses delivery, not
//! history.

use harbor_core::{
    validate_channel, ChannelInfo, Clock, IdGen, KernelError, MessageRecord,
};
use serde::Serialize;
use tokio::time::{timeout, Duration, Instant};
use tracing::debug;

use crate::kernel::Kernel;
use crate::subscribers::SubscriberHandle;

/// Result of a publish.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReceipt {
    pub id: i64,
    /// Subscribers the message was handed to synchronously.
    pub delivered: usize,
}

/// Default history page size.
pub const DEFAULT_HISTORY_LIMIT: u32 = 100;

impl<C: Clock, I: IdGen> Kernel<C, I> {
    /// Append to the channel log and fan out to live subscribers.
    pub fn publish(
        &self,
        channel: &str,
        payload: &str,
        sender: Option<&str>,
    ) -> Result<PublishReceipt, KernelError> {
        validate_channel(channel)?;
        if payload.len() > self.config().max_payload_bytes {
            return Err(KernelError::PayloadTooLarge {
                limit: self.config().max_payload_bytes,
            });
        }

        let now = self.now();
        let id = self.store().append_message(channel, payload, sender, now)?;
        let record = MessageRecord {
            id,
            channel: channel.to_string(),
            payload: payload.to_string(),
            sender: sender.map(String::from),
            created_at: now,
        };

        let delivered = self.subscribers().fanout(channel, &record);
        self.subscribers().notify(channel);
        self.metrics().incr_messages_published();
        debug!(channel, id, delivered, "published");
        self.record_activity(
            "message",
            "publish",
            channel,
            Some(serde_json::json!({ "id": id, "delivered": delivered })),
            sender,
        );

        Ok(PublishReceipt { id, delivered })
    }

    /// Stored history in id order. `since` is an exclusive id lower bound.
    pub fn history(
        &self,
        channel: &str,
        limit: Option<u32>,
        since: Option<i64>,
    ) -> Result<Vec<MessageRecord>, KernelError> {
        validate_channel(channel)?;
        let limit = limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
        Ok(self
            .store()
            .get_messages(channel, limit, since.unwrap_or(0))?)
    }

    /// History that waits: when nothing is newer than `since`, block up to
    /// `wait_ms` (clamped by config) for the next publication.
    pub async fn poll_history(
        &self,
        channel: &str,
        limit: Option<u32>,
        since: i64,
        wait_ms: u64,
    ) -> Result<Vec<MessageRecord>, KernelError> {
        validate_channel(channel)?;
        let wait = Duration::from_millis(wait_ms.min(self.config().poll_wait_max_ms));
        let deadline = Instant::now() + wait;

        loop {
            let notify = self.subscribers().notifier(channel);
            let notified = notify.notified();
            tokio::pin!(notified);

            // Check after arming the notification so a publish between the
            // read and the wait still wakes us.
            let messages = self.history(channel, limit, Some(since))?;
            if !messages.is_empty() {
                return Ok(messages);
            }

            let now = Instant::now();
            if now >= deadline {
                return Ok(Vec::new());
            }
            let _ = timeout(deadline - now, notified).await;
        }
    }

    /// Distinct channels with counts and last-message times.
    pub fn channels(&self) -> Result<Vec<ChannelInfo>, KernelError> {
        Ok(self.store().list_channels()?)
    }

    /// Drop a channel's stored history; live subscribers stay attached.
    pub fn clear_channel(&self, channel: &str) -> Result<u64, KernelError> {
        validate_channel(channel)?;
        let cleared = self.store().clear_channel(channel)?;
        self.record_activity(
            "message",
            "clear",
            channel,
            Some(serde_json::json!({ "cleared": cleared })),
            None,
        );
        Ok(cleared)
    }

    /// Attach a live subscriber (one SSE stream).
    pub fn subscribe(
        &self,
        channel: &str,
        source: &str,
    ) -> Result<SubscriberHandle, KernelError> {
        validate_channel(channel)?;
        self.subscribers().subscribe(channel, source)
    }
}

#[cfg(test)]
#[path = "messaging_tests.rs"]
mod tests;
