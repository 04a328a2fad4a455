// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Webhook delivery contract.
//!
//! The deliverer subscribes to a curated set of activity events and POSTs
//! them out signed; retry and backoff live on its side of the seam.

use async_trait::async_trait;
use harbor_core::ActivityEntry;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from webhook delivery.
#[derive(Debug, Error)]
pub enum WebhookError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Actions forwarded to webhooks by default. Everything else stays local.
pub const DEFAULT_FORWARDED_ACTIONS: &[&str] = &[
    "claim",
    "release",
    "agent.dead",
    "session.end",
    "publish",
];

/// An activity entry packaged for outbound delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    pub action: String,
    pub target: String,
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl From<&ActivityEntry> for WebhookEvent {
    fn from(entry: &ActivityEntry) -> Self {
        Self {
            action: entry.action.clone(),
            target: entry.target.clone(),
            created_at: entry.created_at,
            agent_id: entry.agent_id.clone(),
            details: entry.details.clone(),
        }
    }
}

/// Deliver activity events to registered webhooks.
#[async_trait]
pub trait WebhookDeliverer: Send + Sync + 'static {
    /// True when this deliverer wants the action at all.
    fn wants(&self, action: &str) -> bool {
        DEFAULT_FORWARDED_ACTIONS.contains(&action)
    }

    /// Deliver one event; errors are the deliverer's to retry.
    async fn deliver(&self, event: &WebhookEvent) -> Result<(), WebhookError>;
}

/// Deliverer that drops everything; for daemons without webhooks.
#[derive(Clone, Default)]
pub struct NoOpWebhookDeliverer;

#[async_trait]
impl WebhookDeliverer for NoOpWebhookDeliverer {
    fn wants(&self, _action: &str) -> bool {
        false
    }

    async fn deliver(&self, _event: &WebhookEvent) -> Result<(), WebhookError> {
        Ok(())
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWebhookDeliverer;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recording deliverer.
    #[derive(Clone, Default)]
    pub struct FakeWebhookDeliverer {
        delivered: Arc<Mutex<Vec<WebhookEvent>>>,
    }

    impl FakeWebhookDeliverer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn delivered(&self) -> Vec<WebhookEvent> {
            self.delivered.lock().clone()
        }
    }

    #[async_trait]
    impl WebhookDeliverer for FakeWebhookDeliverer {
        async fn deliver(&self, event: &WebhookEvent) -> Result<(), WebhookError> {
            self.delivered.lock().push(event.clone());
            Ok(())
        }
    }
}

#[cfg(test)]
#[path = "webhook_tests.rs"]
mod tests;
