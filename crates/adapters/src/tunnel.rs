// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tunnel-supervisor contract.
//!
//! The supervisor spawns provider subprocesses and reports the public URL
//! back through `setEndpoint`; the daemon only sees this seam.

use async_trait::async_trait;
use harbor_core::Identity;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from tunnel operations.
#[derive(Debug, Error)]
pub enum TunnelError {
    #[error("provider failed: {0}")]
    Provider(String),
    #[error("no tunnel open for {0}")]
    NotOpen(String),
}

/// A live tunnel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TunnelEndpoint {
    pub identity: Identity,
    pub local_port: u16,
    /// Public URL, stored under the "tunnel" endpoint tag.
    pub url: String,
}

/// Supervise tunnel subprocesses for services.
#[async_trait]
pub trait TunnelSupervisor: Send + Sync + 'static {
    /// Open a tunnel for a local port; resolves once the provider reports
    /// its public URL.
    async fn open(&self, identity: &Identity, local_port: u16)
        -> Result<TunnelEndpoint, TunnelError>;

    /// Tear a tunnel down.
    async fn close(&self, identity: &Identity) -> Result<(), TunnelError>;
}

/// Supervisor that refuses every tunnel; for daemons without a provider.
#[derive(Clone, Default)]
pub struct NoOpTunnelSupervisor;

#[async_trait]
impl TunnelSupervisor for NoOpTunnelSupervisor {
    async fn open(
        &self,
        _identity: &Identity,
        _local_port: u16,
    ) -> Result<TunnelEndpoint, TunnelError> {
        Err(TunnelError::Provider("no tunnel provider configured".into()))
    }

    async fn close(&self, identity: &Identity) -> Result<(), TunnelError> {
        Err(TunnelError::NotOpen(identity.to_string()))
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTunnelSupervisor;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;

    /// Recording supervisor handing out deterministic URLs.
    #[derive(Clone, Default)]
    pub struct FakeTunnelSupervisor {
        open: Arc<Mutex<HashMap<String, TunnelEndpoint>>>,
    }

    impl FakeTunnelSupervisor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn open_count(&self) -> usize {
            self.open.lock().len()
        }
    }

    #[async_trait]
    impl TunnelSupervisor for FakeTunnelSupervisor {
        async fn open(
            &self,
            identity: &Identity,
            local_port: u16,
        ) -> Result<TunnelEndpoint, TunnelError> {
            let endpoint = TunnelEndpoint {
                identity: identity.clone(),
                local_port,
                url: format!("https://{}.tunnel.test", identity.project()),
            };
            self.open
                .lock()
                .insert(identity.to_string(), endpoint.clone());
            Ok(endpoint)
        }

        async fn close(&self, identity: &Identity) -> Result<(), TunnelError> {
            self.open
                .lock()
                .remove(&identity.to_string())
                .map(|_| ())
                .ok_or_else(|| TunnelError::NotOpen(identity.to_string()))
        }
    }
}

#[cfg(test)]
#[path = "tunnel_tests.rs"]
mod tests;
