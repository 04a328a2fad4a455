// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Local DNS advertisement contract.
//!
//! The advertiser derives a `.local` hostname from the identity and stores
//! it via `setEndpoint`; mDNS plumbing is its own concern.

use async_trait::async_trait;
use harbor_core::Identity;
use thiserror::Error;

/// Errors from DNS advertisement.
#[derive(Debug, Error)]
pub enum DnsError {
    #[error("advertise failed: {0}")]
    Advertise(String),
}

/// Advertise a service under a derived local hostname.
#[async_trait]
pub trait DnsAdvertiser: Send + Sync + 'static {
    /// Advertise `identity` on `port`; returns the hostname used.
    async fn advertise(&self, identity: &Identity, port: u16) -> Result<String, DnsError>;
}

/// Derive the `.local` hostname for an identity.
///
/// `myapp` → `myapp.local`; deeper identities join segments with dashes:
/// `myapp:api` → `myapp-api.local`.
pub fn local_hostname(identity: &Identity) -> String {
    let mut name = identity.project().to_string();
    if let Some(stack) = identity.stack() {
        name.push('-');
        name.push_str(stack);
    }
    if let Some(context) = identity.context() {
        name.push('-');
        name.push_str(context);
    }
    format!("{}.local", name.to_ascii_lowercase())
}

/// Advertiser that derives hostnames without touching the network.
#[derive(Clone, Default)]
pub struct LocalHostnameAdvertiser;

#[async_trait]
impl DnsAdvertiser for LocalHostnameAdvertiser {
    async fn advertise(&self, identity: &Identity, _port: u16) -> Result<String, DnsError> {
        Ok(local_hostname(identity))
    }
}

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeDnsAdvertiser;

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    /// Recording advertiser.
    #[derive(Clone, Default)]
    pub struct FakeDnsAdvertiser {
        advertised: Arc<Mutex<Vec<(String, u16)>>>,
    }

    impl FakeDnsAdvertiser {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn advertised(&self) -> Vec<(String, u16)> {
            self.advertised.lock().clone()
        }
    }

    #[async_trait]
    impl DnsAdvertiser for FakeDnsAdvertiser {
        async fn advertise(&self, identity: &Identity, port: u16) -> Result<String, DnsError> {
            let hostname = local_hostname(identity);
            self.advertised.lock().push((hostname.clone(), port));
            Ok(hostname)
        }
    }
}

#[cfg(test)]
#[path = "dns_tests.rs"]
mod tests;
