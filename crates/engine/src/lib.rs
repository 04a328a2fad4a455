// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! harbor-engine: the coordination kernel.
//!
//! One [`Kernel`] per process owns the store, the subscriber registry, and
//! the OS probes. Each component lives in its own module as an `impl` block
//! on the kernel; the [`reaper`] drives lifecycle transitions on a timer.

pub mod activity;
pub mod agents;
pub mod changelog;
pub mod config;
pub mod kernel;
pub mod locks;
pub mod messaging;
pub mod metrics;
pub mod ports;
pub mod probe;
pub mod reaper;
pub mod salvage;
pub mod sessions;
pub mod subscribers;

pub use agents::{AgentWithState, RegisterAgent, RegisterResult};
pub use changelog::RecordChange;
pub use config::KernelConfig;
pub use kernel::{Kernel, SystemKernel};
pub use locks::LockOptions;
pub use messaging::PublishReceipt;
pub use metrics::{Metrics, MetricsSnapshot};
pub use ports::{ClaimOptions, ClaimResult};
pub use probe::{
    FakePortProbe, FakeProcessProbe, PortProbe, PortScanCache, ProcessProbe, SystemPortProbe,
    SystemProcessProbe,
};
pub use reaper::{Reaper, SweepReport};
pub use sessions::{SessionDetail, StartSession, StartSessionResult};
pub use subscribers::{SubscriberGuard, SubscriberHandle, SubscriberRegistry};
