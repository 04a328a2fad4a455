//! Behavioral specifications for the harbor daemon.
//!
//! These tests drive the real router in-process against a temp-dir
//! database: the same code path a loopback HTTP client exercises, minus
//! the socket. See tests/specs/prelude.rs for the harness.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

#[path = "specs/prelude.rs"]
mod prelude;

// daemon/
#[path = "specs/daemon/locks.rs"]
mod daemon_locks;
#[path = "specs/daemon/pubsub.rs"]
mod daemon_pubsub;
#[path = "specs/daemon/salvage.rs"]
mod daemon_salvage;
#[path = "specs/daemon/services.rs"]
mod daemon_services;
#[path = "specs/daemon/sessions.rs"]
mod daemon_sessions;
