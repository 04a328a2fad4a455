// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! OS probes: process liveness and port occupancy.
//!
//! Pid liveness uses `kill(pid, 0)` and is never cached. Port occupancy is
//! checked with a loopback bind attempt and cached briefly, since claim
//! scans may touch hundreds of ports in one request.

use std::collections::HashMap;
use std::collections::HashSet;
use std::net::{Ipv4Addr, SocketAddrV4, TcpListener};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Probe for whether a pid refers to a live process.
pub trait ProcessProbe: Send + Sync + 'static {
    fn is_alive(&self, pid: u32) -> bool;
}

/// Real probe via `kill(pid, 0)`.
#[derive(Clone, Default)]
pub struct SystemProcessProbe;

impl ProcessProbe for SystemProcessProbe {
    fn is_alive(&self, pid: u32) -> bool {
        use nix::sys::signal;
        use nix::unistd::Pid;

        match signal::kill(Pid::from_raw(pid as i32), None) {
            Ok(()) => true,
            Err(nix::errno::Errno::ESRCH) => false,
            // EPERM means the process exists but belongs to someone else
            Err(nix::errno::Errno::EPERM) => true,
            Err(_) => false,
        }
    }
}

/// Test probe with an explicit set of live pids.
#[derive(Clone, Default)]
pub struct FakeProcessProbe {
    alive: Arc<Mutex<HashSet<u32>>>,
}

impl FakeProcessProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_alive(&self, pid: u32, alive: bool) {
        let mut set = self.alive.lock();
        if alive {
            set.insert(pid);
        } else {
            set.remove(&pid);
        }
    }
}

impl ProcessProbe for FakeProcessProbe {
    fn is_alive(&self, pid: u32) -> bool {
        self.alive.lock().contains(&pid)
    }
}

/// Probe for whether a local TCP port is already taken.
pub trait PortProbe: Send + Sync + 'static {
    fn is_listening(&self, port: u16) -> bool;
}

/// Real probe: a successful loopback bind means the port is free.
#[derive(Clone, Default)]
pub struct SystemPortProbe;

impl PortProbe for SystemPortProbe {
    fn is_listening(&self, port: u16) -> bool {
        TcpListener::bind(SocketAddrV4::new(Ipv4Addr::LOCALHOST, port)).is_err()
    }
}

/// Test probe with an explicit set of occupied ports.
#[derive(Clone, Default)]
pub struct FakePortProbe {
    listening: Arc<Mutex<HashSet<u16>>>,
}

impl FakePortProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_listening(&self, port: u16, listening: bool) {
        let mut set = self.listening.lock();
        if listening {
            set.insert(port);
        } else {
            set.remove(&port);
        }
    }
}

impl PortProbe for FakePortProbe {
    fn is_listening(&self, port: u16) -> bool {
        self.listening.lock().contains(&port)
    }
}

/// TTL cache in front of a [`PortProbe`].
pub struct PortScanCache {
    probe: Arc<dyn PortProbe>,
    ttl: Duration,
    entries: Mutex<HashMap<u16, (Instant, bool)>>,
}

impl PortScanCache {
    pub fn new(probe: Arc<dyn PortProbe>, ttl: Duration) -> Self {
        Self {
            probe,
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cached occupancy check.
    pub fn is_listening(&self, port: u16) -> bool {
        let now = Instant::now();
        {
            let entries = self.entries.lock();
            if let Some((at, result)) = entries.get(&port) {
                if now.duration_since(*at) < self.ttl {
                    return *result;
                }
            }
        }
        // Probe outside the lock; a duplicate probe under contention is fine.
        let result = self.probe.is_listening(port);
        self.entries.lock().insert(port, (now, result));
        result
    }

    /// Drop all cached results (tests and forced rescans).
    pub fn invalidate(&self) {
        self.entries.lock().clear();
    }
}

#[cfg(test)]
#[path = "probe_tests.rs"]
mod tests;
