// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: configuration, startup, exclusivity.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use fs2::FileExt;
use harbor_engine::{KernelConfig, Reaper, SystemKernel};
use harbor_storage::Store;
use thiserror::Error;
use tracing::info;

use crate::env;

/// Default loopback bind port.
pub const DEFAULT_BIND_PORT: u16 = 9876;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/harbor)
    pub state_dir: PathBuf,
    /// Path to the SQLite database file
    pub db_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Loopback port the HTTP surface binds
    pub bind_port: u16,
    /// Kernel tunables (after env overrides)
    pub kernel: KernelConfig,
}

/// Errors from startup and shutdown.
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("no usable state directory")]
    NoStateDir,

    #[error("failed to acquire daemon lock: {0}")]
    LockFailed(String),

    #[error("store error: {0}")]
    Store(#[from] harbor_storage::StorageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Config {
    /// Load configuration: fixed paths under the state dir, environment
    /// overrides on top of the kernel defaults.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = state_dir()?;
        Ok(Self::at(state_dir))
    }

    /// Build a config rooted at an explicit state directory (tests).
    pub fn at(state_dir: PathBuf) -> Self {
        let mut kernel = KernelConfig::default();
        if let Some(range) = env::port_range() {
            kernel.port_range = range;
        }
        if let Some(agent_id) = env::default_agent_id() {
            kernel.default_agent_id = agent_id;
        }
        if let Some(period) = env::reaper_period_ms() {
            kernel.reaper_period_ms = period;
        }
        let bind_port = env::bind_port().unwrap_or(DEFAULT_BIND_PORT);
        // The daemon's own port is never handed out.
        if !kernel.reserved_ports.contains(&bind_port) {
            kernel.reserved_ports.push(bind_port);
        }

        Self {
            db_path: env::db_path().unwrap_or_else(|| state_dir.join("harbor.db")),
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            bind_port,
            kernel,
            state_dir,
        }
    }
}

/// Resolve `$XDG_STATE_HOME/harbor` or `~/.local/state/harbor`.
fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        if !xdg.is_empty() {
            return Ok(PathBuf::from(xdg).join("harbor"));
        }
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/harbor"))
}

/// Everything startup produces.
pub struct StartupResult {
    pub kernel: Arc<SystemKernel>,
    pub reaper: Arc<Reaper>,
    // NOTE(lifetime): Held to maintain the exclusive daemon lock; released on drop
    pub lock_file: File,
}

/// Start the daemon: take the exclusive lock, open the store, build the
/// kernel and reaper.
pub fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    std::fs::create_dir_all(&config.state_dir)?;

    let mut lock_file = File::options()
        .create(true)
        .read(true)
        .write(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file
        .try_lock_exclusive()
        .map_err(|e| LifecycleError::LockFailed(e.to_string()))?;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;

    let store = Arc::new(Store::open(&config.db_path)?);
    let kernel = Arc::new(SystemKernel::system(store, config.kernel.clone()));
    let reaper = Arc::new(Reaper::new(Arc::clone(&kernel)));

    info!(
        db = %config.db_path.display(),
        port = config.bind_port,
        "daemon state ready"
    );

    Ok(StartupResult {
        kernel,
        reaper,
        lock_file,
    })
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
