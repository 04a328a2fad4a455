// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Harbor daemon (harbord)
//!
//! Single-host coordination daemon: stable ports for services, leased
//! locks, pub/sub channels, agent liveness, and session salvage, all
//! backed by one SQLite file and served over loopback HTTP.

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tracing::{error, info};

use harbor_daemon::http::{self, AppState};
use harbor_daemon::lifecycle::{self, Config, LifecycleError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("harbord {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("harbord {}", env!("CARGO_PKG_VERSION"));
                println!("Harbor daemon - port registry, locks, pub/sub, and agent liveness");
                println!();
                println!("USAGE:");
                println!("    harbord");
                println!();
                println!("Listens on loopback HTTP (default port 9876). Configuration is");
                println!("taken from the environment:");
                println!("    HARBOR_PORT        bind port");
                println!("    HARBOR_DB_PATH     database file");
                println!("    HARBOR_PORT_RANGE  claim search range, e.g. 4000-4999");
                println!("    HARBOR_AGENT_ID    default agent id for implicit sessions");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: harbord [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    let config = Config::load()?;

    // Rotate the log file if it has grown too large
    rotate_log_if_needed(&config.log_path);

    let _log_guard = setup_logging(&config)?;

    info!("Starting harbor daemon");

    let startup = match lifecycle::startup(&config) {
        Ok(r) => r,
        Err(LifecycleError::LockFailed(_)) => {
            // Another daemon already owns this state dir.
            let pid = std::fs::read_to_string(&config.lock_path)
                .unwrap_or_default()
                .trim()
                .to_string();
            eprintln!("harbord is already running");
            if !pid.is_empty() {
                eprintln!("  pid: {pid}");
            }
            std::process::exit(1);
        }
        Err(e) => {
            error!("Failed to start daemon: {}", e);
            return Err(e.into());
        }
    };

    let shutdown = Arc::new(Notify::new());

    // Spawn the reaper loop
    tokio::spawn(Arc::clone(&startup.reaper).run(Arc::clone(&shutdown)));

    // Spawn the webhook forwarder. No deliverer is configured by default;
    // the NoOp deliverer keeps the seam wired without network traffic.
    let forwarder = harbor_daemon::WebhookForwarder::new(
        Arc::clone(&startup.kernel),
        Arc::new(harbor_adapters::NoOpWebhookDeliverer),
    );
    tokio::spawn(forwarder.run(Arc::clone(&shutdown)));

    // Bind the HTTP surface on loopback only
    let state = AppState::new(
        Arc::clone(&startup.kernel),
        Arc::clone(&startup.reaper),
        config.bind_port,
    );
    let router = http::router(state);
    let addr = SocketAddr::V4(SocketAddrV4::new(Ipv4Addr::LOCALHOST, config.bind_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Daemon ready, listening on http://{addr}");

    // Signal ready for parent process (e.g. CLI waiting for startup)
    println!("READY");

    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    let server = axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown({
        let shutdown = Arc::clone(&shutdown);
        async move { shutdown.notified().await }
    });

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                error!("Server error: {}", e);
            }
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
            shutdown.notify_waiters();
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
            shutdown.notify_waiters();
        }
    }

    // The lock file releases on drop.
    drop(startup);
    info!("Daemon stopped");
    Ok(())
}

/// Maximum log file size before rotation (10 MB).
const MAX_LOG_SIZE: u64 = 10 * 1024 * 1024;

/// Number of rotated log files to keep (daemon.log.1, .2, .3).
const MAX_ROTATED_LOGS: u32 = 3;

/// Rotate the daemon log file if it exceeds [`MAX_LOG_SIZE`].
///
/// Shifts `daemon.log` → `daemon.log.1` → `daemon.log.2` → `daemon.log.3`,
/// deleting the oldest. Best-effort: rotation failures are silently ignored
/// so the daemon still starts.
fn rotate_log_if_needed(log_path: &std::path::Path) {
    let size = match std::fs::metadata(log_path) {
        Ok(m) => m.len(),
        Err(_) => return,
    };

    if size < MAX_LOG_SIZE {
        return;
    }

    let log_str = log_path.display().to_string();

    for i in (1..MAX_ROTATED_LOGS).rev() {
        let from = format!("{log_str}.{i}");
        let to = format!("{log_str}.{}", i + 1);
        let _ = std::fs::rename(&from, &to);
    }

    let _ = std::fs::rename(log_path, format!("{log_str}.1"));
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
