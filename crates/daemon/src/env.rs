// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable parsing for daemon configuration.

use std::path::PathBuf;

/// Daemon bind port (`HARBOR_PORT`).
pub fn bind_port() -> Option<u16> {
    parse("HARBOR_PORT")
}

/// Database file path (`HARBOR_DB_PATH`).
pub fn db_path() -> Option<PathBuf> {
    std::env::var("HARBOR_DB_PATH").ok().map(PathBuf::from)
}

/// Port search range as "lo-hi" (`HARBOR_PORT_RANGE`).
pub fn port_range() -> Option<(u16, u16)> {
    let raw = std::env::var("HARBOR_PORT_RANGE").ok()?;
    parse_range(&raw)
}

/// Default agent id for implicit sessions (`HARBOR_AGENT_ID`).
pub fn default_agent_id() -> Option<String> {
    std::env::var("HARBOR_AGENT_ID")
        .ok()
        .filter(|s| !s.is_empty())
}

/// Reaper period override in ms (`HARBOR_REAPER_MS`).
pub fn reaper_period_ms() -> Option<u64> {
    parse("HARBOR_REAPER_MS")
}

fn parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok()?.trim().parse().ok()
}

/// Parse "lo-hi" into an ordered pair.
pub(crate) fn parse_range(raw: &str) -> Option<(u16, u16)> {
    let (lo, hi) = raw.split_once('-')?;
    let lo: u16 = lo.trim().parse().ok()?;
    let hi: u16 = hi.trim().parse().ok()?;
    (lo <= hi).then_some((lo, hi))
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
