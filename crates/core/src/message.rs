// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel messages.
//!
//! Payloads are opaque to the kernel: stored and fanned out as the UTF-8
//! text the publisher sent, never parsed or validated.

use serde::{Deserialize, Serialize};

/// One stored publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    /// Monotonically increasing within the store (SQLite rowid).
    pub id: i64,
    pub channel: String,
    pub payload: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    pub created_at: i64,
}

/// Channel summary for enumeration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelInfo {
    pub channel: String,
    pub message_count: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<i64>,
}

/// Maximum length of a channel name.
pub const MAX_CHANNEL_LEN: usize = 128;

/// Validate a channel name: non-empty, limited charset, bounded length.
pub fn validate_channel(name: &str) -> Result<(), crate::error::KernelError> {
    if name.is_empty() {
        return Err(crate::error::KernelError::validation(
            "channel must not be empty",
        ));
    }
    if name.len() > MAX_CHANNEL_LEN {
        return Err(crate::error::KernelError::validation(format!(
            "channel exceeds {} characters",
            MAX_CHANNEL_LEN
        )));
    }
    let ok = name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '/'));
    if !ok {
        return Err(crate::error::KernelError::validation(format!(
            "channel '{}' contains invalid characters",
            name
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
