// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identity parsing and pattern matching.
//!
//! An identity is the colon-delimited naming key `project[:stack[:context]]`
//! used everywhere a resource needs a stable handle: services, sessions,
//! changelog entries, DNS names. Segments are limited to `[A-Za-z0-9._-]`.
//! Wildcard forms ([`IdentityPattern`]) are accepted in queries only.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::KernelError;

/// Maximum total length of an identity string.
pub const MAX_IDENTITY_LEN: usize = 256;

/// Maximum number of colon-separated segments.
pub const MAX_SEGMENTS: usize = 3;

/// A validated `project[:stack[:context]]` identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    segments: Vec<String>,
}

impl Identity {
    /// Parse and validate an identity string.
    pub fn parse(s: &str) -> Result<Self, KernelError> {
        if s.is_empty() {
            return Err(KernelError::validation("identity must not be empty"));
        }
        if s.len() > MAX_IDENTITY_LEN {
            return Err(KernelError::validation(format!(
                "identity exceeds {} characters",
                MAX_IDENTITY_LEN
            )));
        }
        let segments: Vec<&str> = s.split(':').collect();
        if segments.len() > MAX_SEGMENTS {
            return Err(KernelError::validation(format!(
                "identity '{}' has more than {} segments",
                s, MAX_SEGMENTS
            )));
        }
        for seg in &segments {
            if seg.is_empty() {
                return Err(KernelError::validation(format!(
                    "identity '{}' contains an empty segment",
                    s
                )));
            }
            if !seg.chars().all(is_segment_char) {
                return Err(KernelError::validation(format!(
                    "identity segment '{}' contains invalid characters",
                    seg
                )));
            }
        }
        Ok(Self {
            segments: segments.into_iter().map(String::from).collect(),
        })
    }

    /// The first segment (always present).
    pub fn project(&self) -> &str {
        &self.segments[0]
    }

    /// The second segment, if present.
    pub fn stack(&self) -> Option<&str> {
        self.segments.get(1).map(String::as_str)
    }

    /// The third segment, if present.
    pub fn context(&self) -> Option<&str> {
        self.segments.get(2).map(String::as_str)
    }

    /// Number of segments (1 to 3).
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// True when `self` is `other` or an ancestor of `other`.
    ///
    /// `a` is an ancestor of `a:b` and `a:b:c`; `a:b` of `a:b:c`.
    /// Used for changelog rollups.
    pub fn is_ancestor_of(&self, other: &Identity) -> bool {
        self.segments.len() <= other.segments.len()
            && self
                .segments
                .iter()
                .zip(other.segments.iter())
                .all(|(a, b)| a == b)
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(":"))
    }
}

impl FromStr for Identity {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Identity {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Identity {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Identity::parse(&s).map_err(serde::de::Error::custom)
    }
}

fn is_segment_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_'
}

fn is_pattern_char(c: char) -> bool {
    is_segment_char(c) || c == '*'
}

/// A query pattern over identities, with shell-style `*` per segment.
///
/// `myapp:*` matches `myapp:api` and (because the trailing segment is a bare
/// `*`) any deeper identity such as `myapp:api:dev`. `my*:api` matches
/// `myapp:api` but not `myapp:api:dev`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentityPattern {
    segments: Vec<String>,
}

impl IdentityPattern {
    /// Parse and validate a pattern string.
    pub fn parse(s: &str) -> Result<Self, KernelError> {
        if s.is_empty() {
            return Err(KernelError::validation("pattern must not be empty"));
        }
        if s.len() > MAX_IDENTITY_LEN {
            return Err(KernelError::validation(format!(
                "pattern exceeds {} characters",
                MAX_IDENTITY_LEN
            )));
        }
        let segments: Vec<&str> = s.split(':').collect();
        if segments.len() > MAX_SEGMENTS {
            return Err(KernelError::validation(format!(
                "pattern '{}' has more than {} segments",
                s, MAX_SEGMENTS
            )));
        }
        for seg in &segments {
            if seg.is_empty() {
                return Err(KernelError::validation(format!(
                    "pattern '{}' contains an empty segment",
                    s
                )));
            }
            if !seg.chars().all(is_pattern_char) {
                return Err(KernelError::validation(format!(
                    "pattern segment '{}' contains invalid characters",
                    seg
                )));
            }
        }
        Ok(Self {
            segments: segments.into_iter().map(String::from).collect(),
        })
    }

    /// True when the pattern contains any wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.segments.iter().any(|s| s.contains('*'))
    }

    /// Match against a concrete identity.
    pub fn matches(&self, identity: &Identity) -> bool {
        let id_segments: Vec<&str> = [
            Some(identity.project()),
            identity.stack(),
            identity.context(),
        ]
        .into_iter()
        .flatten()
        .collect();

        // A trailing bare "*" segment also swallows deeper segments.
        let trailing_glob = self.segments.last().map(String::as_str) == Some("*");

        if id_segments.len() < self.segments.len() {
            return false;
        }
        if id_segments.len() > self.segments.len() && !trailing_glob {
            return false;
        }
        self.segments
            .iter()
            .zip(id_segments.iter())
            .all(|(pat, seg)| glob_match(pat, seg))
    }
}

impl fmt::Display for IdentityPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.segments.join(":"))
    }
}

impl FromStr for IdentityPattern {
    type Err = KernelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Match a single segment against a `*`-glob, iteratively.
fn glob_match(pattern: &str, text: &str) -> bool {
    let pat: Vec<char> = pattern.chars().collect();
    let txt: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0usize, 0usize);
    let mut star: Option<(usize, usize)> = None;

    while t < txt.len() {
        if p < pat.len() && (pat[p] == txt[t]) {
            p += 1;
            t += 1;
        } else if p < pat.len() && pat[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((sp, st)) = star {
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }
    while p < pat.len() && pat[p] == '*' {
        p += 1;
    }
    p == pat.len()
}

#[cfg(test)]
#[path = "identity_tests.rs"]
mod tests;
