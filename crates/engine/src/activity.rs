// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Activity log reads. Writes happen through `Kernel::record_activity`,
//! called by every mutating operation.

use std::collections::BTreeMap;

use harbor_core::{ActivityEntry, Clock, IdGen, KernelError};
use harbor_storage::{ActivityQuery, ActivityStats};

use crate::kernel::Kernel;

/// Default page size for activity reads.
pub const DEFAULT_ACTIVITY_LIMIT: u32 = 100;

impl<C: Clock, I: IdGen> Kernel<C, I> {
    /// Query the audit log, newest-first.
    pub fn activity(&self, query: &ActivityQuery<'_>) -> Result<Vec<ActivityEntry>, KernelError> {
        Ok(self.store().list_activity(query)?)
    }

    /// Entry counts by type over the trailing `window_ms`.
    pub fn activity_summary(
        &self,
        window_ms: i64,
    ) -> Result<BTreeMap<String, i64>, KernelError> {
        let from = self.now().saturating_sub(window_ms);
        Ok(self.store().activity_summary(from)?)
    }

    /// Whole-log aggregates.
    pub fn activity_stats(&self) -> Result<ActivityStats, KernelError> {
        Ok(self.store().activity_stats()?)
    }
}

#[cfg(test)]
#[path = "activity_tests.rs"]
mod tests;
