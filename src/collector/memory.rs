// Physical memory usage

use super::{SourceError, gib, round1};
use crate::models::MemoryMetrics;
use sysinfo::System;

pub(super) struct MemorySource {
    sys: System,
}

impl MemorySource {
    pub(super) fn new() -> Self {
        Self { sys: System::new() }
    }

    pub(super) fn sample(&mut self) -> Result<MemoryMetrics, SourceError> {
        self.sys.refresh_memory();
        let total = self.sys.total_memory();
        if total == 0 {
            return Err(SourceError::Unavailable("total memory reported as 0".into()));
        }
        let used = total.saturating_sub(self.sys.available_memory());

        Ok(MemoryMetrics {
            usage_percent: round1(used as f64 / total as f64 * 100.0),
            used_gb: round1(gib(used)),
            total_gb: round1(gib(total)),
        })
    }
}
