// CPU usage and clock frequency

use super::{SourceError, linux, round1};
use crate::models::CpuMetrics;
use std::time::Instant;
use sysinfo::System;

/// Used when neither /sys nor sysinfo report a maximum clock.
const FALLBACK_MAX_FREQ_GHZ: f64 = 5.0;

pub(super) struct CpuSource {
    sys: System,
    /// Last refresh time and usage; sysinfo needs a minimum interval between
    /// CPU refreshes to produce meaningful deltas.
    last_refresh: Option<(Instant, f64)>,
    max_frequency_ghz: f64,
}

impl CpuSource {
    pub(super) fn new() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu_all();
        let max_frequency_ghz = linux::read_cpu_max_freq_ghz().unwrap_or(FALLBACK_MAX_FREQ_GHZ);
        Self {
            sys,
            last_refresh: None,
            max_frequency_ghz,
        }
    }

    pub(super) fn sample(&mut self) -> Result<CpuMetrics, SourceError> {
        let now = Instant::now();
        let usage = match self.last_refresh {
            Some((prev_ts, prev_usage))
                if now.duration_since(prev_ts) < sysinfo::MINIMUM_CPU_UPDATE_INTERVAL =>
            {
                prev_usage
            }
            _ => {
                self.sys.refresh_cpu_all();
                let usage = self.sys.global_cpu_usage() as f64;
                self.last_refresh = Some((now, usage));
                usage
            }
        };

        let frequency_mhz = self
            .sys
            .cpus()
            .first()
            .map(|c| c.frequency())
            .ok_or_else(|| SourceError::Unavailable("no CPUs reported".into()))?;

        Ok(CpuMetrics {
            usage_percent: round1(usage.clamp(0.0, 100.0)),
            frequency_ghz: round1(frequency_mhz as f64 / 1000.0),
            max_frequency_ghz: round1(self.max_frequency_ghz),
        })
    }
}
