// Shared test helpers

use chrono::{TimeZone, Utc};
use std::collections::BTreeMap;
use sysmon::models::*;

pub fn minimal_snapshot(tick_ms: i64) -> MetricSnapshot {
    MetricSnapshot {
        timestamp: Utc.timestamp_millis_opt(tick_ms).unwrap(),
        cpu: Some(CpuMetrics {
            usage_percent: 12.5,
            frequency_ghz: 3.6,
            max_frequency_ghz: 5.0,
        }),
        memory: Some(MemoryMetrics {
            usage_percent: 50.0,
            used_gb: 8.0,
            total_gb: 16.0,
        }),
        gpu: None,
        disks: BTreeMap::new(),
        network: Some(NetworkMetrics {
            upload_mbps: 1.0,
            download_mbps: 2.5,
            usage_percent: 2.5,
            total_sent_gb: 0.5,
            total_received_gb: 1.25,
        }),
    }
}
