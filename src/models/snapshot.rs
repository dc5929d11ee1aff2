// Per-tick metric snapshot and per-family metric records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CpuMetrics {
    pub usage_percent: f64,
    pub frequency_ghz: f64,
    pub max_frequency_ghz: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryMetrics {
    pub usage_percent: f64,
    pub used_gb: f64,
    pub total_gb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GpuMetrics {
    pub name: String,
    pub temperature_c: u32,
    /// Highest temperature seen since process start.
    pub max_temperature_c: u32,
    pub fan_percent: u32,
    pub power_draw_w: f64,
    pub power_limit_w: f64,
    pub usage_percent: f64,
    pub memory_usage_percent: f64,
    pub memory_used_gb: f64,
    pub memory_total_gb: f64,
    pub driver_version: String,
    pub cuda_version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiskMetrics {
    /// Display name (mount point on Linux, drive letter on Windows).
    pub label: String,
    pub fs_type: String,
    pub used_gb: f64,
    pub total_gb: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkMetrics {
    pub upload_mbps: f64,
    pub download_mbps: f64,
    pub usage_percent: f64,
    pub total_sent_gb: f64,
    pub total_received_gb: f64,
}

/// One immutable bundle of all metric families captured at one tick.
///
/// A family whose source failed is `None` (JSON `null`), never a zeroed
/// record that could read as a real idle measurement. Superseded, not
/// mutated, by the next tick's snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub timestamp: DateTime<Utc>,
    pub cpu: Option<CpuMetrics>,
    pub memory: Option<MemoryMetrics>,
    pub gpu: Option<GpuMetrics>,
    /// Keyed by sanitized volume id; volumes unmounted since the previous
    /// tick are simply absent.
    pub disks: BTreeMap<String, DiskMetrics>,
    pub network: Option<NetworkMetrics>,
}
