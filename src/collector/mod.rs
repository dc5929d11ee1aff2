// Metric sources via sysinfo + NVML

mod cpu;
mod disk;
mod gpu;
mod linux;
mod memory;
mod network;

use crate::config::MonitoringConfig;
use crate::models::{HostInfo, MetricSnapshot};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use sysinfo::{Networks, System};
use thiserror::Error;
use tracing::instrument;

/// A metric family's source could not be read (OS/driver call failed, or the
/// source is permanently disabled). Absorbed by [`Collector::collect`]; never
/// fails a tick.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),
}

struct Sources {
    cpu: cpu::CpuSource,
    memory: memory::MemorySource,
    disk: disk::DiskSource,
    network: network::NetworkSource,
    gpu: gpu::GpuSource,
    last_timestamp: Option<DateTime<Utc>>,
}

/// Samples every enabled source once per call and merges the results into one
/// snapshot. The mutex makes collection non-reentrant: at most one collect is
/// in flight at a time, and per-tick source state (network counters, GPU temp
/// watermark) is only ever touched under it.
pub struct Collector {
    sources: Arc<std::sync::Mutex<Sources>>,
}

impl Collector {
    pub fn new(config: &MonitoringConfig) -> Self {
        let sources = Sources {
            cpu: cpu::CpuSource::new(),
            memory: memory::MemorySource::new(),
            disk: disk::DiskSource::new(),
            network: network::NetworkSource::new(config.max_link_speed_mbps),
            gpu: gpu::GpuSource::init(config.gpu_enabled),
            last_timestamp: None,
        };
        Self {
            sources: Arc::new(std::sync::Mutex::new(sources)),
        }
    }

    /// Collects one snapshot. A failing source yields an absent family and a
    /// warning; only lock poisoning or a join failure surface as an error.
    #[instrument(skip(self), fields(operation = "collect"))]
    pub async fn collect(&self) -> anyhow::Result<MetricSnapshot> {
        let sources = self.sources.clone();
        tokio::task::spawn_blocking(move || {
            let mut sources = sources
                .lock()
                .map_err(|e| anyhow::anyhow!("sources lock poisoned: {}", e))?;

            // Strictly increasing even if the clock reads the same (or steps
            // back) between ticks.
            let mut timestamp = Utc::now();
            if let Some(prev) = sources.last_timestamp
                && timestamp <= prev
            {
                timestamp = prev + chrono::Duration::microseconds(1);
            }
            sources.last_timestamp = Some(timestamp);

            let cpu = family(sources.cpu.sample(), "cpu");
            let memory = family(sources.memory.sample(), "memory");
            let gpu = if sources.gpu.is_enabled() {
                family(sources.gpu.sample(), "gpu")
            } else {
                None
            };
            let disks = match sources.disk.sample() {
                Ok(d) => d,
                Err(e) => {
                    tracing::warn!(error = %e, family = "disk", "metric source failed");
                    BTreeMap::new()
                }
            };
            let network = family(sources.network.sample(), "network");

            Ok(MetricSnapshot {
                timestamp,
                cpu,
                memory,
                gpu,
                disks,
                network,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("collector task join: {}", e))?
    }
}

fn family<T>(result: Result<T, SourceError>, family: &str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, family, "metric source failed");
            None
        }
    }
}

/// One-shot host identity lookup for GET /api/info and the WS welcome.
pub fn detect_host_info() -> HostInfo {
    let networks = Networks::new_with_refreshed_list();
    let mut ip_addresses: Vec<String> = networks
        .list()
        .iter()
        .flat_map(|(_, data)| data.ip_networks().iter())
        .filter_map(|n| match n.addr {
            IpAddr::V4(v4) if !v4.is_loopback() && !v4.is_link_local() => Some(v4.to_string()),
            _ => None,
        })
        .collect();
    ip_addresses.sort();
    ip_addresses.dedup();

    HostInfo {
        hostname: System::host_name().unwrap_or_default(),
        platform: System::name().unwrap_or_else(|| std::env::consts::OS.into()),
        ip_addresses,
    }
}

#[cfg(test)]
impl Collector {
    /// Poisons the sources lock, as a panic inside a refresh would.
    pub(crate) fn poison_sources(&self) {
        let sources = self.sources.clone();
        let _ = std::thread::spawn(move || {
            let _guard = sources.lock().unwrap();
            panic!("poison sources lock");
        })
        .join();
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

fn gib(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0 * 1024.0)
}
