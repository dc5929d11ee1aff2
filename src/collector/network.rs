// Network throughput from byte-counter deltas between ticks

use super::{SourceError, gib, round1, round2};
use crate::models::NetworkMetrics;
use std::time::Instant;
use sysinfo::Networks;

pub(super) struct NetworkSource {
    networks: Networks,
    tracker: ThroughputTracker,
    max_link_speed_mbps: f64,
}

impl NetworkSource {
    pub(super) fn new(max_link_speed_mbps: f64) -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            tracker: ThroughputTracker::new(),
            max_link_speed_mbps,
        }
    }

    pub(super) fn sample(&mut self) -> Result<NetworkMetrics, SourceError> {
        self.networks.refresh(true);
        if self.networks.list().is_empty() {
            return Err(SourceError::Unavailable("no network interfaces".into()));
        }

        // Aggregate counters across interfaces, matching the single
        // machine-wide counter pair the dashboard displays. An interface
        // disappearing can make the aggregate step backwards; the tracker
        // treats that as a counter reset.
        let (bytes_sent, bytes_recv) = self.networks.list().iter().fold((0u64, 0u64), |(tx, rx), (_, data)| {
            (
                tx.saturating_add(data.total_transmitted()),
                rx.saturating_add(data.total_received()),
            )
        });

        let (upload_mbps, download_mbps) =
            self.tracker.update(bytes_sent, bytes_recv, Instant::now());

        let usage_percent = if self.max_link_speed_mbps > 0.0 {
            (upload_mbps.max(download_mbps) / self.max_link_speed_mbps * 100.0).clamp(0.0, 100.0)
        } else {
            0.0
        };

        Ok(NetworkMetrics {
            upload_mbps: round1(upload_mbps),
            download_mbps: round1(download_mbps),
            usage_percent: round1(usage_percent),
            total_sent_gb: round2(gib(bytes_sent)),
            total_received_gb: round2(gib(bytes_recv)),
        })
    }
}

#[derive(Debug, Clone, Copy)]
struct Counters {
    bytes_sent: u64,
    bytes_recv: u64,
    sampled_at: Instant,
}

/// Running byte counters from the previous sample. Counters are monotonic
/// within a boot session; a decrease means a reset (interface restart), which
/// rebases the baseline and reports zero for that interval instead of a
/// negative rate.
pub(super) struct ThroughputTracker {
    last: Option<Counters>,
}

impl ThroughputTracker {
    pub(super) fn new() -> Self {
        Self { last: None }
    }

    /// Returns (upload_mbps, download_mbps) for the interval since the
    /// previous call, and advances the baseline to the current reading.
    pub(super) fn update(&mut self, bytes_sent: u64, bytes_recv: u64, now: Instant) -> (f64, f64) {
        let rates = match self.last {
            Some(prev) => {
                let elapsed = now.duration_since(prev.sampled_at).as_secs_f64();
                if elapsed <= 0.0
                    || bytes_sent < prev.bytes_sent
                    || bytes_recv < prev.bytes_recv
                {
                    (0.0, 0.0)
                } else {
                    (
                        to_mbps((bytes_sent - prev.bytes_sent) as f64 / elapsed),
                        to_mbps((bytes_recv - prev.bytes_recv) as f64 / elapsed),
                    )
                }
            }
            None => (0.0, 0.0),
        };
        self.last = Some(Counters {
            bytes_sent,
            bytes_recv,
            sampled_at: now,
        });
        rates
    }
}

fn to_mbps(bytes_per_sec: f64) -> f64 {
    bytes_per_sec * 8.0 / 1024.0 / 1024.0
}
