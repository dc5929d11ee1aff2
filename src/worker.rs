// Background sampling-and-broadcast loop: one collect per tick regardless of
// subscriber count; the snapshot goes to the cache, then out over the
// broadcast channel.

use crate::cache::SnapshotCache;
use crate::collector::Collector;
use crate::models::MetricSnapshot;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant, interval};

/// Rate limit for the "no receivers" note (avoid logging every tick when no
/// one is on /ws/stats).
const NO_RECEIVERS_NOTE_INTERVAL: Duration = Duration::from_secs(60);

/// Collector, cache, channels, and shutdown for the worker.
pub struct WorkerDeps {
    pub collector: Arc<Collector>,
    pub cache: Arc<SnapshotCache>,
    pub tx: broadcast::Sender<MetricSnapshot>,
    pub ws_connections: Arc<AtomicUsize>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and logging config.
/// Stats logging uses a real-time interval, independent of tick_interval_ms.
pub struct WorkerConfig {
    pub tick_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn(deps: WorkerDeps, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        collector,
        cache,
        tx,
        ws_connections,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        tick_interval_ms,
        stats_log_interval_secs,
    } = config;

    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(tick_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut ticks_total: u64 = 0;
        let mut last_no_receivers_note: Option<Instant> = None;

        let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", tick_interval_ms);
        let _guard = worker_span.enter();

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    // One collect per tick; fan-out cost does not depend on it.
                    // A collect error means a poisoned sources lock or a join
                    // failure, neither of which a later tick can recover from;
                    // stop the loop and let process supervision take over.
                    let snapshot = match collector.collect().await {
                        Ok(s) => s,
                        Err(e) => {
                            tracing::error!(error = %e, operation = "collect", "snapshot collection failed; stopping worker");
                            break;
                        }
                    };
                    ticks_total += 1;

                    cache.store(snapshot.clone());

                    // Each receiver has its own queue; a slow or vanished
                    // subscriber never blocks the others or the next tick.
                    if tx.send(snapshot).is_err() {
                        let should_note = last_no_receivers_note
                            .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_NOTE_INTERVAL);
                        if should_note {
                            tracing::debug!(
                                operation = "broadcast_snapshot",
                                "no active WebSocket clients; broadcast channel has no receivers"
                            );
                            last_no_receivers_note = Some(Instant::now());
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_clients = ws_connections.load(std::sync::atomic::Ordering::Relaxed),
                        ticks_total,
                        "app stats"
                    );
                }
            }
        }
    })
}
