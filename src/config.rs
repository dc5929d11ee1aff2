use serde::Deserialize;

/// Minimum tick interval; shorter settings are clamped up to this rather
/// than hammering the OS with refresh syscalls.
pub const MIN_TICK_INTERVAL_MS: u64 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub publishing: PublishingConfig,
    pub monitoring: MonitoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PublishingConfig {
    /// Max number of snapshots kept in the broadcast channel for /ws/stats
    /// (slow clients may lag).
    pub broadcast_capacity: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MonitoringConfig {
    /// Sampling tick interval in milliseconds; clamped to MIN_TICK_INTERVAL_MS.
    pub tick_interval_ms: u64,
    /// Assumed link speed for the network utilization percentage. Rough
    /// heuristic, deliberately not inferred from the interface.
    #[serde(default = "default_max_link_speed_mbps")]
    pub max_link_speed_mbps: f64,
    #[serde(default = "default_gpu_enabled")]
    pub gpu_enabled: bool,
    /// How often to log app stats (ws clients, ticks) at INFO level.
    pub stats_log_interval_secs: u64,
}

fn default_max_link_speed_mbps() -> f64 {
    100.0
}

fn default_gpu_enabled() -> bool {
    true
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let mut config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        if config.monitoring.tick_interval_ms < MIN_TICK_INTERVAL_MS {
            tracing::warn!(
                requested = config.monitoring.tick_interval_ms,
                floor = MIN_TICK_INTERVAL_MS,
                "monitoring.tick_interval_ms below floor; clamping"
            );
            config.monitoring.tick_interval_ms = MIN_TICK_INTERVAL_MS;
        }
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            self.publishing.broadcast_capacity > 0,
            "publishing.broadcast_capacity must be > 0, got {}",
            self.publishing.broadcast_capacity
        );
        anyhow::ensure!(
            self.monitoring.tick_interval_ms > 0,
            "monitoring.tick_interval_ms must be > 0, got {}",
            self.monitoring.tick_interval_ms
        );
        anyhow::ensure!(
            self.monitoring.max_link_speed_mbps > 0.0,
            "monitoring.max_link_speed_mbps must be > 0, got {}",
            self.monitoring.max_link_speed_mbps
        );
        anyhow::ensure!(
            self.monitoring.stats_log_interval_secs > 0,
            "monitoring.stats_log_interval_secs must be > 0, got {}",
            self.monitoring.stats_log_interval_secs
        );
        Ok(())
    }
}
