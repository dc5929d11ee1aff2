// Config loading and validation tests

use sysmon::config::{AppConfig, MIN_TICK_INTERVAL_MS};

const VALID_CONFIG: &str = r#"
[server]
port = 9876
host = "0.0.0.0"

[publishing]
broadcast_capacity = 60

[monitoring]
tick_interval_ms = 1000
max_link_speed_mbps = 100.0
gpu_enabled = true
stats_log_interval_secs = 60
"#;

#[test]
fn test_config_loads_from_str() {
    let config = AppConfig::load_from_str(VALID_CONFIG).expect("load_from_str");
    assert_eq!(config.server.port, 9876);
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.publishing.broadcast_capacity, 60);
    assert_eq!(config.monitoring.tick_interval_ms, 1000);
    assert_eq!(config.monitoring.max_link_speed_mbps, 100.0);
    assert!(config.monitoring.gpu_enabled);
}

#[test]
fn test_config_defaults_for_optional_monitoring_keys() {
    let minimal = VALID_CONFIG
        .replace("max_link_speed_mbps = 100.0\n", "")
        .replace("gpu_enabled = true\n", "");
    let config = AppConfig::load_from_str(&minimal).expect("load_from_str");
    assert_eq!(config.monitoring.max_link_speed_mbps, 100.0);
    assert!(config.monitoring.gpu_enabled);
}

#[test]
fn test_config_clamps_tick_interval_to_floor() {
    let short = VALID_CONFIG.replace("tick_interval_ms = 1000", "tick_interval_ms = 50");
    let config = AppConfig::load_from_str(&short).expect("load_from_str");
    assert_eq!(config.monitoring.tick_interval_ms, MIN_TICK_INTERVAL_MS);
}

#[test]
fn test_config_validation_rejects_invalid_port() {
    let bad = VALID_CONFIG.replace("port = 9876", "port = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("server.port"));
}

#[test]
fn test_config_validation_rejects_broadcast_capacity_zero() {
    let bad = VALID_CONFIG.replace("broadcast_capacity = 60", "broadcast_capacity = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("broadcast_capacity"));
}

#[test]
fn test_config_validation_rejects_tick_interval_zero() {
    let bad = VALID_CONFIG.replace("tick_interval_ms = 1000", "tick_interval_ms = 0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("tick_interval_ms"));
}

#[test]
fn test_config_validation_rejects_link_speed_zero() {
    let bad = VALID_CONFIG.replace("max_link_speed_mbps = 100.0", "max_link_speed_mbps = 0.0");
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("max_link_speed_mbps"));
}

#[test]
fn test_config_validation_rejects_stats_log_interval_zero() {
    let bad = VALID_CONFIG.replace(
        "stats_log_interval_secs = 60",
        "stats_log_interval_secs = 0",
    );
    let err = AppConfig::load_from_str(&bad).unwrap_err();
    assert!(err.to_string().contains("stats_log_interval_secs"));
}
