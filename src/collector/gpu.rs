// NVIDIA GPU stats via NVML. Probed once at startup; if no driver or device
// is present the source stays disabled for the process lifetime.

use super::{SourceError, gib, round1};
use crate::models::GpuMetrics;
use nvml_wrapper::Nvml;
use nvml_wrapper::enum_wrappers::device::TemperatureSensor;

/// Assumed when the driver does not expose a power limit.
const FALLBACK_POWER_LIMIT_W: f64 = 320.0;

pub(super) struct GpuSource {
    state: GpuState,
}

enum GpuState {
    Disabled,
    Active {
        nvml: Nvml,
        name: String,
        driver_version: String,
        cuda_version: String,
        /// Highest temperature seen since process start.
        max_temperature_c: u32,
    },
}

impl GpuSource {
    pub(super) fn init(enabled: bool) -> Self {
        if !enabled {
            tracing::info!("GPU monitoring disabled by config");
            return Self {
                state: GpuState::Disabled,
            };
        }
        let nvml = match Nvml::init() {
            Ok(nvml) => nvml,
            Err(e) => {
                tracing::warn!(error = %e, "NVML unavailable; GPU monitoring disabled");
                return Self {
                    state: GpuState::Disabled,
                };
            }
        };
        let name = match nvml.device_by_index(0) {
            Ok(device) => device.name().unwrap_or_else(|_| "Unknown GPU".into()),
            Err(e) => {
                tracing::warn!(error = %e, "no compatible GPU device; GPU monitoring disabled");
                return Self {
                    state: GpuState::Disabled,
                };
            }
        };
        let driver_version = nvml
            .sys_driver_version()
            .unwrap_or_else(|_| "Unknown".into());
        let cuda_version = nvml
            .sys_cuda_driver_version()
            .map(|v| format!("{}.{}", v / 1000, (v % 1000) / 10))
            .unwrap_or_else(|_| "Unknown".into());
        tracing::info!(gpu = %name, driver = %driver_version, "GPU monitoring initialized");
        Self {
            state: GpuState::Active {
                nvml,
                name,
                driver_version,
                cuda_version,
                max_temperature_c: 0,
            },
        }
    }

    pub(super) fn is_enabled(&self) -> bool {
        matches!(self.state, GpuState::Active { .. })
    }

    pub(super) fn sample(&mut self) -> Result<GpuMetrics, SourceError> {
        let GpuState::Active {
            nvml,
            name,
            driver_version,
            cuda_version,
            max_temperature_c,
        } = &mut self.state
        else {
            return Err(SourceError::Unavailable("GPU monitoring disabled".into()));
        };

        let device = nvml
            .device_by_index(0)
            .map_err(|e| SourceError::Unavailable(format!("GPU device: {e}")))?;

        // Individual readings degrade to defaults on otherwise working
        // devices (e.g. fanless cards have no fan sensor).
        let temperature_c = device.temperature(TemperatureSensor::Gpu).unwrap_or(0);
        *max_temperature_c = (*max_temperature_c).max(temperature_c);
        let fan_percent = device.fan_speed(0).unwrap_or(0);
        let power_draw_w = device
            .power_usage()
            .map(|mw| mw as f64 / 1000.0)
            .unwrap_or(0.0);
        let power_limit_w = device
            .enforced_power_limit()
            .map(|mw| mw as f64 / 1000.0)
            .unwrap_or(FALLBACK_POWER_LIMIT_W);
        let usage_percent = device
            .utilization_rates()
            .map(|u| u.gpu as f64)
            .unwrap_or(0.0);
        let (memory_used, memory_total) = device
            .memory_info()
            .map(|m| (m.used, m.total))
            .unwrap_or((0, 0));
        let memory_usage_percent = if memory_total > 0 {
            memory_used as f64 / memory_total as f64 * 100.0
        } else {
            0.0
        };

        Ok(GpuMetrics {
            name: name.clone(),
            temperature_c,
            max_temperature_c: *max_temperature_c,
            fan_percent,
            power_draw_w: round1(power_draw_w),
            power_limit_w: round1(power_limit_w),
            usage_percent: round1(usage_percent),
            memory_usage_percent: round1(memory_usage_percent),
            memory_used_gb: round1(gib(memory_used)),
            memory_total_gb: round1(gib(memory_total)),
            driver_version: driver_version.clone(),
            cuda_version: cuda_version.clone(),
        })
    }
}
