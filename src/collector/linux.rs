// Linux-specific helpers: /sys readers.

/// Read the maximum CPU clock from cpufreq (kHz in /sys) in GHz.
pub(super) fn read_cpu_max_freq_ghz() -> Option<f64> {
    #[cfg(target_os = "linux")]
    {
        let content =
            std::fs::read_to_string("/sys/devices/system/cpu/cpu0/cpufreq/cpuinfo_max_freq")
                .ok()?;
        let khz: f64 = content.trim().parse().ok()?;
        if khz > 0.0 {
            return Some(khz / 1_000_000.0);
        }
    }
    None
}
