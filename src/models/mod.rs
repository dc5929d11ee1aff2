// Wire models

mod host;
mod snapshot;

pub use host::HostInfo;
pub use snapshot::{
    CpuMetrics, DiskMetrics, GpuMetrics, MemoryMetrics, MetricSnapshot, NetworkMetrics,
};
