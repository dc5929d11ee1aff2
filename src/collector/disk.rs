// Mounted volume capacity; enumerated fresh each tick so removable media
// appearing or disappearing between ticks shows up in the next snapshot.

use super::{SourceError, gib, round1};
use crate::models::DiskMetrics;
use std::collections::BTreeMap;
use sysinfo::Disks;

/// Virtual/special filesystems excluded from the dashboard.
const SKIP_FS_TYPES: &[&str] = &["tmpfs", "devtmpfs", "sysfs", "proc", "squashfs", "overlay"];

/// Mount prefixes excluded from the dashboard.
const SKIP_MOUNT_PREFIXES: &[&str] = &["/sys", "/proc", "/dev", "/run", "/snap"];

pub(super) struct DiskSource {
    disks: Disks,
}

impl DiskSource {
    pub(super) fn new() -> Self {
        Self {
            disks: Disks::new_with_refreshed_list(),
        }
    }

    pub(super) fn sample(&mut self) -> Result<BTreeMap<String, DiskMetrics>, SourceError> {
        // remove_not_listed = true: drop volumes unmounted since last tick
        self.disks.refresh(true);

        let mut volumes = BTreeMap::new();
        for disk in self.disks.list() {
            let mount = disk.mount_point().to_string_lossy().into_owned();
            let fs_type = disk.file_system().to_string_lossy().into_owned();
            if !is_monitored(&fs_type, &mount) {
                continue;
            }
            let total = disk.total_space();
            if total == 0 {
                continue;
            }
            let used = total.saturating_sub(disk.available_space());
            volumes.insert(
                volume_id(&mount),
                DiskMetrics {
                    label: mount,
                    fs_type,
                    used_gb: round1(gib(used)),
                    total_gb: round1(gib(total)),
                },
            );
        }
        Ok(volumes)
    }
}

fn is_monitored(fs_type: &str, mount: &str) -> bool {
    if SKIP_FS_TYPES.contains(&fs_type) {
        return false;
    }
    !SKIP_MOUNT_PREFIXES.iter().any(|p| mount.starts_with(p))
}

/// Stable map key derived from the mount point ("/" -> "root",
/// "/mnt/data" -> "mnt_data").
fn volume_id(mount: &str) -> String {
    let id = mount.replace('/', "_");
    let id = id.trim_matches('_');
    if id.is_empty() {
        "root".to_string()
    } else {
        id.to_string()
    }
}
