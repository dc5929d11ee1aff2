// Static host identity; fetched once at startup, served on GET /api/info
// and as the WebSocket welcome message.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HostInfo {
    pub hostname: String,
    pub platform: String,
    /// IPv4 addresses, excluding loopback and 169.254 link-local.
    pub ip_addresses: Vec<String>,
}
