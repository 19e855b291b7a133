// ── Reconciliation configuration ──
//
// Tuning knobs for a reconciliation run. Front ends build this from their
// own config sources and hand it in; core never reads config files.

use std::net::Ipv4Addr;
use std::time::Duration;

/// Vendor name and numeric vendor id of the hardware this engine reconciles.
pub const DEFAULT_VENDORS: [&str; 2] = ["MOXA", "8691"];

pub const DEFAULT_SUBNET_MASK: Ipv4Addr = Ipv4Addr::new(255, 255, 255, 0);

#[derive(Debug, Clone)]
pub struct ReconcileConfig {
    /// Vendor names or ids whose devices take part in reconciliation.
    pub vendors: Vec<String>,
    /// Subnet mask written into IP carry-over entries when the design
    /// leaves it empty.
    pub default_subnet_mask: Ipv4Addr,
    /// How often callers are expected to poll job status.
    pub status_poll_interval: Duration,
    /// Upper bound for the discovery phase. `None` = wait indefinitely.
    pub discovery_timeout: Option<Duration>,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            vendors: DEFAULT_VENDORS.iter().map(|v| (*v).to_owned()).collect(),
            default_subnet_mask: DEFAULT_SUBNET_MASK,
            status_poll_interval: Duration::from_secs(1),
            discovery_timeout: None,
        }
    }
}
