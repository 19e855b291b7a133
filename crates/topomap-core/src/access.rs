// ── External collaborators ──
//
// The engine consumes two interfaces it does not implement: the device
// access layer (wire clients that crawl LLDP / MAC tables and read the
// hardware catalog) and the project store that persists designs.

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::CoreError;
use crate::model::{DeviceProfile, ProfileId, TopologyGraph};

/// Talks to live devices.
///
/// `discover_topology` returns the online graph with its root already
/// identified (or `None` when no root could be determined). It must
/// observe `cancel` before and after every device it visits; retry policy
/// for individual devices is the implementation's business.
pub trait DeviceAccessLayer: Send + Sync + 'static {
    fn discover_topology(
        &self,
        cancel: CancellationToken,
    ) -> impl Future<Output = Result<TopologyGraph, CoreError>> + Send;

    /// Return [`CoreError::ProfileNotFound`] for unknown ids.
    fn get_device_profile(
        &self,
        id: ProfileId,
    ) -> impl Future<Output = Result<DeviceProfile, CoreError>> + Send;
}

/// Loads designs.
pub trait ProjectStore: Send + Sync + 'static {
    fn load_design_topology(
        &self,
        project_id: &str,
    ) -> impl Future<Output = Result<TopologyGraph, CoreError>> + Send;
}
