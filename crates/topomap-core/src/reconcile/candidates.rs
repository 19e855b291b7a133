// ── Source candidate search ──
//
// Proposes offline devices that could be the physical root the discovery
// started from. The design may show more cabled ports than are live, never
// fewer, so the online root's uplinks must be a subset of a candidate's.

use std::cmp::Reverse;
use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::model::{Device, DeviceId, InterfaceId, TopologyGraph};

/// An offline device proposed as the counterpart of the online root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDeviceCandidate {
    pub offline_device_id: DeviceId,
    pub ip_number: u32,
    pub uplinks: BTreeSet<InterfaceId>,
}

impl SourceDeviceCandidate {
    fn from_device(device: &Device, uplinks: BTreeSet<InterfaceId>) -> Self {
        Self {
            offline_device_id: device.id,
            ip_number: device.ip_number(),
            uplinks,
        }
    }
}

/// Ordered offline root candidates for the online graph's root.
///
/// An empty list is not an error: the caller matches once with whatever
/// root the offline graph already carries.
pub fn find_source_candidates(
    offline: &TopologyGraph,
    online: &TopologyGraph,
) -> Vec<SourceDeviceCandidate> {
    let online_index = online.index();
    let Some(root) = online
        .source_device_id
        .and_then(|id| online_index.by_id(id))
    else {
        warn!(
            source = ?online.source_device_id,
            "online root not identified, no source candidates"
        );
        return Vec::new();
    };

    let online_uplinks: BTreeSet<InterfaceId> =
        online.uplink_interfaces(root.id).into_iter().collect();
    let offline_index = offline.index();
    let same_model = offline_index.by_model_name(&root.model_name);

    let mut candidates: Vec<SourceDeviceCandidate> = same_model
        .iter()
        .filter_map(|device| {
            let uplinks: BTreeSet<InterfaceId> =
                offline.uplink_interfaces(device.id).into_iter().collect();
            let plausible =
                uplinks.len() >= online_uplinks.len() && online_uplinks.is_subset(&uplinks);
            plausible.then(|| SourceDeviceCandidate::from_device(device, uplinks))
        })
        .collect();

    if candidates.is_empty() {
        debug!(
            model = %root.model_name,
            "no cabling match for online root, falling back to model + IP"
        );
        candidates = same_model
            .iter()
            .filter(|device| root.ip().is_some() && device.ip() == root.ip())
            .map(|device| {
                let uplinks = offline.uplink_interfaces(device.id).into_iter().collect();
                SourceDeviceCandidate::from_device(device, uplinks)
            })
            .collect();
    }

    let root_ip = root.ip().map(u32::from);
    candidates.sort_by_key(|c| {
        (
            Some(c.ip_number) != root_ip,
            Reverse(c.uplinks.len()),
            c.ip_number,
        )
    });

    debug!(
        count = candidates.len(),
        root = %root.id,
        "source candidates found"
    );
    candidates
}
