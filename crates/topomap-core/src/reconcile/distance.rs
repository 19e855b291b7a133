// ── Hop-distance layering ──
//
// Breadth-first, frontier by frontier, from a root device. Each frontier
// is an ordered set so the layering does not depend on link order.

use std::collections::{BTreeSet, HashMap};

use crate::error::CoreError;
use crate::model::{Device, DeviceId, DeviceLinks, Link};

/// Distance assigned to devices with no path to the root.
pub const UNREACHABLE: i32 = -1;

/// New snapshots of `devices` with `distance` set: `0` for the root, the
/// shortest hop count for reachable devices, [`UNREACHABLE`] otherwise.
pub fn compute_distances(
    devices: &[Device],
    links: &[Link],
    root: DeviceId,
) -> Result<Vec<Device>, CoreError> {
    if !devices.iter().any(|d| d.id == root) {
        return Err(CoreError::RootDeviceNotFound { device_id: root });
    }

    let adjacency = DeviceLinks::build(devices, links);
    let known: BTreeSet<DeviceId> = devices.iter().map(|d| d.id).collect();

    let mut distances: HashMap<DeviceId, i32> = HashMap::from([(root, 0)]);
    let mut frontier = BTreeSet::from([root]);
    let mut hops = 0;

    while !frontier.is_empty() {
        hops += 1;
        let mut next = BTreeSet::new();
        for device_id in &frontier {
            for neighbour in adjacency.neighbours(*device_id) {
                if known.contains(&neighbour) && !distances.contains_key(&neighbour) {
                    distances.insert(neighbour, hops);
                    next.insert(neighbour);
                }
            }
        }
        frontier = next;
    }

    Ok(devices
        .iter()
        .map(|d| d.with_distance(distances.get(&d.id).copied().unwrap_or(UNREACHABLE)))
        .collect())
}

/// Order devices for listing: far-to-near from `root` (unreachable first,
/// ties by MAC ascending). Without a usable root, by IP descending.
pub fn sort_by_distance(devices: &[Device], links: &[Link], root: Option<DeviceId>) -> Vec<Device> {
    let layered = root.and_then(|r| compute_distances(devices, links, r).ok());

    if let Some(mut sorted) = layered {
        sorted.sort_by(|a, b| {
            let da = far_key(a.distance);
            let db = far_key(b.distance);
            db.cmp(&da).then_with(|| a.mac.cmp(&b.mac))
        });
        sorted
    } else {
        let mut sorted = devices.to_vec();
        sorted.sort_by_key(|d| std::cmp::Reverse(d.ip_number()));
        sorted
    }
}

fn far_key(distance: Option<i32>) -> i32 {
    match distance {
        Some(d) if d >= 0 => d,
        _ => i32::MAX,
    }
}
