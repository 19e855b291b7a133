// ── Topology graphs ──
//
// A graph is a device list plus a link list, optionally tagged with the
// root device. Lookups go through explicit indices: callers say whether
// they want a device by id or by model name, never "either".

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::device::Device;
use super::ids::{DeviceId, InterfaceId};
use super::link::Link;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopologyGraph {
    #[serde(default)]
    pub devices: Vec<Device>,
    #[serde(default)]
    pub links: Vec<Link>,
    #[serde(default)]
    pub source_device_id: Option<DeviceId>,
}

impl TopologyGraph {
    pub fn new(devices: Vec<Device>, links: Vec<Link>, source_device_id: Option<DeviceId>) -> Self {
        Self {
            devices,
            links,
            source_device_id,
        }
    }

    pub fn index(&self) -> DeviceIndex<'_> {
        DeviceIndex::new(&self.devices)
    }

    pub fn links_by_device(&self) -> DeviceLinks {
        DeviceLinks::build(&self.devices, &self.links)
    }

    pub fn device(&self, id: DeviceId) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Copy of this graph rooted at a different device.
    pub fn with_source(&self, source: DeviceId) -> Self {
        Self {
            source_device_id: Some(source),
            ..self.clone()
        }
    }

    /// Local interface ids of every link touching `device_id`, one entry
    /// per link.
    pub fn uplink_interfaces(&self, device_id: DeviceId) -> Vec<InterfaceId> {
        self.links
            .iter()
            .filter_map(|l| l.local_end(device_id))
            .map(|e| e.interface_id)
            .collect()
    }
}

// ── DeviceIndex ─────────────────────────────────────────────────────

/// Two separate lookup tables over a device slice.
#[derive(Debug)]
pub struct DeviceIndex<'a> {
    by_id: HashMap<DeviceId, &'a Device>,
    by_model_name: HashMap<&'a str, Vec<&'a Device>>,
}

impl<'a> DeviceIndex<'a> {
    pub fn new(devices: &'a [Device]) -> Self {
        let mut by_id = HashMap::with_capacity(devices.len());
        let mut by_model_name: HashMap<&'a str, Vec<&'a Device>> = HashMap::new();
        for device in devices {
            by_id.insert(device.id, device);
            by_model_name
                .entry(device.model_name.as_str())
                .or_default()
                .push(device);
        }
        Self {
            by_id,
            by_model_name,
        }
    }

    pub fn by_id(&self, id: DeviceId) -> Option<&'a Device> {
        self.by_id.get(&id).copied()
    }

    /// Devices sharing a model name, in original list order.
    pub fn by_model_name(&self, model_name: &str) -> &[&'a Device] {
        self.by_model_name
            .get(model_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn contains(&self, id: DeviceId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

// ── DeviceLinks ─────────────────────────────────────────────────────

/// Device id → incident links. Every listed device has an entry, even
/// when it has no links. Links to unknown devices are only attached to
/// the side that exists.
#[derive(Debug, Clone, Default)]
pub struct DeviceLinks {
    map: BTreeMap<DeviceId, BTreeSet<Link>>,
}

impl DeviceLinks {
    pub fn build(devices: &[Device], links: &[Link]) -> Self {
        let mut map: BTreeMap<DeviceId, BTreeSet<Link>> =
            devices.iter().map(|d| (d.id, BTreeSet::new())).collect();
        for link in links {
            for end in [link.source.device_id, link.destination.device_id] {
                if let Some(set) = map.get_mut(&end) {
                    set.insert(link.clone());
                }
            }
        }
        Self { map }
    }

    pub fn links_of(&self, device_id: DeviceId) -> impl Iterator<Item = &Link> {
        self.map.get(&device_id).into_iter().flatten()
    }

    /// Neighbour device ids of `device_id`, deduplicated and ordered.
    pub fn neighbours(&self, device_id: DeviceId) -> BTreeSet<DeviceId> {
        self.links_of(device_id)
            .filter_map(|l| l.other_end(device_id))
            .map(|e| e.device_id)
            .collect()
    }

    /// Local interface → device on the other end of that interface's link.
    pub fn leave_interfaces(&self, device_id: DeviceId) -> BTreeMap<InterfaceId, DeviceId> {
        self.links_of(device_id)
            .filter_map(|l| Some((l.local_end(device_id)?, l.other_end(device_id)?)))
            .map(|(local, remote)| (local.interface_id, remote.device_id))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::link::Endpoint;

    fn graph() -> TopologyGraph {
        let devices = vec![
            Device::new(1, "EDS-4008"),
            Device::new(2, "EDS-4008"),
            Device::new(3, "TSN-G5008"),
        ];
        let links = vec![
            Link::new(1, Endpoint::new(1, 1), Endpoint::new(2, 1)),
            Link::new(2, Endpoint::new(2, 2), Endpoint::new(3, 5)),
            Link::new(3, Endpoint::new(3, 6), Endpoint::new(99, 1)),
        ];
        TopologyGraph::new(devices, links, Some(DeviceId(1)))
    }

    #[test]
    fn index_separates_id_and_model_lookups() {
        let g = graph();
        let idx = g.index();
        assert_eq!(idx.by_id(DeviceId(3)).unwrap().model_name, "TSN-G5008");
        assert_eq!(idx.by_model_name("EDS-4008").len(), 2);
        assert!(idx.by_model_name("nope").is_empty());
        assert!(idx.by_id(DeviceId(99)).is_none());
    }

    #[test]
    fn leave_interfaces_point_at_opposite_device() {
        let g = graph();
        let links = g.links_by_device();
        let leave = links.leave_interfaces(DeviceId(2));
        assert_eq!(leave.get(&1), Some(&DeviceId(1)));
        assert_eq!(leave.get(&2), Some(&DeviceId(3)));

        // Dangling links stay on the known side only.
        assert_eq!(links.links_of(DeviceId(3)).count(), 2);
        assert_eq!(links.links_of(DeviceId(99)).count(), 0);
    }

    #[test]
    fn uplinks_list_local_interfaces() {
        let g = graph();
        let mut up = g.uplink_interfaces(DeviceId(3));
        up.sort_unstable();
        assert_eq!(up, vec![5, 6]);
    }
}
