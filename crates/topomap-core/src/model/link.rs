// ── Links ──
//
// Undirected edge between two (device, interface) endpoints. Endpoints
// are stored as given; `other_end` answers the neighbour question from
// either side.

use serde::{Deserialize, Serialize};

use super::ids::{DeviceId, InterfaceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub device_id: DeviceId,
    pub interface_id: InterfaceId,
}

impl Endpoint {
    pub fn new(device_id: impl Into<DeviceId>, interface_id: InterfaceId) -> Self {
        Self {
            device_id: device_id.into(),
            interface_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Link {
    #[serde(default)]
    pub id: i64,
    pub source: Endpoint,
    pub destination: Endpoint,
}

impl Link {
    pub fn new(id: i64, source: Endpoint, destination: Endpoint) -> Self {
        Self {
            id,
            source,
            destination,
        }
    }

    /// Both ends sit on the same device.
    pub fn is_self_link(&self) -> bool {
        self.source.device_id == self.destination.device_id
    }

    pub fn touches(&self, device_id: DeviceId) -> bool {
        self.source.device_id == device_id || self.destination.device_id == device_id
    }

    /// The endpoint that belongs to `device_id`, if the link touches it.
    pub fn local_end(&self, device_id: DeviceId) -> Option<Endpoint> {
        if self.source.device_id == device_id {
            Some(self.source)
        } else if self.destination.device_id == device_id {
            Some(self.destination)
        } else {
            None
        }
    }

    /// The endpoint opposite `device_id`, if the link touches it.
    pub fn other_end(&self, device_id: DeviceId) -> Option<Endpoint> {
        if self.source.device_id == device_id {
            Some(self.destination)
        } else if self.destination.device_id == device_id {
            Some(self.source)
        } else {
            None
        }
    }
}
