//! Shared fixtures for the integration tests.
#![allow(dead_code, clippy::unwrap_used)]

use std::collections::HashMap;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use topomap_core::{
    CoreError, Device, DeviceAccessLayer, DeviceId, DeviceProfile, Endpoint, Interface, Link,
    MacAddress, ProfileCatalog, ProfileId, ProjectStore, ReconcileConfig, ReconciliationContext,
    TopologyGraph,
};

pub const PROFILE_MODULAR: ProfileId = ProfileId(1);
pub const PROFILE_BUILT_IN_POWER: ProfileId = ProfileId(2);

// ── Devices and links ───────────────────────────────────────────────

/// A vendor-owned device with eight named ports.
pub fn device(id: i64, model: &str, ip: &str) -> Device {
    let mut d = Device::new(id, model);
    d.vendor = "MOXA".into();
    d.profile_id = Some(PROFILE_MODULAR);
    d.ipv4.address = Some(ip.parse().unwrap());
    d.mac = Some(MacAddress::new(format!("00:90:e8:00:{:02x}:{:02x}", id / 256, id % 256)));
    d.interfaces = (1..=8)
        .map(|n| Interface {
            id: n,
            name: format!("Eth1/{n}"),
        })
        .collect();
    d
}

pub fn link(id: i64, a: (i64, i64), b: (i64, i64)) -> Link {
    Link::new(id, Endpoint::new(a.0, a.1), Endpoint::new(b.0, b.1))
}

pub fn graph(devices: Vec<Device>, links: Vec<Link>, root: Option<i64>) -> TopologyGraph {
    TopologyGraph::new(devices, links, root.map(DeviceId))
}

pub fn profiles() -> Vec<DeviceProfile> {
    vec![
        DeviceProfile {
            id: PROFILE_MODULAR,
            model_name: "EDS-4008".into(),
            built_in_power: false,
        },
        DeviceProfile {
            id: PROFILE_BUILT_IN_POWER,
            model_name: "TSN-G5008".into(),
            built_in_power: true,
        },
    ]
}

pub fn ctx() -> ReconciliationContext {
    ReconciliationContext::new(
        ReconcileConfig::default(),
        profiles().into_iter().collect::<ProfileCatalog>(),
        CancellationToken::new(),
    )
}

// ── Collaborators ───────────────────────────────────────────────────

/// Access layer replaying a fixed discovery result.
pub struct StaticAccess {
    pub online: TopologyGraph,
    pub profiles: Vec<DeviceProfile>,
    /// Simulated crawl time; honours cancellation.
    pub delay: Option<Duration>,
}

impl StaticAccess {
    pub fn new(online: TopologyGraph) -> Self {
        Self {
            online,
            profiles: profiles(),
            delay: None,
        }
    }
}

impl DeviceAccessLayer for StaticAccess {
    async fn discover_topology(&self, cancel: CancellationToken) -> Result<TopologyGraph, CoreError> {
        if let Some(delay) = self.delay {
            tokio::select! {
                () = cancel.cancelled() => return Err(CoreError::Cancelled),
                () = tokio::time::sleep(delay) => {}
            }
        }
        Ok(self.online.clone())
    }

    async fn get_device_profile(&self, id: ProfileId) -> Result<DeviceProfile, CoreError> {
        self.profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(CoreError::ProfileNotFound { profile_id: id })
    }
}

/// Project store holding designs in memory.
#[derive(Default)]
pub struct MemoryStore {
    pub designs: HashMap<String, TopologyGraph>,
}

impl MemoryStore {
    pub fn with(project_id: &str, design: TopologyGraph) -> Self {
        Self {
            designs: HashMap::from([(project_id.to_owned(), design)]),
        }
    }
}

impl ProjectStore for MemoryStore {
    async fn load_design_topology(&self, project_id: &str) -> Result<TopologyGraph, CoreError> {
        self.designs
            .get(project_id)
            .cloned()
            .ok_or_else(|| CoreError::Store {
                message: format!("unknown project '{project_id}'"),
            })
    }
}
