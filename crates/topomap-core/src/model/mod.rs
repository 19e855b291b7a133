// ── Reconciliation domain model ──
//
// Value snapshots shared by the offline (design) and online (discovered)
// graphs. The engine never mutates a device in place; every pass that
// derives new data hands back fresh snapshots.

pub mod device;
pub mod ids;
pub mod link;
pub mod mapping;
pub mod profile;
pub mod topology;

// ── Re-exports ──────────────────────────────────────────────────────

// Identity
pub use ids::{DeviceId, InterfaceId, MacAddress, ProfileId};

// Device
pub use device::{
    Account, ConnectionConfig, Device, DeviceType, Interface, Ipv4Settings, ModularConfiguration,
    NetconfSettings, RestfulSettings, SnmpSettings,
};

// Links / graphs
pub use link::{Endpoint, Link};
pub use topology::{DeviceIndex, DeviceLinks, TopologyGraph};

// Profiles
pub use profile::{DeviceProfile, ProfileCatalog};

// Results
pub use mapping::{MapDeviceResultItem, MapStatus, MappingResult};
