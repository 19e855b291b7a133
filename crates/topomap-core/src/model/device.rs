// ── Device domain types ──

use secrecy::SecretString;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use super::ids::{DeviceId, InterfaceId, MacAddress, ProfileId};

/// Device classification reported by the design tool or by discovery.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum DeviceType {
    TsnSwitch,
    Switch,
    BridgedEndStation,
    EndStation,
    PoeAccessory,
    NetworkMgmt,
    Icmp,
    #[default]
    Unknown,
}

impl DeviceType {
    /// Leaf hosts never take part in topology reconciliation.
    pub fn is_end_station(self) -> bool {
        matches!(self, Self::EndStation)
    }
}

/// Physical port on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interface {
    pub id: InterfaceId,
    #[serde(default)]
    pub name: String,
}

/// Slot → installed module id, for line cards and power supplies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModularConfiguration {
    #[serde(default)]
    pub ethernet: BTreeMap<u32, i64>,
    #[serde(default)]
    pub power: BTreeMap<u32, i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ipv4Settings {
    pub address: Option<Ipv4Addr>,
    pub subnet_mask: Option<Ipv4Addr>,
    pub gateway: Option<Ipv4Addr>,
    pub dns1: Option<Ipv4Addr>,
    pub dns2: Option<Ipv4Addr>,
}

// ── Connection settings ─────────────────────────────────────────────
//
// Credentials learned during discovery are carried over into the design
// once a device is mapped. Secrets deserialize from plain strings and are
// never written back out.

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub username: String,
    #[serde(default, skip_serializing, deserialize_with = "deserialize_secret")]
    pub password: Option<SecretString>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnmpSettings {
    #[serde(default = "default_snmp_version")]
    pub version: String,
    #[serde(default = "default_snmp_port")]
    pub port: u16,
    #[serde(default, skip_serializing, deserialize_with = "deserialize_secret")]
    pub read_community: Option<SecretString>,
    #[serde(default, skip_serializing, deserialize_with = "deserialize_secret")]
    pub write_community: Option<SecretString>,
}

impl Default for SnmpSettings {
    fn default() -> Self {
        Self {
            version: default_snmp_version(),
            port: default_snmp_port(),
            read_community: None,
            write_community: None,
        }
    }
}

fn default_snmp_version() -> String {
    "v2c".into()
}
fn default_snmp_port() -> u16 {
    161
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetconfSettings {
    #[serde(default = "default_netconf_port")]
    pub port: u16,
    #[serde(default = "default_true")]
    pub over_ssh: bool,
}

impl Default for NetconfSettings {
    fn default() -> Self {
        Self {
            port: default_netconf_port(),
            over_ssh: true,
        }
    }
}

fn default_netconf_port() -> u16 {
    830
}
fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestfulSettings {
    #[serde(default = "default_restful_protocol")]
    pub protocol: String,
    #[serde(default = "default_restful_port")]
    pub port: u16,
}

impl Default for RestfulSettings {
    fn default() -> Self {
        Self {
            protocol: default_restful_protocol(),
            port: default_restful_port(),
        }
    }
}

fn default_restful_protocol() -> String {
    "https".into()
}
fn default_restful_port() -> u16 {
    443
}

/// Everything needed to talk to a device after deployment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(default)]
    pub account: Account,
    #[serde(default)]
    pub snmp: SnmpSettings,
    #[serde(default)]
    pub netconf: NetconfSettings,
    #[serde(default)]
    pub restful: RestfulSettings,
    #[serde(default)]
    pub enable_snmp_setting: bool,
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|s| !s.is_empty()).map(SecretString::from))
}

// ── Device ──────────────────────────────────────────────────────────

/// A device snapshot from either the design or the discovery result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub model_name: String,
    #[serde(default)]
    pub device_type: DeviceType,
    /// Vendor name or numeric vendor id as reported by the device.
    #[serde(default)]
    pub vendor: String,
    #[serde(default)]
    pub profile_id: Option<ProfileId>,
    #[serde(default)]
    pub ipv4: Ipv4Settings,
    #[serde(default)]
    pub mac: Option<MacAddress>,
    #[serde(default)]
    pub serial_number: Option<String>,
    #[serde(default)]
    pub interfaces: Vec<Interface>,
    #[serde(default)]
    pub modules: ModularConfiguration,
    #[serde(default)]
    pub connection: ConnectionConfig,
    /// Hop count from the graph root; `-1` when unreachable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<i32>,
}

impl Device {
    pub fn new(id: impl Into<DeviceId>, model_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            model_name: model_name.into(),
            device_type: DeviceType::default(),
            vendor: String::new(),
            profile_id: None,
            ipv4: Ipv4Settings::default(),
            mac: None,
            serial_number: None,
            interfaces: Vec::new(),
            modules: ModularConfiguration::default(),
            connection: ConnectionConfig::default(),
            distance: None,
        }
    }

    pub fn ip(&self) -> Option<Ipv4Addr> {
        self.ipv4.address
    }

    /// IPv4 address as a host-order integer, `0` when unset.
    pub fn ip_number(&self) -> u32 {
        self.ipv4.address.map_or(0, u32::from)
    }

    /// Display name of an interface, falling back to its number.
    pub fn interface_name(&self, interface_id: InterfaceId) -> String {
        self.interfaces
            .iter()
            .find(|i| i.id == interface_id && !i.name.is_empty())
            .map_or_else(|| interface_id.to_string(), |i| i.name.clone())
    }

    /// Whether the device belongs to one of the given vendors (matched
    /// case-insensitively against the vendor name or id).
    pub fn is_vendor_owned(&self, vendors: &[String]) -> bool {
        vendors
            .iter()
            .any(|v| v.eq_ignore_ascii_case(self.vendor.trim()))
    }

    /// Copy of this snapshot with a computed hop distance.
    pub fn with_distance(&self, distance: i32) -> Self {
        Self {
            distance: Some(distance),
            ..self.clone()
        }
    }
}
