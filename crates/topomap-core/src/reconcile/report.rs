// ── Report assembly ──
//
// Turns the matcher's per-device verdicts into the final mapping report,
// and a mapped report into the carry-over plan the deployment step uses
// to push IP settings and credentials onto real devices.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::net::Ipv4Addr;

use crate::model::{
    ConnectionConfig, DeviceId, DeviceIndex, MacAddress, MapDeviceResultItem, MapStatus,
    MappingResult, TopologyGraph,
};

pub const IP_DUPLICATED_MESSAGE: &str = "The IP duplicated with the offline design device";

// ── Verdicts ────────────────────────────────────────────────────────

/// Matcher verdict for one offline device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceVerdict {
    pub online_device_id: Option<DeviceId>,
    pub status: MapStatus,
    pub error: Option<String>,
}

impl DeviceVerdict {
    pub fn new(online_device_id: Option<DeviceId>, status: MapStatus, error: Option<String>) -> Self {
        Self {
            online_device_id,
            status,
            error,
        }
    }

    pub fn has_error(&self) -> bool {
        self.error.as_deref().is_some_and(|e| !e.is_empty())
    }
}

/// Everything the matcher learned in one pass.
#[derive(Debug, Clone, Default)]
pub struct MatchOutcome {
    /// Offline device id → verdict, one entry per offline device.
    pub verdicts: BTreeMap<DeviceId, DeviceVerdict>,
    /// Online devices touched during the walk, paired or not.
    pub found_online: BTreeSet<DeviceId>,
}

// ── ReconciliationResultBuilder ─────────────────────────────────────

pub struct ReconciliationResultBuilder<'a> {
    offline: DeviceIndex<'a>,
    online: &'a TopologyGraph,
    online_index: DeviceIndex<'a>,
}

impl<'a> ReconciliationResultBuilder<'a> {
    pub fn new(offline: &'a TopologyGraph, online: &'a TopologyGraph) -> Self {
        Self {
            offline: offline.index(),
            online,
            online_index: online.index(),
        }
    }

    /// Offline rows first in ascending offline id, then unpaired online
    /// devices in discovery order. Row ids follow that order from 1.
    pub fn build(&self, outcome: &MatchOutcome) -> MappingResult {
        let mut rows: Vec<MapDeviceResultItem> = Vec::with_capacity(outcome.verdicts.len());
        let mut mapped_ips: BTreeSet<Ipv4Addr> = BTreeSet::new();
        let mut checked_ips: BTreeSet<Ipv4Addr> = BTreeSet::new();

        for (offline_id, verdict) in &outcome.verdicts {
            let offline = self.offline.by_id(*offline_id);
            let online = verdict
                .online_device_id
                .and_then(|id| self.online_index.by_id(id));
            let offline_ip = offline.and_then(|d| d.ip());

            if let Some(ip) = offline_ip {
                if verdict.status.is_mapped() {
                    mapped_ips.insert(ip);
                } else if verdict.status == MapStatus::Checked {
                    checked_ips.insert(ip);
                }
            }

            rows.push(MapDeviceResultItem {
                id: next_row_id(&rows),
                offline_device_id: Some(*offline_id),
                online_device_id: online.map(|d| d.id),
                offline_ip,
                online_ip: online.and_then(|d| d.ip()),
                online_mac: online.and_then(|d| d.mac.clone()),
                model_name: offline.map(|d| d.model_name.clone()).unwrap_or_default(),
                online_model_name: online.map(|d| d.model_name.clone()),
                status: verdict.status,
                error: verdict.error.clone().filter(|e| !e.is_empty()),
            });
        }

        let offline_deployable = !rows.iter().any(|r| r.status.is_blocking());

        for device in &self.online.devices {
            if outcome.found_online.contains(&device.id) {
                continue;
            }
            let online_ip = device.ip();
            let duplicated = offline_deployable && online_ip.is_some_and(|ip| mapped_ips.contains(&ip));
            let (status, error) = if duplicated {
                (MapStatus::Failed, Some(IP_DUPLICATED_MESSAGE.to_owned()))
            } else {
                (MapStatus::Skip, None)
            };

            if status == MapStatus::Skip && online_ip.is_some_and(|ip| checked_ips.contains(&ip)) {
                continue;
            }

            rows.push(MapDeviceResultItem {
                id: next_row_id(&rows),
                offline_device_id: None,
                online_device_id: Some(device.id),
                offline_ip: None,
                online_ip,
                online_mac: device.mac.clone(),
                model_name: device.model_name.clone(),
                online_model_name: Some(device.model_name.clone()),
                status,
                error,
            });
        }

        MappingResult::new(rows)
    }
}

fn next_row_id(rows: &[MapDeviceResultItem]) -> u32 {
    u32::try_from(rows.len()).map_or(u32::MAX, |n| n.saturating_add(1))
}

// ── Carry-over plan ─────────────────────────────────────────────────

/// IP change to apply to a mapped device during deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IpSettingEntry {
    pub offline_device_id: DeviceId,
    pub offline_ip: Option<Ipv4Addr>,
    pub online_ip: Ipv4Addr,
    pub online_mac: Option<MacAddress>,
    pub subnet_mask: Ipv4Addr,
    pub gateway: Option<Ipv4Addr>,
    pub dns1: Option<Ipv4Addr>,
    pub dns2: Option<Ipv4Addr>,
}

/// Identity and connection settings learned from the real device.
#[derive(Debug, Clone, Serialize)]
pub struct DeviceCarryOver {
    pub offline_device_id: DeviceId,
    pub online_device_id: DeviceId,
    pub online_mac: Option<MacAddress>,
    pub connection: ConnectionConfig,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CarryOverPlan {
    pub ip_settings: Vec<IpSettingEntry>,
    pub devices: Vec<DeviceCarryOver>,
}

impl CarryOverPlan {
    /// Plan for a deployable report; empty when `deploy` is false.
    pub fn from_result(
        result: &MappingResult,
        offline: &TopologyGraph,
        online: &TopologyGraph,
        default_subnet_mask: Ipv4Addr,
    ) -> Self {
        let mut plan = Self::default();
        if !result.deploy {
            return plan;
        }

        let offline_index = offline.index();
        let online_index = online.index();

        for row in result.rows.iter().filter(|r| r.status.is_mapped()) {
            let (Some(offline_id), Some(online_ip)) = (row.offline_device_id, row.online_ip) else {
                continue;
            };
            let design = offline_index.by_id(offline_id);

            if row.offline_ip != Some(online_ip) {
                let ipv4 = design.map(|d| d.ipv4.clone()).unwrap_or_default();
                plan.ip_settings.push(IpSettingEntry {
                    offline_device_id: offline_id,
                    offline_ip: row.offline_ip,
                    online_ip,
                    online_mac: row.online_mac.clone(),
                    subnet_mask: ipv4.subnet_mask.unwrap_or(default_subnet_mask),
                    gateway: ipv4.gateway,
                    dns1: ipv4.dns1,
                    dns2: ipv4.dns2,
                });
            }

            if design.is_none() {
                continue;
            }
            let Some(real) = row.online_device_id.and_then(|id| online_index.by_id(id)) else {
                continue;
            };
            plan.devices.push(DeviceCarryOver {
                offline_device_id: offline_id,
                online_device_id: real.id,
                online_mac: row.online_mac.clone(),
                connection: real.connection.clone(),
            });
        }

        plan
    }

    pub fn is_empty(&self) -> bool {
        self.ip_settings.is_empty() && self.devices.is_empty()
    }
}
