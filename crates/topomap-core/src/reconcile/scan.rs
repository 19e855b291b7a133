// ── Scan mapping ──
//
// Pairing without topology: every discovered device takes the first
// still-unassigned design device with the same model and modules. Used
// for bench provisioning where devices are scanned before being cabled.

use std::collections::BTreeSet;

use tracing::debug;

use crate::context::ReconciliationContext;
use crate::error::CoreError;
use crate::model::{Device, DeviceId, MapDeviceResultItem, MapStatus, MappingResult, TopologyGraph};
use crate::reconcile::distance::sort_by_distance;

/// How far a design device got before being rejected. Higher is more
/// specific; the most specific rejection is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Rejection {
    NotRemaining,
    ModelName,
    PowerModule,
    EthernetModule,
}

impl Rejection {
    fn message(self) -> &'static str {
        match self {
            Self::NotRemaining => "No remaining devices",
            Self::ModelName => "Remaining devices have different Model Name",
            Self::PowerModule => "Remaining devices have different Power Module",
            Self::EthernetModule => "Remaining devices have different Ethernet Module",
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScanMapper;

impl ScanMapper {
    /// Pair discovered devices with design devices from `remaining`.
    ///
    /// Both sides are walked far-to-near from their roots (IP descending
    /// without one). `deploy` is false as soon as one discovered device
    /// finds no partner.
    pub fn map(
        &self,
        ctx: &ReconciliationContext,
        offline: &TopologyGraph,
        online: &TopologyGraph,
        remaining: &BTreeSet<DeviceId>,
    ) -> Result<MappingResult, CoreError> {
        let offline_devices = sort_by_distance(&offline.devices, &offline.links, offline.source_device_id);
        let online_devices = sort_by_distance(&online.devices, &online.links, online.source_device_id);
        let mut remaining = remaining.clone();
        let mut rows: Vec<MapDeviceResultItem> = Vec::with_capacity(online_devices.len());

        for real in &online_devices {
            ctx.checkpoint()?;
            let built_in_power = ctx.profile_of(real)?.built_in_power;
            let id = u32::try_from(rows.len() + 1).unwrap_or(u32::MAX);

            match pick(&offline_devices, real, built_in_power, &remaining) {
                Ok(design) => {
                    remaining.remove(&design.id);
                    debug!(offline = %design.id, online = %real.id, "scan pairing");
                    rows.push(MapDeviceResultItem {
                        id,
                        offline_device_id: Some(design.id),
                        online_device_id: Some(real.id),
                        offline_ip: design.ip(),
                        online_ip: real.ip(),
                        online_mac: real.mac.clone(),
                        model_name: design.model_name.clone(),
                        online_model_name: Some(real.model_name.clone()),
                        status: MapStatus::Success,
                        error: None,
                    });
                }
                Err(rejection) => {
                    debug!(online = %real.id, reason = rejection.message(), "no scan pairing");
                    rows.push(MapDeviceResultItem {
                        id,
                        offline_device_id: None,
                        online_device_id: Some(real.id),
                        offline_ip: None,
                        online_ip: real.ip(),
                        online_mac: real.mac.clone(),
                        model_name: real.model_name.clone(),
                        online_model_name: Some(real.model_name.clone()),
                        status: MapStatus::NotFound,
                        error: Some(rejection.message().to_owned()),
                    });
                }
            }
        }

        Ok(MappingResult::new(rows))
    }
}

fn pick<'d>(
    candidates: &'d [Device],
    real: &Device,
    built_in_power: bool,
    remaining: &BTreeSet<DeviceId>,
) -> Result<&'d Device, Rejection> {
    // An empty design has nothing left to offer.
    let mut worst = Rejection::NotRemaining;
    let mut reject = |r: Rejection| worst = worst.max(r);

    for design in candidates {
        if !remaining.contains(&design.id) {
            reject(Rejection::NotRemaining);
        } else if design.model_name != real.model_name {
            reject(Rejection::ModelName);
        } else if !built_in_power && design.modules.power != real.modules.power {
            reject(Rejection::PowerModule);
        } else if design.modules.ethernet != real.modules.ethernet {
            reject(Rejection::EthernetModule);
        } else {
            return Ok(design);
        }
    }
    Err(worst)
}
