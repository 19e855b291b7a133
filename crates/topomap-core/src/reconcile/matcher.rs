// ── Topology matcher ──
//
// Breadth-first co-walk of the offline and online graphs. Starting from
// the paired roots, every eligible offline neighbour is paired with
// whatever online device sits behind the same interface id, then checked
// for model and module equivalence. Per-device problems become row
// verdicts; only inconsistent graphs or catalogs are errors.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use tracing::debug;

use crate::context::ReconciliationContext;
use crate::error::{CoreError, GraphSide};
use crate::model::{
    Device, DeviceId, DeviceIndex, DeviceLinks, InterfaceId, MapStatus, MappingResult,
    TopologyGraph,
};
use crate::reconcile::report::{DeviceVerdict, MatchOutcome, ReconciliationResultBuilder};

pub const MODEL_NAME_MISMATCH: &str = "Check Model Name failed";
pub const ETHERNET_MODULE_MISMATCH: &str = "Check Ethernet Module failed";
pub const POWER_MODULE_MISMATCH: &str = "Check Power Module failed";
pub const ONLINE_DEVICE_NOT_FOUND: &str = "Online device not found";

/// Runs one matching pass. A trait so candidate ranking can be driven by
/// a stand-in in tests.
pub trait TopologyMatch {
    fn match_topology(
        &self,
        ctx: &ReconciliationContext,
        offline: &TopologyGraph,
        online: &TopologyGraph,
    ) -> Result<MappingResult, CoreError>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TopologyMatcher;

impl TopologyMatch for TopologyMatcher {
    fn match_topology(
        &self,
        ctx: &ReconciliationContext,
        offline: &TopologyGraph,
        online: &TopologyGraph,
    ) -> Result<MappingResult, CoreError> {
        let outcome = MatchWalk::new(ctx, offline, online).run()?;
        Ok(ReconciliationResultBuilder::new(offline, online).build(&outcome))
    }
}

// ── Device check ────────────────────────────────────────────────────

/// Compare a paired device: model name, then ethernet modules, then power
/// modules unless the hardware has a built-in supply. First mismatch wins.
pub fn check_device(offline: &Device, online: &Device, built_in_power: bool) -> Result<(), &'static str> {
    if offline.model_name != online.model_name {
        return Err(MODEL_NAME_MISMATCH);
    }
    if offline.modules.ethernet != online.modules.ethernet {
        return Err(ETHERNET_MODULE_MISMATCH);
    }
    if !built_in_power && offline.modules.power != online.modules.power {
        return Err(POWER_MODULE_MISMATCH);
    }
    Ok(())
}

fn port_not_found(name: &str) -> String {
    format!("Port ({name}) not found")
}

// ── Walk state ──────────────────────────────────────────────────────

struct MatchWalk<'a> {
    ctx: &'a ReconciliationContext,
    offline: &'a TopologyGraph,
    online: &'a TopologyGraph,
    offline_index: DeviceIndex<'a>,
    online_index: DeviceIndex<'a>,
    offline_links: DeviceLinks,
    online_links: DeviceLinks,
    eligible: BTreeSet<DeviceId>,

    verdicts: BTreeMap<DeviceId, DeviceVerdict>,
    found_online: BTreeSet<DeviceId>,
    online_mapped: BTreeSet<DeviceId>,
    /// Online devices some offline verdict already points at.
    claimed_online: BTreeSet<DeviceId>,
    port_missing: BTreeSet<DeviceId>,
}

impl<'a> MatchWalk<'a> {
    fn new(ctx: &'a ReconciliationContext, offline: &'a TopologyGraph, online: &'a TopologyGraph) -> Self {
        let eligible = offline
            .devices
            .iter()
            .filter(|d| ctx.is_eligible(d))
            .map(|d| d.id)
            .collect();
        Self {
            ctx,
            offline,
            online,
            offline_index: offline.index(),
            online_index: online.index(),
            offline_links: offline.links_by_device(),
            online_links: online.links_by_device(),
            eligible,
            verdicts: BTreeMap::new(),
            found_online: BTreeSet::new(),
            online_mapped: BTreeSet::new(),
            claimed_online: BTreeSet::new(),
            port_missing: BTreeSet::new(),
        }
    }

    fn run(mut self) -> Result<MatchOutcome, CoreError> {
        let offline_root = self.offline.source_device_id;
        let mut queue: VecDeque<DeviceId> = VecDeque::new();
        if let Some(root) = offline_root.filter(|r| self.eligible.contains(r)) {
            queue.push_back(root);
        }

        while !self.online.devices.is_empty() {
            let Some(offline_id) = queue.pop_front() else {
                break;
            };
            self.ctx.checkpoint()?;

            let online_id = if Some(offline_id) == offline_root {
                self.online.source_device_id
            } else {
                let paired = self.verdicts.get(&offline_id).and_then(|v| v.online_device_id);
                match paired {
                    Some(id) if !self.online_mapped.contains(&id) => Some(id),
                    _ => None,
                }
            };
            let Some(online_id) = online_id else {
                debug!(offline = %offline_id, "no online pairing, skipping");
                continue;
            };

            self.visit(offline_id, online_id, &mut queue)?;
        }

        self.escalate_port_warnings();
        self.classify_unvisited();

        Ok(MatchOutcome {
            verdicts: self.verdicts,
            found_online: self.found_online,
        })
    }

    fn visit(
        &mut self,
        offline_id: DeviceId,
        online_id: DeviceId,
        queue: &mut VecDeque<DeviceId>,
    ) -> Result<(), CoreError> {
        let offline_device = self.offline_device(offline_id)?;
        let online_device = self.online_device(online_id)?;
        self.found_online.insert(online_id);
        self.online_mapped.insert(online_id);

        let built_in_power = self.ctx.profile_of(online_device)?.built_in_power;
        debug!(offline = %offline_id, online = %online_id, "pairing devices");
        self.record_check(offline_device, online_device, built_in_power);

        // Enqueue unclassified eligible neighbours.
        for neighbour in self.offline_links.neighbours(offline_id) {
            if !self.verdicts.contains_key(&neighbour)
                && !queue.contains(&neighbour)
                && self.eligible.contains(&neighbour)
            {
                queue.push_back(neighbour);
            }
        }

        let offline_leave: BTreeMap<InterfaceId, DeviceId> = self
            .offline_links
            .leave_interfaces(offline_id)
            .into_iter()
            .filter(|(_, opposite)| self.eligible.contains(opposite))
            .collect();
        let online_leave = self.online_links.leave_interfaces(online_id);

        for (interface_id, offline_opposite) in offline_leave {
            let Some(&online_opposite) = online_leave.get(&interface_id) else {
                let name = offline_device.interface_name(interface_id);
                self.record_missing_port(offline_id, online_id, &name);
                continue;
            };

            if self.verdicts.contains_key(&offline_opposite) {
                continue;
            }
            let opposite_offline = self.offline_device(offline_opposite)?;
            let opposite_online = self.online_device(online_opposite)?;
            self.found_online.insert(online_opposite);
            if self.online_mapped.contains(&online_opposite) {
                continue;
            }
            // Another neighbour already took this device; leave the
            // offline one unpaired so it ends up NotFound.
            if self.claimed_online.contains(&online_opposite) {
                debug!(offline = %offline_opposite, online = %online_opposite, "online device already claimed");
                continue;
            }

            let built_in_power = self.ctx.profile_of(opposite_online)?.built_in_power;
            self.record_check(opposite_offline, opposite_online, built_in_power);
        }

        Ok(())
    }

    fn offline_device(&self, id: DeviceId) -> Result<&'a Device, CoreError> {
        self.offline_index.by_id(id).ok_or(CoreError::DeviceNotFound {
            graph: GraphSide::Offline,
            device_id: id,
        })
    }

    fn online_device(&self, id: DeviceId) -> Result<&'a Device, CoreError> {
        self.online_index.by_id(id).ok_or(CoreError::DeviceNotFound {
            graph: GraphSide::Online,
            device_id: id,
        })
    }

    /// Classify a pairing unless the offline device already has a verdict.
    fn record_check(&mut self, offline: &Device, online: &Device, built_in_power: bool) {
        if self.verdicts.contains_key(&offline.id) {
            return;
        }
        let verdict = match check_device(offline, online, built_in_power) {
            Ok(()) => DeviceVerdict::new(Some(online.id), MapStatus::Success, None),
            Err(reason) => {
                debug!(offline = %offline.id, online = %online.id, reason, "device check failed");
                DeviceVerdict::new(Some(online.id), MapStatus::Failed, Some(reason.to_owned()))
            }
        };
        self.claimed_online.insert(online.id);
        self.verdicts.insert(offline.id, verdict);
    }

    fn record_missing_port(&mut self, offline_id: DeviceId, online_id: DeviceId, name: &str) {
        match self.verdicts.get_mut(&offline_id) {
            Some(verdict) if verdict.has_error() => {
                if let Some(error) = verdict.error.as_mut() {
                    error.push_str(", ");
                    error.push_str(&port_not_found(name));
                }
            }
            _ => {
                self.verdicts.insert(
                    offline_id,
                    DeviceVerdict::new(Some(online_id), MapStatus::Failed, Some(port_not_found(name))),
                );
                self.port_missing.insert(offline_id);
            }
        }
    }

    /// A device failed only for missing ports becomes a warning when a
    /// link neighbour is in the same situation.
    fn escalate_port_warnings(&mut self) {
        let escalate: Vec<DeviceId> = self
            .verdicts
            .iter()
            .filter(|(id, v)| v.status == MapStatus::Failed && self.port_missing.contains(*id))
            .filter(|(id, _)| {
                self.offline_links
                    .neighbours(**id)
                    .iter()
                    .any(|n| self.port_missing.contains(n))
            })
            .map(|(id, _)| *id)
            .collect();

        for id in escalate {
            if let Some(verdict) = self.verdicts.get_mut(&id) {
                verdict.status = MapStatus::Warning;
            }
        }
    }

    fn classify_unvisited(&mut self) {
        for device in &self.offline.devices {
            if self.verdicts.contains_key(&device.id) {
                continue;
            }
            let verdict = if self.eligible.contains(&device.id) {
                DeviceVerdict::new(None, MapStatus::NotFound, Some(ONLINE_DEVICE_NOT_FOUND.to_owned()))
            } else {
                DeviceVerdict::new(None, MapStatus::Skip, None)
            };
            self.verdicts.insert(device.id, verdict);
        }
    }
}
