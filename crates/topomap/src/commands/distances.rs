//! `topomap distances`: list a topology's devices far-to-near from a root.

use std::net::Ipv4Addr;

use serde::Serialize;
use tabled::Tabled;

use topomap_core::reconcile::UNREACHABLE;
use topomap_core::{Device, DeviceId, MacAddress, TopologyGraph, sort_by_distance};

use crate::cli::DistancesArgs;
use crate::commands::RunContext;
use crate::error::CliError;
use crate::output::{self, or_dash};
use crate::source::read_snapshot;

#[derive(Serialize)]
struct DistanceEntry {
    device_id: DeviceId,
    model_name: String,
    ip: Option<Ipv4Addr>,
    mac: Option<MacAddress>,
    distance: Option<i32>,
}

impl From<Device> for DistanceEntry {
    fn from(d: Device) -> Self {
        Self {
            device_id: d.id,
            ip: d.ip(),
            model_name: d.model_name,
            mac: d.mac,
            distance: d.distance,
        }
    }
}

#[derive(Tabled)]
struct DistanceRow {
    #[tabled(rename = "Hops")]
    hops: String,
    #[tabled(rename = "ID")]
    id: DeviceId,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
}

impl From<&DistanceEntry> for DistanceRow {
    fn from(e: &DistanceEntry) -> Self {
        Self {
            hops: match e.distance {
                Some(UNREACHABLE) => "unreachable".into(),
                other => or_dash(other),
            },
            id: e.device_id,
            model: e.model_name.clone(),
            ip: or_dash(e.ip),
            mac: or_dash(e.mac.as_ref()),
        }
    }
}

pub fn handle(args: &DistancesArgs, ctx: &RunContext) -> Result<(), CliError> {
    let graph: TopologyGraph = read_snapshot(&args.topology)?;

    // An explicit root must exist; a stale recorded root falls back to IP order.
    let root = match args.root.map(DeviceId) {
        Some(root) if graph.device(root).is_none() => {
            return Err(CliError::DeviceNotFound {
                device_id: root.to_string(),
                topology: args.topology.display().to_string(),
            });
        }
        Some(root) => Some(root),
        None => graph.source_device_id,
    };

    let entries: Vec<DistanceEntry> = sort_by_distance(&graph.devices, &graph.links, root)
        .into_iter()
        .map(DistanceEntry::from)
        .collect();

    let text = output::render(ctx.format, &entries, |e| {
        let rows: Vec<DistanceRow> = e.iter().map(DistanceRow::from).collect();
        output::table(&rows)
    })?;
    output::print_output(&text, ctx.quiet);
    Ok(())
}
