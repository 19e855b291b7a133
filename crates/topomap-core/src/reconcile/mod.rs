// ── Reconciliation pipeline ──
//
// Layer the discovered graph, propose offline roots, match once per
// candidate, keep the best report and derive the carry-over plan. Pure
// compute: all I/O happened before this point.

pub mod candidates;
pub mod distance;
pub mod matcher;
pub mod ranker;
pub mod report;
pub mod scan;

use tracing::info;

use crate::context::ReconciliationContext;
use crate::error::CoreError;
use crate::model::{DeviceId, MappingResult, TopologyGraph};

pub use candidates::{SourceDeviceCandidate, find_source_candidates};
pub use distance::{UNREACHABLE, compute_distances, sort_by_distance};
pub use matcher::{TopologyMatch, TopologyMatcher, check_device};
pub use ranker::{RankedMatch, rank_candidates};
pub use report::{
    CarryOverPlan, DeviceCarryOver, DeviceVerdict, IpSettingEntry, MatchOutcome,
    ReconciliationResultBuilder,
};
pub use scan::ScanMapper;

/// Result of one full reconciliation pass.
#[derive(Debug, Clone)]
pub struct Reconciliation {
    /// The discovered graph with hop distances filled in.
    pub online: TopologyGraph,
    /// Offline root the winning report was computed from.
    pub source: Option<DeviceId>,
    pub result: MappingResult,
    pub carry_over: CarryOverPlan,
}

/// Run the whole pipeline on two in-memory graphs.
///
/// `on_progress(done, total)` fires after each evaluated candidate.
pub fn reconcile<M, F>(
    matcher: &M,
    ctx: &ReconciliationContext,
    offline: &TopologyGraph,
    online: &TopologyGraph,
    mut on_progress: F,
) -> Result<Reconciliation, CoreError>
where
    M: TopologyMatch + ?Sized,
    F: FnMut(usize, usize),
{
    reject_self_links(offline)?;
    let online = layer(online)?;
    ctx.checkpoint()?;

    let candidates = find_source_candidates(offline, &online);
    let ranked = rank_candidates(matcher, ctx, offline, &online, &candidates, &mut on_progress)?;

    let carry_over = CarryOverPlan::from_result(
        &ranked.result,
        offline,
        &online,
        ctx.config.default_subnet_mask,
    );

    info!(
        source = ?ranked.source,
        deploy = ranked.result.deploy,
        rows = ranked.result.rows.len(),
        ip_changes = carry_over.ip_settings.len(),
        "reconciliation finished"
    );

    Ok(Reconciliation {
        online,
        source: ranked.source,
        result: ranked.result,
        carry_over,
    })
}

/// A design link whose ends sit on one device cannot be cabled.
fn reject_self_links(offline: &TopologyGraph) -> Result<(), CoreError> {
    match offline.links.iter().find(|l| l.is_self_link()) {
        Some(link) => Err(CoreError::SelfLink {
            device_id: link.source.device_id,
            interface_id: link.source.interface_id,
        }),
        None => Ok(()),
    }
}

/// Fill in hop distances when the graph has a root. A root that is not
/// part of its own graph is a structural error.
fn layer(online: &TopologyGraph) -> Result<TopologyGraph, CoreError> {
    let Some(root) = online.source_device_id else {
        return Ok(online.clone());
    };
    let devices = compute_distances(&online.devices, &online.links, root)?;
    Ok(TopologyGraph {
        devices,
        links: online.links.clone(),
        source_device_id: Some(root),
    })
}
