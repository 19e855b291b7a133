// ── Candidate ranking ──
//
// One matching pass per source candidate. A perfect result returns at
// once; otherwise deployable results beat blocked ones, then fewer
// warnings (deployable) or fewer failures (blocked), then lower IP.

use std::cmp::Ordering;

use tracing::{debug, info};

use crate::context::ReconciliationContext;
use crate::error::CoreError;
use crate::model::{DeviceId, MappingResult, TopologyGraph};
use crate::reconcile::candidates::SourceDeviceCandidate;
use crate::reconcile::matcher::TopologyMatch;

/// The chosen matching and the offline root it was computed from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedMatch {
    /// `None` when no candidate was proposed and the offline graph's own
    /// root was used.
    pub source: Option<DeviceId>,
    pub result: MappingResult,
}

/// Match once per candidate and keep the best result.
///
/// With no candidates, matches once against `offline` unchanged.
/// `on_candidate(done, total)` fires after each evaluated candidate.
pub fn rank_candidates<M, F>(
    matcher: &M,
    ctx: &ReconciliationContext,
    offline: &TopologyGraph,
    online: &TopologyGraph,
    candidates: &[SourceDeviceCandidate],
    mut on_candidate: F,
) -> Result<RankedMatch, CoreError>
where
    M: TopologyMatch + ?Sized,
    F: FnMut(usize, usize),
{
    if candidates.is_empty() {
        ctx.checkpoint()?;
        let result = matcher.match_topology(ctx, offline, online)?;
        on_candidate(1, 1);
        return Ok(RankedMatch {
            source: offline.source_device_id,
            result,
        });
    }

    let total = candidates.len();
    let mut evaluated: Vec<(&SourceDeviceCandidate, MappingResult)> = Vec::with_capacity(total);

    for (n, candidate) in candidates.iter().enumerate() {
        ctx.checkpoint()?;
        let rooted = offline.with_source(candidate.offline_device_id);
        let result = matcher.match_topology(ctx, &rooted, online)?;
        on_candidate(n + 1, total);

        debug!(
            candidate = %candidate.offline_device_id,
            deploy = result.deploy,
            warnings = result.warning_count(),
            failures = result.failure_count(),
            "candidate evaluated"
        );

        if result.is_perfect() {
            info!(source = %candidate.offline_device_id, "perfect match, skipping remaining candidates");
            return Ok(RankedMatch {
                source: Some(candidate.offline_device_id),
                result,
            });
        }
        evaluated.push((candidate, result));
    }

    evaluated.sort_by(|(ca, ra), (cb, rb)| compare_results(ra, rb).then(ca.ip_number.cmp(&cb.ip_number)));

    let (candidate, result) = evaluated
        .into_iter()
        .next()
        .ok_or_else(|| CoreError::Internal("no candidate result to rank".into()))?;
    info!(source = %candidate.offline_device_id, deploy = result.deploy, "best candidate selected");
    Ok(RankedMatch {
        source: Some(candidate.offline_device_id),
        result,
    })
}

fn compare_results(a: &MappingResult, b: &MappingResult) -> Ordering {
    match (a.deploy, b.deploy) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (true, true) => a.warning_count().cmp(&b.warning_count()),
        (false, false) => a.failure_count().cmp(&b.failure_count()),
    }
}
