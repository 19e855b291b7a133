// ── Discovery phase ──
//
// Shared by every mapping job: crawl the live network through the access
// layer, drop links that loop back onto their own device, and resolve the
// hardware profiles the matcher will need.

use std::collections::BTreeSet;
use std::time::Duration;

use tracing::{debug, warn};

use crate::access::DeviceAccessLayer;
use crate::error::CoreError;
use crate::job::controller::JobHandle;
use crate::model::{Link, ProfileCatalog, ProfileId, TopologyGraph};

/// A discovered graph with per-device problems split out.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    pub online: TopologyGraph,
    /// Non-fatal problems found while cleaning up the raw result.
    pub errors: Vec<String>,
}

/// Run discovery, racing it against cancellation and the optional timeout.
pub async fn discover<A>(
    access: &A,
    handle: &JobHandle,
    timeout: Option<Duration>,
) -> Result<Discovery, CoreError>
where
    A: DeviceAccessLayer + ?Sized,
{
    handle.checkpoint()?;
    let cancel = handle.cancel_token();
    let crawl = access.discover_topology(cancel.child_token());

    let raw = tokio::select! {
        biased;
        () = cancel.cancelled() => return Err(CoreError::Cancelled),
        res = async {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, crawl).await.map_err(|_| {
                    CoreError::Discovery {
                        message: format!("no result after {}s", limit.as_secs()),
                    }
                })?,
                None => crawl.await,
            }
        } => res?,
    };
    handle.checkpoint()?;

    let discovery = drop_self_links(raw);
    debug!(
        devices = discovery.online.devices.len(),
        links = discovery.online.links.len(),
        dropped = discovery.errors.len(),
        "discovery complete"
    );
    Ok(discovery)
}

/// Links whose endpoints sit on one device are reported and removed.
pub fn drop_self_links(raw: TopologyGraph) -> Discovery {
    let mut errors = Vec::new();
    let (links, looped): (Vec<Link>, Vec<Link>) =
        raw.links.into_iter().partition(|l| !l.is_self_link());

    for link in looped {
        let err = CoreError::SelfLink {
            device_id: link.source.device_id,
            interface_id: link.source.interface_id,
        };
        warn!(error = %err, link = link.id, "dropping discovered link");
        errors.push(err.to_string());
    }

    Discovery {
        online: TopologyGraph {
            devices: raw.devices,
            links,
            source_device_id: raw.source_device_id,
        },
        errors,
    }
}

/// Resolve every profile referenced by the discovered devices.
///
/// Unknown profiles are skipped here; they only become fatal if matching
/// actually needs them.
pub async fn prefetch_profiles<A>(
    access: &A,
    online: &TopologyGraph,
    handle: &JobHandle,
) -> Result<ProfileCatalog, CoreError>
where
    A: DeviceAccessLayer + ?Sized,
{
    let ids: BTreeSet<ProfileId> = online.devices.iter().filter_map(|d| d.profile_id).collect();
    let mut catalog = ProfileCatalog::new();

    for id in ids {
        handle.checkpoint()?;
        match access.get_device_profile(id).await {
            Ok(profile) => catalog.insert(profile),
            Err(CoreError::ProfileNotFound { profile_id }) => {
                warn!(%profile_id, "device profile unknown to access layer");
            }
            Err(e) => return Err(e),
        }
    }

    Ok(catalog)
}
