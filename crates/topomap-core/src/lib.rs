//! Topology reconciliation engine.
//!
//! Matches a designed ("offline") network topology onto the topology
//! discovered on the wire ("online") and decides whether the design can be
//! deployed onto the real hardware:
//!
//! - **[`reconcile`](mod@reconcile)** : the pure pipeline: hop-distance layering
//!   ([`compute_distances`]), offline root proposals
//!   ([`find_source_candidates`]), the breadth-first co-walk
//!   ([`TopologyMatcher`]), candidate ranking ([`rank_candidates`]) and
//!   report assembly ([`ReconciliationResultBuilder`], [`CarryOverPlan`]).
//!
//! - **[`job`]** : the cancellable job harness ([`JobController`]) and the
//!   two jobs built on it, [`TopologyMappingJob`] and [`ScanMappingJob`].
//!
//! - **[`access`]** : the interfaces the engine consumes but does not
//!   implement: [`DeviceAccessLayer`] (live devices) and [`ProjectStore`]
//!   (designs).
//!
//! - **Domain model** ([`model`]) : value snapshots of devices, links,
//!   graphs, profiles and per-device verdicts.

pub mod access;
pub mod config;
pub mod context;
pub mod error;
pub mod job;
pub mod model;
pub mod reconcile;

// ── Primary re-exports ──────────────────────────────────────────────
pub use access::{DeviceAccessLayer, ProjectStore};
pub use config::ReconcileConfig;
pub use context::ReconciliationContext;
pub use error::{CoreError, GraphSide};
pub use job::{
    Job, JobController, JobHandle, JobState, JobStatus, ScanMappingJob, ScanMappingOutput,
    TopologyMappingJob, TopologyMappingOutput,
};
pub use reconcile::{
    CarryOverPlan, DeviceCarryOver, IpSettingEntry, RankedMatch, Reconciliation,
    ReconciliationResultBuilder, ScanMapper, SourceDeviceCandidate, TopologyMatch,
    TopologyMatcher, compute_distances, find_source_candidates, rank_candidates,
    sort_by_distance,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ConnectionConfig, Device, DeviceId, DeviceIndex, DeviceProfile, DeviceType, Endpoint,
    Interface, InterfaceId, Ipv4Settings, Link, MacAddress, MapDeviceResultItem, MapStatus,
    MappingResult, ModularConfiguration, ProfileCatalog, ProfileId, TopologyGraph,
};
