// ── Scan mapping job ──

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::info;

use crate::access::{DeviceAccessLayer, ProjectStore};
use crate::config::ReconcileConfig;
use crate::context::ReconciliationContext;
use crate::error::CoreError;
use crate::job::controller::{Job, JobHandle};
use crate::job::discovery::{discover, prefetch_profiles};
use crate::model::{DeviceId, MappingResult, TopologyGraph};
use crate::reconcile::{CarryOverPlan, ScanMapper};

const DISCOVERING: u8 = 20;
const DISCOVERED: u8 = 80;

/// Pair discovered devices with not-yet-deployed design devices by model
/// and modules only.
pub struct ScanMappingJob<A, S> {
    pub access: Arc<A>,
    pub store: Arc<S>,
    pub project_id: String,
    /// Design devices still waiting for hardware. `None` = all of them.
    pub remaining: Option<BTreeSet<DeviceId>>,
    pub config: ReconcileConfig,
}

#[derive(Debug, Clone)]
pub struct ScanMappingOutput {
    pub project_id: String,
    pub online: TopologyGraph,
    pub result: MappingResult,
    pub carry_over: CarryOverPlan,
    pub discovery_errors: Vec<String>,
}

impl<A, S> Job for ScanMappingJob<A, S>
where
    A: DeviceAccessLayer,
    S: ProjectStore,
{
    type Output = ScanMappingOutput;
    const NAME: &'static str = "scan-mapping";

    async fn run(self, handle: JobHandle) -> Result<ScanMappingOutput, CoreError> {
        let offline = self.store.load_design_topology(&self.project_id).await?;
        let remaining = self
            .remaining
            .unwrap_or_else(|| offline.devices.iter().map(|d| d.id).collect());

        handle.set_progress(DISCOVERING);
        let discovery = discover(self.access.as_ref(), &handle, self.config.discovery_timeout).await?;
        let profiles = prefetch_profiles(self.access.as_ref(), &discovery.online, &handle).await?;
        handle.set_progress(DISCOVERED);

        let ctx = ReconciliationContext::new(self.config, profiles, handle.cancel_token());
        let result = ScanMapper.map(&ctx, &offline, &discovery.online, &remaining)?;
        let carry_over = CarryOverPlan::from_result(
            &result,
            &offline,
            &discovery.online,
            ctx.config.default_subnet_mask,
        );

        info!(
            project = %self.project_id,
            deploy = result.deploy,
            rows = result.rows.len(),
            "scan mapping complete"
        );

        Ok(ScanMappingOutput {
            project_id: self.project_id,
            online: discovery.online,
            result,
            carry_over,
            discovery_errors: discovery.errors,
        })
    }
}
