// ── Topology mapping job ──

use std::sync::Arc;

use tracing::info;

use crate::access::{DeviceAccessLayer, ProjectStore};
use crate::config::ReconcileConfig;
use crate::context::ReconciliationContext;
use crate::error::CoreError;
use crate::job::controller::{Job, JobHandle};
use crate::job::discovery::{discover, prefetch_profiles};
use crate::reconcile::{Reconciliation, TopologyMatcher, reconcile};

/// Progress milestones, in percent.
const LOADED: u8 = 10;
const DISCOVERING: u8 = 20;
const DISCOVERED: u8 = 60;
const PREPARED: u8 = 70;
const MATCH_SPAN: usize = 20;

/// Load a design, discover the live network and reconcile the two.
pub struct TopologyMappingJob<A, S> {
    pub access: Arc<A>,
    pub store: Arc<S>,
    pub project_id: String,
    pub config: ReconcileConfig,
}

impl<A, S> TopologyMappingJob<A, S> {
    pub fn new(access: Arc<A>, store: Arc<S>, project_id: impl Into<String>, config: ReconcileConfig) -> Self {
        Self {
            access,
            store,
            project_id: project_id.into(),
            config,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TopologyMappingOutput {
    pub project_id: String,
    pub reconciliation: Reconciliation,
    pub discovery_errors: Vec<String>,
}

impl<A, S> Job for TopologyMappingJob<A, S>
where
    A: DeviceAccessLayer,
    S: ProjectStore,
{
    type Output = TopologyMappingOutput;
    const NAME: &'static str = "topology-mapping";

    async fn run(self, handle: JobHandle) -> Result<TopologyMappingOutput, CoreError> {
        let offline = self.store.load_design_topology(&self.project_id).await?;
        handle.set_progress(LOADED);

        handle.set_progress(DISCOVERING);
        let discovery = discover(self.access.as_ref(), &handle, self.config.discovery_timeout).await?;
        handle.set_progress(DISCOVERED);

        let profiles = prefetch_profiles(self.access.as_ref(), &discovery.online, &handle).await?;
        handle.set_progress(PREPARED);

        let ctx = ReconciliationContext::new(self.config, profiles, handle.cancel_token());
        let reconciliation = reconcile(&TopologyMatcher, &ctx, &offline, &discovery.online, |done, total| {
            let span = MATCH_SPAN * done / total.max(1);
            handle.set_progress(PREPARED.saturating_add(u8::try_from(span).unwrap_or(0)));
        })?;

        info!(
            project = %self.project_id,
            deploy = reconciliation.result.deploy,
            discovery_errors = discovery.errors.len(),
            "topology mapping complete"
        );

        Ok(TopologyMappingOutput {
            project_id: self.project_id,
            reconciliation,
            discovery_errors: discovery.errors,
        })
    }
}
