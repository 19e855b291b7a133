//! `topomap scan-map`: pair discovered hardware with waiting design devices.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;

use topomap_config::Config;
use topomap_core::{
    CarryOverPlan, DeviceId, MapDeviceResultItem, MapStatus, ScanMappingJob, ScanMappingOutput,
};

use crate::cli::ScanMapArgs;
use crate::commands::RunContext;
use crate::commands::job::run_job;
use crate::commands::reconcile::{MapRow, deploy_line, tally};
use crate::error::CliError;
use crate::output;
use crate::source::InputFiles;

#[derive(Serialize)]
struct ScanReport<'a> {
    project_id: &'a str,
    deploy: bool,
    rows: &'a [MapDeviceResultItem],
    carry_over: &'a CarryOverPlan,
    discovery_errors: &'a [String],
}

impl<'a> From<&'a ScanMappingOutput> for ScanReport<'a> {
    fn from(out: &'a ScanMappingOutput) -> Self {
        Self {
            project_id: &out.project_id,
            deploy: out.result.deploy,
            rows: &out.result.rows,
            carry_over: &out.carry_over,
            discovery_errors: &out.discovery_errors,
        }
    }
}

pub async fn handle(args: ScanMapArgs, ctx: &RunContext, cfg: &Config) -> Result<(), CliError> {
    let files = InputFiles::resolve(&args.input, cfg)?;
    let project_id = files.project_id.clone();
    let (store, access) = files.load()?;

    let mut config = ctx.reconcile.clone();
    if let Some(timeout) = args.input.timeout {
        config.discovery_timeout = Some(timeout.into());
    }
    let poll = config.status_poll_interval;

    let remaining: Option<BTreeSet<DeviceId>> = if args.remaining.is_empty() {
        None
    } else {
        Some(args.remaining.iter().copied().map(DeviceId).collect())
    };

    let job = ScanMappingJob {
        access: Arc::new(access),
        store: Arc::new(store),
        project_id,
        remaining,
        config,
    };
    let out = run_job(job, poll, ctx.show_progress()).await?;

    let report = ScanReport::from(out.as_ref());
    let text = output::render(ctx.format, &report, |r| {
        let rows: Vec<MapRow> = r.rows.iter().map(MapRow::from).collect();
        let mut lines = vec![
            output::table(&rows),
            format!("Project {}  {}", r.project_id, deploy_line(r.deploy, ctx.color)),
            output::dim(&tally(&out.result), ctx.color),
        ];
        lines.extend(r.discovery_errors.iter().map(|e| format!("discovery: {e}")));
        lines.join("\n")
    })?;
    output::print_output(&text, ctx.quiet);

    if out.result.deploy {
        Ok(())
    } else {
        Err(CliError::NotDeployable {
            failed: out.result.count(MapStatus::Failed),
            not_found: out.result.count(MapStatus::NotFound),
        })
    }
}
