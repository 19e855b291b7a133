//! `topomap reconcile`: run the topology mapping job over snapshot files.

use std::sync::Arc;

use serde::Serialize;
use tabled::Tabled;

use topomap_config::Config;
use topomap_core::{
    CarryOverPlan, DeviceCarryOver, DeviceId, IpSettingEntry, MapDeviceResultItem, MapStatus,
    MappingResult, TopologyMappingJob, TopologyMappingOutput,
};

use crate::cli::ReconcileArgs;
use crate::commands::RunContext;
use crate::commands::job::run_job;
use crate::error::CliError;
use crate::output::{self, or_dash};
use crate::source::InputFiles;

// ── Rows ─────────────────────────────────────────────────────────────

#[derive(Tabled)]
pub(crate) struct MapRow {
    #[tabled(rename = "#")]
    id: u32,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Design")]
    offline: String,
    #[tabled(rename = "Online")]
    online: String,
    #[tabled(rename = "Model")]
    model: String,
    #[tabled(rename = "Online Model")]
    online_model: String,
    #[tabled(rename = "Design IP")]
    offline_ip: String,
    #[tabled(rename = "Online IP")]
    online_ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Detail")]
    error: String,
}

impl From<&MapDeviceResultItem> for MapRow {
    fn from(r: &MapDeviceResultItem) -> Self {
        Self {
            id: r.id,
            status: r.status.to_string(),
            offline: or_dash(r.offline_device_id),
            online: or_dash(r.online_device_id),
            model: r.model_name.clone(),
            online_model: or_dash(r.online_model_name.as_deref()),
            offline_ip: or_dash(r.offline_ip),
            online_ip: or_dash(r.online_ip),
            mac: or_dash(r.online_mac.as_ref()),
            error: r.error.clone().unwrap_or_default(),
        }
    }
}

#[derive(Tabled)]
struct IpChangeRow {
    #[tabled(rename = "Design")]
    device: DeviceId,
    #[tabled(rename = "From")]
    from: String,
    #[tabled(rename = "To")]
    to: String,
    #[tabled(rename = "Mask")]
    mask: String,
    #[tabled(rename = "Gateway")]
    gateway: String,
}

impl From<&IpSettingEntry> for IpChangeRow {
    fn from(e: &IpSettingEntry) -> Self {
        Self {
            device: e.offline_device_id,
            from: or_dash(e.offline_ip),
            to: e.online_ip.to_string(),
            mask: e.subnet_mask.to_string(),
            gateway: or_dash(e.gateway),
        }
    }
}

#[derive(Tabled)]
struct CarryOverRow {
    #[tabled(rename = "Design")]
    offline: DeviceId,
    #[tabled(rename = "Online")]
    online: DeviceId,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "SNMP")]
    snmp: String,
    #[tabled(rename = "NETCONF")]
    netconf: String,
    #[tabled(rename = "RESTful")]
    restful: String,
}

impl From<&DeviceCarryOver> for CarryOverRow {
    fn from(d: &DeviceCarryOver) -> Self {
        let c = &d.connection;
        Self {
            offline: d.offline_device_id,
            online: d.online_device_id,
            mac: or_dash(d.online_mac.as_ref()),
            account: if c.account.username.is_empty() {
                "-".into()
            } else {
                c.account.username.clone()
            },
            snmp: if c.enable_snmp_setting {
                format!("{}:{}", c.snmp.version, c.snmp.port)
            } else {
                "off".into()
            },
            netconf: format!(
                "{}{}",
                c.netconf.port,
                if c.netconf.over_ssh { "/ssh" } else { "" }
            ),
            restful: format!("{}:{}", c.restful.protocol, c.restful.port),
        }
    }
}

// ── Report ───────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ReconcileReport<'a> {
    project_id: &'a str,
    source_device_id: Option<DeviceId>,
    deploy: bool,
    rows: &'a [MapDeviceResultItem],
    carry_over: &'a CarryOverPlan,
    discovery_errors: &'a [String],
}

impl<'a> From<&'a TopologyMappingOutput> for ReconcileReport<'a> {
    fn from(out: &'a TopologyMappingOutput) -> Self {
        let rec = &out.reconciliation;
        Self {
            project_id: &out.project_id,
            source_device_id: rec.source,
            deploy: rec.result.deploy,
            rows: &rec.result.rows,
            carry_over: &rec.carry_over,
            discovery_errors: &out.discovery_errors,
        }
    }
}

/// One-line status tally, e.g. `3 success, 1 warning`.
pub(crate) fn tally(result: &MappingResult) -> String {
    [
        MapStatus::Success,
        MapStatus::Warning,
        MapStatus::Checked,
        MapStatus::Failed,
        MapStatus::NotFound,
        MapStatus::Skip,
    ]
    .into_iter()
    .filter_map(|s| {
        let n = result.count(s);
        (n > 0).then(|| format!("{n} {s}"))
    })
    .collect::<Vec<_>>()
    .join(", ")
}

pub(crate) fn deploy_line(deploy: bool, color: bool) -> String {
    if deploy {
        output::verdict("deployable", true, color)
    } else {
        output::verdict("not deployable", false, color)
    }
}

fn table_view(report: &ReconcileReport<'_>, result: &MappingResult, plan: bool, color: bool) -> String {
    let rows: Vec<MapRow> = report.rows.iter().map(MapRow::from).collect();
    let mut out = vec![
        output::table(&rows),
        format!(
            "Project {}  source {}  {}",
            report.project_id,
            or_dash(report.source_device_id),
            deploy_line(report.deploy, color)
        ),
        output::dim(&tally(result), color),
    ];

    for err in report.discovery_errors {
        out.push(format!("discovery: {err}"));
    }

    if plan && !report.carry_over.is_empty() {
        let ips: Vec<IpChangeRow> = report.carry_over.ip_settings.iter().map(IpChangeRow::from).collect();
        if !ips.is_empty() {
            out.push(String::new());
            out.push("IP changes".into());
            out.push(output::table(&ips));
        }
        let devices: Vec<CarryOverRow> = report.carry_over.devices.iter().map(CarryOverRow::from).collect();
        out.push(String::new());
        out.push("Device settings".into());
        out.push(output::table(&devices));
    }

    out.join("\n")
}

// ── Handler ──────────────────────────────────────────────────────────

pub async fn handle(args: ReconcileArgs, ctx: &RunContext, cfg: &Config) -> Result<(), CliError> {
    let files = InputFiles::resolve(&args.input, cfg)?;
    let project_id = files.project_id.clone();
    let (store, access) = files.load()?;

    let mut config = ctx.reconcile.clone();
    if let Some(timeout) = args.input.timeout {
        config.discovery_timeout = Some(timeout.into());
    }
    let poll = config.status_poll_interval;

    let job = TopologyMappingJob::new(Arc::new(access), Arc::new(store), project_id, config);
    let out = run_job(job, poll, ctx.show_progress()).await?;

    let result = &out.reconciliation.result;
    let report = ReconcileReport::from(out.as_ref());
    let text = output::render(ctx.format, &report, |r| table_view(r, result, args.plan, ctx.color))?;
    output::print_output(&text, ctx.quiet);

    if result.deploy {
        Ok(())
    } else {
        Err(CliError::NotDeployable {
            failed: result.count(MapStatus::Failed),
            not_found: result.count(MapStatus::NotFound),
        })
    }
}
