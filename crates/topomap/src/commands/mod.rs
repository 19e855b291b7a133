//! Command dispatch: bridges CLI args -> engine jobs -> output formatting.

pub mod config_cmd;
pub mod distances;
pub mod job;
pub mod reconcile;
pub mod scan_map;

use std::io::IsTerminal;

use clap::ValueEnum;

use topomap_config::Config;
use topomap_core::ReconcileConfig;

use crate::cli::{Command, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

/// Resolved per-invocation settings shared by every handler.
#[derive(Debug)]
pub struct RunContext {
    pub format: OutputFormat,
    pub color: bool,
    pub quiet: bool,
    pub reconcile: ReconcileConfig,
}

impl RunContext {
    /// CLI flags win over `[defaults]` from the config file.
    pub fn new(global: &GlobalOpts, cfg: &Config) -> Result<Self, CliError> {
        let format = match global.output {
            Some(f) => f,
            None => parse_setting("defaults.output", &cfg.defaults.output)?,
        };
        let color = match global.color {
            Some(c) => c,
            None => parse_setting("defaults.color", &cfg.defaults.color)?,
        };

        Ok(Self {
            format,
            color: output::should_color(color),
            quiet: global.quiet,
            reconcile: cfg.reconcile.to_core()?,
        })
    }

    /// Progress bars only make sense for a human watching a table.
    pub fn show_progress(&self) -> bool {
        !self.quiet && self.format == OutputFormat::Table && std::io::stderr().is_terminal()
    }
}

fn parse_setting<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}

/// Load config from `--config` or the canonical location.
pub fn load_config(global: &GlobalOpts) -> Result<Config, CliError> {
    let cfg = match &global.config {
        Some(path) => topomap_config::load_config_from(path)?,
        None => topomap_config::load_config()?,
    };
    Ok(cfg)
}

/// Dispatch an engine-bound command to the appropriate handler.
pub async fn dispatch(cmd: Command, ctx: &RunContext, cfg: &Config) -> Result<(), CliError> {
    match cmd {
        Command::Reconcile(args) => reconcile::handle(args, ctx, cfg).await,
        Command::ScanMap(args) => scan_map::handle(args, ctx, cfg).await,
        Command::Distances(args) => distances::handle(&args, ctx),
        Command::Config(_) | Command::Completions(_) => Err(CliError::Validation {
            field: "command".into(),
            reason: "handled before dispatch".into(),
        }),
    }
}
