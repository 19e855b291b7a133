//! Clap derive structures for the `topomap` CLI.
//!
//! Defines the command tree, global flags, and shared argument groups.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// topomap -- map a designed network topology onto the discovered one
#[derive(Debug, Parser)]
#[command(
    name = "topomap",
    version,
    about = "Reconcile designed network topologies against discovered ones",
    long_about = "Replays a design topology and a discovery snapshot through the\n\
        reconciliation engine and reports, per device, whether the design\n\
        can be deployed onto the hardware that is actually on the wire.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Config file (defaults to the platform config directory)
    #[arg(long, env = "TOPOMAP_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format (defaults to `defaults.output` from the config file)
    #[arg(long, short = 'o', global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Match a design onto a discovery snapshot and report deployability
    #[command(alias = "rec")]
    Reconcile(ReconcileArgs),

    /// Pair discovered devices with design devices by hardware only
    #[command(alias = "scan")]
    ScanMap(ScanMapArgs),

    /// List the devices of a topology ordered by hop distance
    #[command(alias = "dist")]
    Distances(DistancesArgs),

    /// Manage CLI configuration and projects
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Input Arguments ───────────────────────────────────────────

/// Where the design, discovery and profile snapshots come from.
///
/// A configured project supplies defaults; explicit paths override it.
#[derive(Debug, Args)]
pub struct InputArgs {
    /// Project name from the config file
    #[arg(long, short = 'p', env = "TOPOMAP_PROJECT")]
    pub project: Option<String>,

    /// Design topology file (JSON or YAML)
    #[arg(long, short = 'd')]
    pub design: Option<PathBuf>,

    /// Discovery snapshot file (JSON or YAML)
    #[arg(long, short = 'D')]
    pub discovery: Option<PathBuf>,

    /// Device profile catalog file (JSON or YAML)
    #[arg(long)]
    pub profiles: Option<PathBuf>,

    /// Give up on discovery after this long (e.g. "30s", "2m")
    #[arg(long)]
    pub timeout: Option<humantime::Duration>,
}

// ── Reconcile ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ReconcileArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Also print the carry-over plan (IP changes and device settings)
    #[arg(long)]
    pub plan: bool,
}

// ── Scan mapping ─────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ScanMapArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Design device ids still waiting for hardware (default: all)
    #[arg(long, short = 'r', value_delimiter = ',')]
    pub remaining: Vec<i64>,
}

// ── Distances ────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct DistancesArgs {
    /// Topology file (JSON or YAML)
    pub topology: PathBuf,

    /// Root device id (defaults to the topology's source device)
    #[arg(long)]
    pub root: Option<i64>,
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display current resolved configuration
    Show,

    /// Write a config file, optionally registering a project
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,

        /// Project name to register (becomes the default project)
        #[arg(long)]
        project: Option<String>,

        /// Design file for the project
        #[arg(long, requires = "project")]
        design: Option<PathBuf>,

        /// Discovery snapshot file for the project
        #[arg(long, requires = "project")]
        discovery: Option<PathBuf>,

        /// Profile catalog file for the project
        #[arg(long, requires = "project")]
        profiles: Option<PathBuf>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
