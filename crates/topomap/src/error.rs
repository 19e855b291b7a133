//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use topomap_config::ConfigError;
use topomap_core::CoreError;

/// Process exit codes.
#[allow(dead_code)]
pub mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const ABORTED: i32 = 9;
    pub const INPUT: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Input ────────────────────────────────────────────────────────
    #[error("Could not read {path}")]
    #[diagnostic(
        code(topomap::input),
        help("Snapshots are JSON, or YAML when the file ends in .yaml / .yml.\n{reason}")
    )]
    Input { path: String, reason: String },

    #[error("Missing {what}")]
    #[diagnostic(
        code(topomap::missing_input),
        help("Pass --{flag}, or register a project with: topomap config init --project <NAME> --{flag} <FILE>")
    )]
    MissingInput { what: String, flag: String },

    // ── Projects / config ────────────────────────────────────────────
    #[error("Project '{name}' not found in configuration")]
    #[diagnostic(
        code(topomap::project_not_found),
        help(
            "Available projects: {available}\n\
             Create one with: topomap config init --project {name} --design <FILE>"
        )
    )]
    ProjectNotFound { name: String, available: String },

    #[error("Configuration file already exists at {path}")]
    #[diagnostic(code(topomap::config_exists), help("Use --force to overwrite it."))]
    ConfigExists { path: String },

    #[error(transparent)]
    #[diagnostic(code(topomap::config))]
    Config(ConfigError),

    // ── Engine ───────────────────────────────────────────────────────
    #[error("Device {device_id} not found in {topology}")]
    #[diagnostic(code(topomap::device_not_found))]
    DeviceNotFound { device_id: String, topology: String },

    #[error("{job} failed: {message}")]
    #[diagnostic(code(topomap::job_failed))]
    JobFailed { job: String, message: String },

    #[error("{job} was aborted")]
    #[diagnostic(code(topomap::aborted))]
    Aborted { job: String },

    #[error("Design cannot be deployed: {failed} failed, {not_found} not found")]
    #[diagnostic(
        code(topomap::not_deployable),
        help("Fix the rows marked failed / not-found and run again.")
    )]
    NotDeployable { failed: usize, not_found: usize },

    #[error(transparent)]
    #[diagnostic(code(topomap::core))]
    Core(CoreError),

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(topomap::validation))]
    Validation { field: String, reason: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(topomap::serialize))]
    Serialize(String),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Input { .. } => exit_code::INPUT,
            Self::MissingInput { .. } | Self::Validation { .. } => exit_code::USAGE,
            Self::ProjectNotFound { .. } | Self::DeviceNotFound { .. } => exit_code::NOT_FOUND,
            Self::ConfigExists { .. } | Self::NotDeployable { .. } => exit_code::CONFLICT,
            Self::Aborted { .. } => exit_code::ABORTED,
            Self::Core(e) if e.is_cancelled() => exit_code::ABORTED,
            Self::Core(CoreError::RootDeviceNotFound { .. } | CoreError::DeviceNotFound { .. }) => {
                exit_code::NOT_FOUND
            }
            _ => exit_code::GENERAL,
        }
    }
}

// ── Conversions ──────────────────────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },
            other => CliError::Core(other),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::UnknownProject { name, available } => {
                CliError::ProjectNotFound { name, available }
            }
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            other => CliError::Config(other),
        }
    }
}
