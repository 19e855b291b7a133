//! Shared configuration for topomap front ends.
//!
//! TOML file under the platform config directory, overridable through
//! `TOPOMAP_` environment variables, and translation to
//! `topomap_core::ReconcileConfig`.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use topomap_core::ReconcileConfig;
use topomap_core::config::{DEFAULT_SUBNET_MASK, DEFAULT_VENDORS};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("project '{name}' is not configured (available: {available})")]
    UnknownProject { name: String, available: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Project used when none is named on the command line.
    pub default_project: Option<String>,

    /// Output defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Reconciliation tuning.
    #[serde(default)]
    pub reconcile: ReconcileSection,

    /// Named projects and their snapshot files.
    #[serde(default)]
    pub projects: HashMap<String, ProjectProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ReconcileSection {
    /// Vendor names or ids treated as reconcilable hardware.
    #[serde(default = "default_vendors")]
    pub vendors: Vec<String>,

    #[serde(default = "default_subnet_mask")]
    pub default_subnet_mask: Ipv4Addr,

    #[serde(default = "default_poll_interval_ms")]
    pub status_poll_interval_ms: u64,

    /// Give up on discovery after this many seconds.
    pub discovery_timeout_secs: Option<u64>,
}

impl Default for ReconcileSection {
    fn default() -> Self {
        Self {
            vendors: default_vendors(),
            default_subnet_mask: default_subnet_mask(),
            status_poll_interval_ms: default_poll_interval_ms(),
            discovery_timeout_secs: None,
        }
    }
}

fn default_vendors() -> Vec<String> {
    DEFAULT_VENDORS.iter().map(|v| (*v).to_owned()).collect()
}
fn default_subnet_mask() -> Ipv4Addr {
    DEFAULT_SUBNET_MASK
}
fn default_poll_interval_ms() -> u64 {
    1000
}

impl ReconcileSection {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.vendors.iter().all(|v| v.trim().is_empty()) {
            return Err(ConfigError::Validation {
                field: "reconcile.vendors".into(),
                reason: "at least one vendor is required".into(),
            });
        }
        if self.status_poll_interval_ms == 0 {
            return Err(ConfigError::Validation {
                field: "reconcile.status_poll_interval_ms".into(),
                reason: "must be greater than zero".into(),
            });
        }
        Ok(())
    }

    /// Translate to the engine's runtime config.
    pub fn to_core(&self) -> Result<ReconcileConfig, ConfigError> {
        self.validate()?;
        Ok(ReconcileConfig {
            vendors: self
                .vendors
                .iter()
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
                .collect(),
            default_subnet_mask: self.default_subnet_mask,
            status_poll_interval: Duration::from_millis(self.status_poll_interval_ms),
            discovery_timeout: self.discovery_timeout_secs.map(Duration::from_secs),
        })
    }
}

/// Snapshot files making up a project.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProjectProfile {
    /// Design topology (JSON or YAML).
    pub design: PathBuf,

    /// Recorded discovery result (JSON or YAML).
    pub discovery: Option<PathBuf>,

    /// Hardware profile catalog (JSON or YAML).
    pub profiles: Option<PathBuf>,
}

impl Config {
    /// Look up a project by name.
    pub fn project(&self, name: &str) -> Result<&ProjectProfile, ConfigError> {
        self.projects.get(name).ok_or_else(|| {
            let mut names: Vec<&str> = self.projects.keys().map(String::as_str).collect();
            names.sort_unstable();
            ConfigError::UnknownProject {
                name: name.into(),
                available: if names.is_empty() {
                    "none".into()
                } else {
                    names.join(", ")
                },
            }
        })
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "topomap", "topomap").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("topomap");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from an explicit file + environment. Nested keys use a double
/// underscore: `TOPOMAP_RECONCILE__DISCOVERY_TIMEOUT_SECS=30`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("TOPOMAP_").split("__"));

    let config: Config = figment.extract()?;
    config.reconcile.validate()?;
    Ok(config)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}
