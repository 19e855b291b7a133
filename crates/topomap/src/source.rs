//! Snapshot-backed collaborators for the engine.
//!
//! The CLI has no wire clients: it reads a design, a recorded discovery and
//! a profile catalog from disk up front, then serves them to the jobs
//! through in-memory `ProjectStore` / `DeviceAccessLayer` implementations.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use topomap_config::Config;
use topomap_core::{
    CoreError, DeviceAccessLayer, DeviceProfile, ProfileCatalog, ProfileId, ProjectStore,
    TopologyGraph,
};

use crate::cli::InputArgs;
use crate::error::CliError;

// ── File reading ─────────────────────────────────────────────────────

/// Parse a JSON or YAML file, picking the format from the extension.
pub fn read_snapshot<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let input_err = |reason: String| CliError::Input {
        path: path.display().to_string(),
        reason,
    };

    let text = std::fs::read_to_string(path).map_err(|e| input_err(e.to_string()))?;
    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    debug!(path = %path.display(), yaml = is_yaml, "reading snapshot");
    if is_yaml {
        serde_yaml::from_str(&text).map_err(|e| input_err(e.to_string()))
    } else {
        serde_json::from_str(&text).map_err(|e| input_err(e.to_string()))
    }
}

// ── Input resolution ─────────────────────────────────────────────────

/// Resolved file set for one run.
#[derive(Debug)]
pub struct InputFiles {
    pub project_id: String,
    pub design: PathBuf,
    pub discovery: PathBuf,
    pub profiles: PathBuf,
}

impl InputFiles {
    /// Merge explicit flags over the named (or default) project.
    pub fn resolve(args: &InputArgs, cfg: &Config) -> Result<Self, CliError> {
        let project_name = args.project.clone().or_else(|| {
            // The default project only applies when no design is given.
            args.design.is_none().then(|| cfg.default_project.clone()).flatten()
        });
        let project = project_name
            .as_deref()
            .map(|name| cfg.project(name))
            .transpose()?;

        let design = args
            .design
            .clone()
            .or_else(|| project.map(|p| p.design.clone()))
            .ok_or_else(|| CliError::MissingInput {
                what: "design topology".into(),
                flag: "design".into(),
            })?;
        let discovery = args
            .discovery
            .clone()
            .or_else(|| project.and_then(|p| p.discovery.clone()))
            .ok_or_else(|| CliError::MissingInput {
                what: "discovery snapshot".into(),
                flag: "discovery".into(),
            })?;
        let profiles = args
            .profiles
            .clone()
            .or_else(|| project.and_then(|p| p.profiles.clone()))
            .ok_or_else(|| CliError::MissingInput {
                what: "device profile catalog".into(),
                flag: "profiles".into(),
            })?;

        let project_id = project_name.unwrap_or_else(|| {
            design
                .file_stem()
                .map_or_else(|| "design".into(), |s| s.to_string_lossy().into_owned())
        });

        Ok(Self {
            project_id,
            design,
            discovery,
            profiles,
        })
    }

    /// Read all three files.
    pub fn load(self) -> Result<(SnapshotStore, SnapshotAccess), CliError> {
        let design: TopologyGraph = read_snapshot(&self.design)?;
        let online: TopologyGraph = read_snapshot(&self.discovery)?;
        let profiles: Vec<DeviceProfile> = read_snapshot(&self.profiles)?;

        debug!(
            project = %self.project_id,
            design_devices = design.devices.len(),
            online_devices = online.devices.len(),
            profiles = profiles.len(),
            "snapshots loaded"
        );

        Ok((
            SnapshotStore::single(self.project_id, design),
            SnapshotAccess {
                online,
                profiles: profiles.into_iter().collect(),
            },
        ))
    }
}

// ── ProjectStore ─────────────────────────────────────────────────────

/// Designs held in memory, keyed by project id.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    designs: HashMap<String, TopologyGraph>,
}

impl SnapshotStore {
    pub fn single(project_id: String, design: TopologyGraph) -> Self {
        Self {
            designs: HashMap::from([(project_id, design)]),
        }
    }
}

impl ProjectStore for SnapshotStore {
    async fn load_design_topology(&self, project_id: &str) -> Result<TopologyGraph, CoreError> {
        self.designs
            .get(project_id)
            .cloned()
            .ok_or_else(|| CoreError::Store {
                message: format!("no design loaded for project '{project_id}'"),
            })
    }
}

// ── DeviceAccessLayer ────────────────────────────────────────────────

/// Replays a recorded discovery.
#[derive(Debug)]
pub struct SnapshotAccess {
    online: TopologyGraph,
    profiles: ProfileCatalog,
}

impl DeviceAccessLayer for SnapshotAccess {
    async fn discover_topology(&self, cancel: CancellationToken) -> Result<TopologyGraph, CoreError> {
        if cancel.is_cancelled() {
            return Err(CoreError::Cancelled);
        }
        Ok(self.online.clone())
    }

    async fn get_device_profile(&self, id: ProfileId) -> Result<DeviceProfile, CoreError> {
        self.profiles.get(id).cloned()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use topomap_config::ProjectProfile;

    fn args() -> InputArgs {
        InputArgs {
            project: None,
            design: None,
            discovery: None,
            profiles: None,
            timeout: None,
        }
    }

    fn config_with_project() -> Config {
        let mut cfg = Config::default();
        cfg.default_project = Some("plant".into());
        cfg.projects.insert(
            "plant".into(),
            ProjectProfile {
                design: "plant-design.json".into(),
                discovery: Some("plant-scan.yaml".into()),
                profiles: Some("profiles.json".into()),
            },
        );
        cfg
    }

    #[test]
    fn default_project_supplies_all_files() {
        let files = InputFiles::resolve(&args(), &config_with_project()).unwrap();
        assert_eq!(files.project_id, "plant");
        assert_eq!(files.discovery, PathBuf::from("plant-scan.yaml"));
    }

    #[test]
    fn explicit_design_ignores_default_project() {
        let mut a = args();
        a.design = Some("lab/ring.json".into());
        let err = InputFiles::resolve(&a, &config_with_project()).unwrap_err();
        assert!(matches!(err, CliError::MissingInput { ref flag, .. } if flag == "discovery"));

        a.discovery = Some("scan.json".into());
        a.profiles = Some("p.json".into());
        let files = InputFiles::resolve(&a, &config_with_project()).unwrap();
        assert_eq!(files.project_id, "ring");
    }

    #[test]
    fn flags_override_named_project() {
        let mut a = args();
        a.project = Some("plant".into());
        a.discovery = Some("today.json".into());
        let files = InputFiles::resolve(&a, &config_with_project()).unwrap();
        assert_eq!(files.design, PathBuf::from("plant-design.json"));
        assert_eq!(files.discovery, PathBuf::from("today.json"));
    }

    #[test]
    fn unknown_project_is_not_found() {
        let mut a = args();
        a.project = Some("nope".into());
        let err = InputFiles::resolve(&a, &config_with_project()).unwrap_err();
        assert!(matches!(err, CliError::ProjectNotFound { .. }));
    }

    #[test]
    fn yaml_and_json_both_parse() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("g.json");
        let yaml = dir.path().join("g.yml");
        std::fs::write(&json, r#"{"devices":[{"id":1,"model_name":"EDS"}],"links":[]}"#).unwrap();
        std::fs::write(&yaml, "devices:\n  - id: 1\n    model_name: EDS\nlinks: []\n").unwrap();

        let a: TopologyGraph = read_snapshot(&json).unwrap();
        let b: TopologyGraph = read_snapshot(&yaml).unwrap();
        assert_eq!(a.devices.len(), 1);
        assert_eq!(b.devices[0].model_name, "EDS");
    }

    #[test]
    fn unreadable_file_is_input_error() {
        let err = read_snapshot::<TopologyGraph>(Path::new("/nonexistent/x.json")).unwrap_err();
        assert!(matches!(err, CliError::Input { .. }));
    }
}
