// ── Core error types ──
//
// Errors that stop a reconciliation job. Per-device verdicts (model
// mismatch, missing port, duplicated IP) are NOT errors: they land in
// the mapping report as row statuses and the job still finishes.

use thiserror::Error;

use crate::model::{DeviceId, InterfaceId, ProfileId};

/// Which of the two graphs an identifier was looked up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum GraphSide {
    Offline,
    Online,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Structural errors ────────────────────────────────────────────
    #[error("Root device {device_id} not found in the topology")]
    RootDeviceNotFound { device_id: DeviceId },

    #[error("Device {device_id} not found in the {graph} topology")]
    DeviceNotFound { graph: GraphSide, device_id: DeviceId },

    #[error("Device profile not found: {profile_id}")]
    ProfileNotFound { profile_id: ProfileId },

    #[error("Link on device {device_id} (interface {interface_id}) loops back to the same device")]
    SelfLink {
        device_id: DeviceId,
        interface_id: InterfaceId,
    },

    // ── Cancellation ─────────────────────────────────────────────────
    #[error("Job was cancelled")]
    Cancelled,

    // ── Job lifecycle ────────────────────────────────────────────────
    #[error("Job '{job}' is already running")]
    JobAlreadyRunning { job: String },

    #[error("Failed to start worker: {reason}")]
    SpawnFailed { reason: String },

    // ── Collaborator errors ──────────────────────────────────────────
    #[error("Topology discovery failed: {message}")]
    Discovery { message: String },

    #[error("Project store error: {message}")]
    Store { message: String },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Errors describing an inconsistent graph or catalog. These abort a
    /// job without producing a partial report.
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::RootDeviceNotFound { .. }
                | Self::DeviceNotFound { .. }
                | Self::ProfileNotFound { .. }
                | Self::SelfLink { .. }
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
