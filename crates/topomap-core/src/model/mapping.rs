// ── Mapping verdicts ──

use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

use super::ids::{DeviceId, MacAddress};

/// Per-device reconciliation verdict.
///
/// Declaration order is the display order used when rows are listed by
/// severity.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum MapStatus {
    Success,
    Warning,
    Checked,
    Failed,
    NotFound,
    Skip,
}

impl MapStatus {
    /// Statuses that block deployment.
    pub fn is_blocking(self) -> bool {
        matches!(self, Self::Failed | Self::NotFound)
    }

    /// Statuses whose device is considered mapped for carry-over.
    pub fn is_mapped(self) -> bool {
        matches!(self, Self::Success | Self::Warning)
    }
}

/// One verdict row of the mapping report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapDeviceResultItem {
    /// Sequential row id, assigned in report order starting at 1.
    pub id: u32,
    pub offline_device_id: Option<DeviceId>,
    pub online_device_id: Option<DeviceId>,
    pub offline_ip: Option<Ipv4Addr>,
    pub online_ip: Option<Ipv4Addr>,
    pub online_mac: Option<MacAddress>,
    /// Design model when the row has a design device, else the discovered one.
    pub model_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub online_model_name: Option<String>,
    pub status: MapStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Final report: ordered rows plus the deploy decision.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingResult {
    pub rows: Vec<MapDeviceResultItem>,
    pub deploy: bool,
}

impl MappingResult {
    pub fn new(rows: Vec<MapDeviceResultItem>) -> Self {
        let deploy = !rows.iter().any(|r| r.status.is_blocking());
        Self { rows, deploy }
    }

    pub fn count(&self, status: MapStatus) -> usize {
        self.rows.iter().filter(|r| r.status == status).count()
    }

    pub fn warning_count(&self) -> usize {
        self.count(MapStatus::Warning)
    }

    /// Rows that are `Failed` or `NotFound`.
    pub fn failure_count(&self) -> usize {
        self.rows.iter().filter(|r| r.status.is_blocking()).count()
    }

    /// Deployable with nothing for the operator to review.
    pub fn is_perfect(&self) -> bool {
        self.deploy && self.warning_count() == 0 && self.failure_count() == 0
    }

    pub fn row_for_offline(&self, id: DeviceId) -> Option<&MapDeviceResultItem> {
        self.rows.iter().find(|r| r.offline_device_id == Some(id))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(id: u32, status: MapStatus) -> MapDeviceResultItem {
        MapDeviceResultItem {
            id,
            offline_device_id: Some(DeviceId(i64::from(id))),
            online_device_id: None,
            offline_ip: None,
            online_ip: None,
            online_mac: None,
            model_name: "EDS-4008".into(),
            online_model_name: None,
            status,
            error: None,
        }
    }

    #[test]
    fn deploy_blocked_by_failed_or_not_found() {
        let ok = MappingResult::new(vec![row(1, MapStatus::Success), row(2, MapStatus::Skip)]);
        assert!(ok.deploy);
        assert!(ok.is_perfect());

        let warn = MappingResult::new(vec![row(1, MapStatus::Warning)]);
        assert!(warn.deploy);
        assert!(!warn.is_perfect());

        let missing = MappingResult::new(vec![row(1, MapStatus::Success), row(2, MapStatus::NotFound)]);
        assert!(!missing.deploy);
        assert_eq!(missing.failure_count(), 1);
    }

    #[test]
    fn status_orders_by_severity_for_display() {
        assert!(MapStatus::Success < MapStatus::Warning);
        assert!(MapStatus::Checked < MapStatus::Failed);
        assert!(MapStatus::NotFound < MapStatus::Skip);
        assert_eq!(MapStatus::NotFound.to_string(), "not-found");
    }
}
