// ── Reconciliation context ──
//
// Everything a reconciliation pass needs besides the two graphs: tuning,
// the resolved profile catalog, and the job's cancellation token. Built
// once per job and passed by reference into every component.

use tokio_util::sync::CancellationToken;

use crate::config::ReconcileConfig;
use crate::error::CoreError;
use crate::model::{Device, DeviceProfile, ProfileCatalog, ProfileId};

#[derive(Debug, Clone)]
pub struct ReconciliationContext {
    pub config: ReconcileConfig,
    pub profiles: ProfileCatalog,
    pub cancel: CancellationToken,
}

impl ReconciliationContext {
    pub fn new(config: ReconcileConfig, profiles: ProfileCatalog, cancel: CancellationToken) -> Self {
        Self {
            config,
            profiles,
            cancel,
        }
    }

    /// Vendor-owned and not an end station.
    pub fn is_eligible(&self, device: &Device) -> bool {
        device.is_vendor_owned(&self.config.vendors) && !device.device_type.is_end_station()
    }

    /// Profile of a device; a device without a profile id counts as a
    /// missing profile.
    pub fn profile_of(&self, device: &Device) -> Result<&DeviceProfile, CoreError> {
        let id = device.profile_id.unwrap_or(ProfileId(0));
        self.profiles.get(id)
    }

    /// Bail out with [`CoreError::Cancelled`] once the job is stopped.
    pub fn checkpoint(&self) -> Result<(), CoreError> {
        if self.cancel.is_cancelled() {
            Err(CoreError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::DeviceType;

    #[test]
    fn eligibility_requires_vendor_and_non_end_station() {
        let ctx = ReconciliationContext::new(
            ReconcileConfig::default(),
            ProfileCatalog::new(),
            CancellationToken::new(),
        );
        let mut dev = Device::new(1, "EDS-4008");
        assert!(!ctx.is_eligible(&dev));

        dev.vendor = "Moxa".into();
        assert!(ctx.is_eligible(&dev));

        dev.device_type = DeviceType::EndStation;
        assert!(!ctx.is_eligible(&dev));
    }

    #[test]
    fn checkpoint_reports_cancellation() {
        let ctx = ReconciliationContext::new(
            ReconcileConfig::default(),
            ProfileCatalog::new(),
            CancellationToken::new(),
        );
        assert!(ctx.checkpoint().is_ok());
        ctx.cancel.cancel();
        assert!(ctx.checkpoint().unwrap_err().is_cancelled());
    }
}
