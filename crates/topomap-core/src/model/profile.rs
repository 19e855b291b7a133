// ── Device profiles ──

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ids::ProfileId;
use crate::error::CoreError;

/// Hardware catalog entry for a device model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceProfile {
    pub id: ProfileId,
    #[serde(default)]
    pub model_name: String,
    /// The chassis has a non-removable power supply, so power-module
    /// slots are not compared.
    #[serde(default)]
    pub built_in_power: bool,
}

/// Profiles resolved ahead of matching, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct ProfileCatalog {
    profiles: HashMap<ProfileId, DeviceProfile>,
}

impl ProfileCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, profile: DeviceProfile) {
        self.profiles.insert(profile.id, profile);
    }

    pub fn get(&self, id: ProfileId) -> Result<&DeviceProfile, CoreError> {
        self.profiles
            .get(&id)
            .ok_or(CoreError::ProfileNotFound { profile_id: id })
    }

    pub fn contains(&self, id: ProfileId) -> bool {
        self.profiles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

impl FromIterator<DeviceProfile> for ProfileCatalog {
    fn from_iter<I: IntoIterator<Item = DeviceProfile>>(iter: I) -> Self {
        Self {
            profiles: iter.into_iter().map(|p| (p.id, p)).collect(),
        }
    }
}
