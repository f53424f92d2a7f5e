//! # User preferences
//!
//! Client-side settings kept in the local cache under the `config` key, serialised as
//! TOML so the record stays readable when the native cache is inspected on disk.
//!
//! ```toml
//! [rest]
//! default_secs = 90              # rest timer length
//!
//! [units]
//! weight = "kg"                  # "kg" or "lb"
//!
//! [sync]
//! auto_sync_interval_secs = 30   # 0 to disable periodic retries
//!
//! [notifications]
//! enabled = false                # push notification when the rest timer ends
//! ```
//!
//! Every section derives `Default`, so a missing or partial record is equivalent to the
//! defaults for the missing parts.

use serde::{Deserialize, Serialize};

/// Top-level preferences.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default)]
    pub rest: RestConfig,
    #[serde(default)]
    pub units: UnitsConfig,
    #[serde(default)]
    pub sync: SyncConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RestConfig {
    #[serde(default = "default_rest_secs")]
    pub default_secs: u32,
}

fn default_rest_secs() -> u32 {
    90
}

impl Default for RestConfig {
    fn default() -> Self {
        Self {
            default_secs: default_rest_secs(),
        }
    }
}

/// Unit used to display and enter weights.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl WeightUnit {
    pub fn label(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UnitsConfig {
    #[serde(default)]
    pub weight: WeightUnit,
}

/// Sync configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Retry interval in seconds while changes are pending. 0 disables it.
    #[serde(default = "default_auto_sync_interval")]
    pub auto_sync_interval_secs: u32,
}

fn default_auto_sync_interval() -> u32 {
    30
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            auto_sync_interval_secs: default_auto_sync_interval(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default)]
    pub enabled: bool,
}

impl TrackerConfig {
    /// Builder method to set the rest timer length.
    pub fn with_rest_secs(mut self, secs: u32) -> Self {
        self.rest.default_secs = secs;
        self
    }

    /// Builder method to set the weight unit.
    pub fn with_unit(mut self, unit: WeightUnit) -> Self {
        self.units.weight = unit;
        self
    }

    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_record_uses_defaults() {
        let config = TrackerConfig::from_toml("[units]\nweight = \"lb\"\n").unwrap();
        assert_eq!(config.units.weight, WeightUnit::Lb);
        assert_eq!(config.rest.default_secs, 90);
        assert_eq!(config.sync.auto_sync_interval_secs, 30);
        assert!(!config.notifications.enabled);
    }

    #[test]
    fn test_empty_record_is_default() {
        assert_eq!(TrackerConfig::from_toml("").unwrap(), TrackerConfig::default());
    }

    #[test]
    fn test_toml_output() {
        let toml = TrackerConfig::default()
            .with_rest_secs(120)
            .with_unit(WeightUnit::Lb)
            .to_toml()
            .unwrap();
        assert!(toml.contains("default_secs = 120"));
        assert!(toml.contains("weight = \"lb\""));
    }
}
