//! Trainer configuration
//!
//! [`TrainerConfig`] carries the trainer-level settings the utilities here
//! care about: device selection and progress reporting. Loading is layered
//! with figment: defaults < TOML file < `TABULAR_*` environment variables.

use crate::error::ConfigError;
use crate::progress::{BackendKind, BackendOptions, ProgressSettings};
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "TABULAR_";

/// Device selection
///
/// Either a device count (`-1` selects every available device) or an
/// explicit list of device ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Devices {
    Count(i64),
    List(Vec<u32>),
}

impl Default for Devices {
    fn default() -> Self {
        Devices::Count(-1)
    }
}

impl From<i64> for Devices {
    fn from(count: i64) -> Self {
        Devices::Count(count)
    }
}

impl From<Vec<u32>> for Devices {
    fn from(ids: Vec<u32>) -> Self {
        Devices::List(ids)
    }
}

/// Trainer-level configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainerConfig {
    pub max_epochs: usize,
    pub min_epochs: usize,
    pub accelerator: String,
    pub devices: Devices,
    /// Explicit device ids; takes precedence over `devices` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub devices_list: Option<Vec<u32>>,
    /// Progress backend name: `none`, `simple`, `rich` or `tqdm`
    pub progress_bar: String,
    pub enable_progress_bar: bool,
    /// Options forwarded to the progress backend
    pub progress_options: BTreeMap<String, serde_json::Value>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_epochs: 10,
            min_epochs: 1,
            accelerator: "auto".to_string(),
            devices: Devices::default(),
            devices_list: None,
            progress_bar: BackendKind::Simple.to_string(),
            enable_progress_bar: true,
            progress_options: BTreeMap::new(),
        }
    }
}

impl TrainerConfig {
    /// Start building a configuration from defaults
    pub fn builder() -> TrainerConfigBuilder {
        TrainerConfigBuilder::default()
    }

    /// Apply `devices_list` precedence over `devices`
    pub fn resolve_devices(mut self) -> Self {
        if let Some(list) = &self.devices_list {
            self.devices = Devices::List(list.clone());
        }
        self
    }

    /// Extract a configuration from a figment
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let config: TrainerConfig = figment.extract()?;
        Ok(config.resolve_devices())
    }

    /// New configuration with `overrides` merged on top
    ///
    /// `overrides` is any serializable map-like value, e.g.
    /// `serde_json::json!({ "accelerator": "gpu" })`.
    pub fn merge<T: Serialize>(&self, overrides: T) -> Result<Self, ConfigError> {
        let overrides = serde_json::to_value(overrides)
            .map_err(|e| ConfigError::serialize(&e.to_string()))?;
        if !overrides.is_object() {
            return Err(ConfigError::serialize("overrides must be a map of fields"));
        }

        let figment =
            Figment::from(Serialized::defaults(self)).merge(Serialized::defaults(overrides));
        Self::from_figment(&figment)
    }

    /// Progress settings for the progress facade
    pub fn progress_settings(&self) -> ProgressSettings {
        ProgressSettings {
            backend: Some(self.progress_bar.clone()),
            enabled: self.enable_progress_bar,
            options: BackendOptions::from(self.progress_options.clone()),
        }
    }
}

/// Builder for [`TrainerConfig`]
#[derive(Debug, Default)]
pub struct TrainerConfigBuilder {
    config: TrainerConfig,
}

impl TrainerConfigBuilder {
    pub fn max_epochs(mut self, max_epochs: usize) -> Self {
        self.config.max_epochs = max_epochs;
        self
    }

    pub fn min_epochs(mut self, min_epochs: usize) -> Self {
        self.config.min_epochs = min_epochs;
        self
    }

    pub fn accelerator(mut self, accelerator: &str) -> Self {
        self.config.accelerator = accelerator.to_string();
        self
    }

    pub fn devices(mut self, devices: impl Into<Devices>) -> Self {
        self.config.devices = devices.into();
        self
    }

    pub fn devices_list(mut self, ids: Vec<u32>) -> Self {
        self.config.devices_list = Some(ids);
        self
    }

    pub fn progress_bar(mut self, backend: &str) -> Self {
        self.config.progress_bar = backend.to_string();
        self
    }

    pub fn enable_progress_bar(mut self, enabled: bool) -> Self {
        self.config.enable_progress_bar = enabled;
        self
    }

    pub fn progress_option(mut self, key: &str, value: serde_json::Value) -> Self {
        self.config.progress_options.insert(key.to_string(), value);
        self
    }

    pub fn build(self) -> TrainerConfig {
        self.config.resolve_devices()
    }
}

/// Layered configuration loader
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Loader using the platform configuration directory
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Loader using a specific file
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tabular")
            .join("config.toml")
    }

    /// Layered figment: defaults < file (if present) < environment
    pub fn figment(&self) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(TrainerConfig::default()));

        if self.config_path.exists() {
            figment = figment.merge(Toml::file(&self.config_path));
        } else {
            log::debug!(
                "No configuration file at {}, using defaults",
                self.config_path.display()
            );
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load the configuration
    pub fn load(&self) -> Result<TrainerConfig, ConfigError> {
        TrainerConfig::from_figment(&self.figment())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.devices, Devices::Count(-1));
        assert_eq!(config.devices_list, None);
        assert_eq!(config.progress_bar, "simple");
        assert!(config.enable_progress_bar);
    }

    #[test]
    fn test_builder_applies_devices_list_precedence() {
        let config = TrainerConfig::builder()
            .devices(2i64)
            .devices_list(vec![0, 1])
            .build();
        assert_eq!(config.devices, Devices::List(vec![0, 1]));
    }

    #[test]
    fn test_progress_settings() {
        let config = TrainerConfig::builder()
            .progress_bar("rich")
            .enable_progress_bar(false)
            .progress_option("hidden", json!(true))
            .build();

        let settings = config.progress_settings();
        assert_eq!(settings.backend.as_deref(), Some("rich"));
        assert!(!settings.enabled);
        assert_eq!(settings.options.as_value(), &json!({ "hidden": true }));
    }

    #[test]
    fn test_devices_untagged_serde() {
        let count: Devices = serde_json::from_value(json!(4)).unwrap();
        let list: Devices = serde_json::from_value(json!([2, 3])).unwrap();
        assert_eq!(count, Devices::Count(4));
        assert_eq!(list, Devices::List(vec![2, 3]));
    }

    #[test]
    fn test_single_device_list() {
        let config = TrainerConfig::builder().devices_list(vec![3]).build();
        assert_eq!(config.devices, Devices::List(vec![3]));
    }

    #[test]
    fn test_merge_overrides_accelerator() {
        let base = TrainerConfig::builder().max_epochs(5).build();
        let merged = base.merge(json!({ "accelerator": "gpu" })).unwrap();

        assert_eq!(merged.accelerator, "gpu");
        assert_eq!(merged.max_epochs, 5);
        assert_eq!(merged.devices, Devices::Count(-1));
    }

    #[test]
    fn test_merge_devices_list_takes_precedence() {
        let merged = TrainerConfig::default()
            .merge(json!({ "devices": 2, "devices_list": [0, 1] }))
            .unwrap();
        assert_eq!(merged.devices, Devices::List(vec![0, 1]));
    }

    #[test]
    fn test_merge_rejects_bad_types() {
        let result = TrainerConfig::default().merge(json!({ "max_epochs": "many" }));
        assert!(matches!(result, Err(ConfigError::Load(_))));

        let result = TrainerConfig::default().merge(vec![1, 2]);
        assert!(matches!(result, Err(ConfigError::Serialize { .. })));
    }

    #[test]
    fn test_round_trip_through_figment() {
        let config = TrainerConfig::builder()
            .accelerator("cpu")
            .devices(Devices::List(vec![1, 2]))
            .progress_bar("none")
            .progress_option("every", json!(5))
            .build();

        let restored =
            TrainerConfig::from_figment(&Figment::from(Serialized::defaults(&config))).unwrap();
        assert_eq!(restored, config);
    }
}
