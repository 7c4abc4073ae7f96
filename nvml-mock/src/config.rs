//! Configuration module for mock fleets
//!
//! Supports loading configuration from a TOML file.

use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;
use crate::profile::{CatalogDocument, ProfileCatalog};
use crate::server::MockServer;
use crate::spec::{Generation, GpuSpec, MigMode, TopologyPolicy};

/// Mock fleet configuration
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Fleet settings
    #[serde(default)]
    pub fleet: FleetConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Which devices to simulate and how they deviate from the preset.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct FleetConfig {
    /// Generation preset (default: a100)
    #[serde(default)]
    pub generation: Generation,

    /// Number of devices (default: the preset's)
    pub device_count: Option<u32>,

    pub driver_version: Option<String>,
    pub nvml_version: Option<String>,
    pub cuda_driver_version: Option<i32>,

    /// Initial MIG mode (default: the preset's)
    pub mig_mode: Option<MigMode>,

    /// Nearest-GPU behaviour (default: the preset's)
    pub topology: Option<TopologyPolicy>,

    /// Fabric manager partitions (default: the preset's)
    pub fabric_manager: Option<bool>,

    /// Profile catalog replacing the preset's
    pub catalog: Option<CatalogDocument>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Log level filter (default: "nvml_mock=info")
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "nvml_mock=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.display().to_string(), e.to_string()))?;

        toml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.display().to_string(), e.to_string()))
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::ParseError("<inline>".to_string(), e.to_string()))
    }

    /// Resolve the preset plus overrides into a device specification
    pub fn gpu_spec(&self) -> Result<GpuSpec, ConfigError> {
        let fleet = &self.fleet;
        let mut spec = fleet.generation.spec();

        if let Some(count) = fleet.device_count {
            spec = spec.with_device_count(count);
        }
        if fleet.driver_version.is_some()
            || fleet.nvml_version.is_some()
            || fleet.cuda_driver_version.is_some()
        {
            let driver = fleet
                .driver_version
                .clone()
                .unwrap_or_else(|| spec.driver_version.clone());
            let nvml = fleet
                .nvml_version
                .clone()
                .unwrap_or_else(|| spec.nvml_version.clone());
            let cuda = fleet.cuda_driver_version.unwrap_or(spec.cuda_driver_version);
            spec = spec.with_versions(driver, nvml, cuda);
        }
        if let Some(mode) = fleet.mig_mode {
            spec = spec.with_mig_mode(mode);
        }
        if let Some(topology) = fleet.topology {
            spec = spec.with_topology(topology);
        }
        if let Some(enabled) = fleet.fabric_manager {
            spec = spec.with_fabric_manager(enabled);
        }
        if let Some(document) = &fleet.catalog {
            spec = spec.with_catalog(ProfileCatalog::from_document(document)?);
        }
        Ok(spec)
    }

    /// Build the configured fleet
    pub fn build_server(&self) -> Result<MockServer, ConfigError> {
        Ok(MockServer::new(self.gpu_spec()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ids::*;
    use crate::traits::{Device, Nvml};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.fleet.generation, Generation::A100);
        assert!(config.fleet.device_count.is_none());
        assert_eq!(config.logging.level, "nvml_mock=info");
    }

    #[test]
    fn test_parse_minimal_config() {
        let toml = r#"
            [fleet]
            generation = "h200"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.fleet.generation, Generation::H200);
        assert_eq!(config.logging.level, "nvml_mock=info"); // default
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [fleet]
            generation = "b200"
            device_count = 2
            driver_version = "560.35.03"
            cuda_driver_version = 12060
            mig_mode = "enabled"
            topology = "all-others"
            fabric_manager = true

            [logging]
            level = "debug"
        "#;
        let config = Config::from_toml(toml).unwrap();
        let spec = config.gpu_spec().unwrap();
        assert_eq!(spec.device_count, 2);
        assert_eq!(spec.driver_version, "560.35.03");
        assert_eq!(spec.nvml_version, "12.550.54.15");
        assert_eq!(spec.cuda_driver_version, 12060);
        assert_eq!(spec.mig_mode, MigMode::Enabled);
        assert_eq!(spec.topology, TopologyPolicy::AllOthers);
        assert!(spec.fabric_manager);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_inline_catalog() {
        let toml = r#"
            [fleet]
            device_count = 1

            [[fleet.catalog.gpu_instance_profiles]]
            id = 0
            slice_count = 1
            memory_size_mb = 1024
            placements = [{ start = 0, size = 1 }, { start = 1, size = 1 }]
        "#;
        let server = Config::from_toml(toml).unwrap().build_server().unwrap();
        let device = server.device_by_index(0).unwrap();
        assert_eq!(
            device.gpu_instance_profile_info(GPU_INSTANCE_PROFILE_1_SLICE).unwrap().instance_count,
            2
        );
        assert!(device.gpu_instance_profile_info(GPU_INSTANCE_PROFILE_7_SLICE).is_err());
    }

    #[test]
    fn test_invalid_inline_catalog() {
        let toml = r#"
            [[fleet.catalog.gpu_instance_profiles]]
            id = 0
            slice_count = 1
        "#;
        let config = Config::from_toml(toml).unwrap();
        assert!(matches!(config.gpu_spec(), Err(ConfigError::Catalog(_))));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Config::from_toml("[fleet]\ngeneration = \"v100\""),
            Err(ConfigError::ParseError(..))
        ));
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let path = std::env::temp_dir().join("nvml-mock-missing-config.toml");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.fleet.generation, Generation::A100);
    }
}
