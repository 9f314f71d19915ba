use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::fs;
use std::time::Duration;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub sampling: SamplingConfig,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SamplingConfig {
    #[serde(default = "default_period_secs")]
    pub period_secs: u64,
    #[serde(default = "default_max_recent_points")]
    pub max_recent_points: usize,
    /// Upper bound for a single provider read; slower reads count as failures.
    #[serde(default = "default_read_budget_ms")]
    pub read_budget_ms: u64,
}

/// Severity thresholds. All comparisons are strict: a value equal to a
/// threshold stays in the lower tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdConfig {
    /// GPU temperature (°C) above which the GPU is Critical and an alert fires.
    #[serde(default = "default_gpu_temp_threshold")]
    pub gpu_temp_threshold: f64,
    /// GPU utilization (%) above which the GPU is Critical and an alert fires.
    #[serde(default = "default_gpu_util_threshold")]
    pub gpu_util_threshold: f64,
    /// Lower edge of the Warning tier, shared by every metric.
    #[serde(default = "default_warning_band")]
    pub warning_band: f64,
    /// Lower edge of the Critical tier for CPU and RAM.
    #[serde(default = "default_critical_band")]
    pub critical_band: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_storage_path")]
    pub path: PathBuf,
}

fn default_period_secs() -> u64 { 1 }
fn default_max_recent_points() -> usize { 100 }
fn default_read_budget_ms() -> u64 { 1000 }
fn default_gpu_temp_threshold() -> f64 { 80.0 }
fn default_gpu_util_threshold() -> f64 { 90.0 }
fn default_warning_band() -> f64 { 70.0 }
fn default_critical_band() -> f64 { 90.0 }
fn default_storage_path() -> PathBuf { PathBuf::from("resource_monitor.db") }

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            period_secs: default_period_secs(),
            max_recent_points: default_max_recent_points(),
            read_budget_ms: default_read_budget_ms(),
        }
    }
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            gpu_temp_threshold: default_gpu_temp_threshold(),
            gpu_util_threshold: default_gpu_util_threshold(),
            warning_band: default_warning_band(),
            critical_band: default_critical_band(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { path: default_storage_path() }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sampling: SamplingConfig::default(),
            thresholds: ThresholdConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl SamplingConfig {
    pub fn period(&self) -> Duration {
        Duration::from_secs(self.period_secs)
    }

    pub fn read_budget(&self) -> Duration {
        Duration::from_millis(self.read_budget_ms)
    }
}

impl Config {
    /// Loads the per-user config file, falling back to defaults when it does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.sampling.period_secs == 0 {
            return Err(Error::Config("sampling.period_secs must be at least 1".to_string()));
        }
        if self.sampling.max_recent_points == 0 {
            return Err(Error::Config("sampling.max_recent_points must be at least 1".to_string()));
        }
        let t = &self.thresholds;
        if t.warning_band > t.critical_band {
            return Err(Error::Config(format!(
                "thresholds.warning_band ({}) is above thresholds.critical_band ({})",
                t.warning_band, t.critical_band
            )));
        }
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")
            .map_err(|_| Error::Config("HOME environment variable not set".to_string()))?;

        Ok(PathBuf::from(home).join(".config/resource-sentinel/config.toml"))
    }
}
