use std::fmt;

use crate::config::ThresholdConfig;
use crate::history::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeverityLevel {
    Normal,
    Warning,
    Critical,
}

impl fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeverityLevel::Normal => write!(f, "normal"),
            SeverityLevel::Warning => write!(f, "warning"),
            SeverityLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Per-metric severities for one cycle. `None` means the metric was not read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Severities {
    pub gpu: Option<SeverityLevel>,
    pub cpu: Option<SeverityLevel>,
    pub ram: Option<SeverityLevel>,
}

impl Severities {
    pub fn worst(&self) -> Option<SeverityLevel> {
        [self.gpu, self.cpu, self.ram].into_iter().flatten().max()
    }
}

/// Two-tier band: above `critical` is Critical, above `warning` is Warning.
pub fn band(value: f64, warning: f64, critical: f64) -> SeverityLevel {
    if value > critical {
        SeverityLevel::Critical
    } else if value > warning {
        SeverityLevel::Warning
    } else {
        SeverityLevel::Normal
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    thresholds: ThresholdConfig,
}

impl Classifier {
    pub fn new(thresholds: ThresholdConfig) -> Self {
        Self { thresholds }
    }

    /// The GPU takes the worse of its utilization and temperature bands.
    pub fn gpu(&self, util: f64, temp: f64) -> SeverityLevel {
        let t = &self.thresholds;
        band(util, t.warning_band, t.gpu_util_threshold)
            .max(band(temp, t.warning_band, t.gpu_temp_threshold))
    }

    pub fn cpu(&self, util: f64) -> SeverityLevel {
        band(util, self.thresholds.warning_band, self.thresholds.critical_band)
    }

    pub fn ram(&self, util: f64) -> SeverityLevel {
        band(util, self.thresholds.warning_band, self.thresholds.critical_band)
    }

    pub fn sample(&self, sample: &Sample) -> Severities {
        Severities {
            gpu: Some(self.gpu(sample.gpu_util, sample.gpu_temp)),
            cpu: Some(self.cpu(sample.cpu_util)),
            ram: Some(self.ram(sample.ram_util)),
        }
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(ThresholdConfig::default())
    }
}
