pub mod host;
pub mod scripted;
pub mod system;

use std::fmt;

pub use crate::error::MetricError;
pub use host::HostSource;
pub use scripted::ScriptedSource;
pub use system::SystemMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricKind {
    Gpu,
    Cpu,
    Ram,
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricKind::Gpu => write!(f, "GPU"),
            MetricKind::Cpu => write!(f, "CPU"),
            MetricKind::Ram => write!(f, "RAM"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GpuReading {
    pub util: f64,
    pub temp: f64,
    pub mem_used: u64, // bytes
    pub mem_total: u64, // bytes
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CpuReading {
    pub util: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RamReading {
    pub util: f64,
}

/// Point-in-time readings for the three monitored metrics.
///
/// Reads are synchronous and independent: a failure in one must not affect
/// the others.
pub trait MetricSource {
    fn read_gpu(&mut self) -> Result<GpuReading, MetricError>;
    fn read_cpu(&mut self) -> Result<CpuReading, MetricError>;
    fn read_ram(&mut self) -> Result<RamReading, MetricError>;
}

impl<S: MetricSource + ?Sized> MetricSource for Box<S> {
    fn read_gpu(&mut self) -> Result<GpuReading, MetricError> {
        (**self).read_gpu()
    }

    fn read_cpu(&mut self) -> Result<CpuReading, MetricError> {
        (**self).read_cpu()
    }

    fn read_ram(&mut self) -> Result<RamReading, MetricError> {
        (**self).read_ram()
    }
}
