use sysinfo::System;
use crate::metrics::{CpuReading, MetricError, MetricKind, RamReading};

pub struct SystemMetrics {
    system: System,
}

impl SystemMetrics {
    pub fn new() -> Self {
        let mut system = System::new();
        // CPU usage is a delta between two refreshes; prime the first one so
        // the first real read covers a full interval.
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self { system }
    }

    pub fn cpu_count(&self) -> usize {
        self.system.cpus().len()
    }

    pub fn memory_total(&self) -> u64 {
        self.system.total_memory()
    }

    pub fn read_cpu(&mut self) -> Result<CpuReading, MetricError> {
        self.system.refresh_cpu_usage();
        if self.system.cpus().is_empty() {
            return Err(MetricError::ReadFailed(MetricKind::Cpu, "no CPUs reported".to_string()));
        }
        let util = self.system.global_cpu_usage() as f64;
        if !util.is_finite() {
            return Err(MetricError::ReadFailed(MetricKind::Cpu, format!("invalid usage value {}", util)));
        }
        Ok(CpuReading { util })
    }

    /// Used memory as `total - available`, which counts reclaimable cache as free.
    pub fn read_ram(&mut self) -> Result<RamReading, MetricError> {
        self.system.refresh_memory();
        let total = self.system.total_memory();
        if total == 0 {
            return Err(MetricError::ReadFailed(MetricKind::Ram, "total memory reported as zero".to_string()));
        }
        let available = self.system.available_memory().min(total);
        Ok(RamReading { util: ram_percent(total, available) })
    }
}

impl Default for SystemMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn ram_percent(total: u64, available: u64) -> f64 {
    (total - available) as f64 / total as f64 * 100.0
}
