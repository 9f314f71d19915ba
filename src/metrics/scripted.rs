use std::collections::VecDeque;
use std::time::Duration;

use crate::metrics::{
    CpuReading, GpuReading, MetricError, MetricKind, MetricSource, RamReading,
};

#[derive(Debug, Default)]
pub struct ScriptedSource {
    gpu: VecDeque<Result<GpuReading, MetricError>>,
    cpu: VecDeque<Result<CpuReading, MetricError>>,
    ram: VecDeque<Result<RamReading, MetricError>>,
    delay: Option<Duration>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues one successful cycle.
    pub fn push_cycle(&mut self, gpu_util: f64, gpu_temp: f64, cpu_util: f64, ram_util: f64) {
        self.gpu.push_back(Ok(GpuReading {
            util: gpu_util,
            temp: gpu_temp,
            mem_used: 2048 * 1024 * 1024,
            mem_total: 8192 * 1024 * 1024,
        }));
        self.cpu.push_back(Ok(CpuReading { util: cpu_util }));
        self.ram.push_back(Ok(RamReading { util: ram_util }));
    }

    pub fn push_gpu(&mut self, reading: Result<GpuReading, MetricError>) {
        self.gpu.push_back(reading);
    }

    pub fn push_cpu(&mut self, reading: Result<CpuReading, MetricError>) {
        self.cpu.push_back(reading);
    }

    pub fn push_ram(&mut self, reading: Result<RamReading, MetricError>) {
        self.ram.push_back(reading);
    }

    /// Makes every subsequent read sleep first, to exercise read budgets.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = Some(delay);
    }

    fn pause(&self) {
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
    }

    fn exhausted(kind: MetricKind) -> MetricError {
        MetricError::ReadFailed(kind, "script exhausted".to_string())
    }
}

impl MetricSource for ScriptedSource {
    fn read_gpu(&mut self) -> Result<GpuReading, MetricError> {
        self.pause();
        self.gpu.pop_front().unwrap_or_else(|| Err(Self::exhausted(MetricKind::Gpu)))
    }

    fn read_cpu(&mut self) -> Result<CpuReading, MetricError> {
        self.pause();
        self.cpu.pop_front().unwrap_or_else(|| Err(Self::exhausted(MetricKind::Cpu)))
    }

    fn read_ram(&mut self) -> Result<RamReading, MetricError> {
        self.pause();
        self.ram.pop_front().unwrap_or_else(|| Err(Self::exhausted(MetricKind::Ram)))
    }
}
