use crate::gpu::{self, GpuBackend};
use crate::metrics::{
    CpuReading, GpuReading, MetricError, MetricKind, MetricSource, RamReading, SystemMetrics,
};

/// The real host: sysinfo for CPU/RAM and the first detected GPU backend.
pub struct HostSource {
    system: SystemMetrics,
    gpu: Option<Box<dyn GpuBackend>>,
}

impl HostSource {
    pub fn new(enable_gpu: bool) -> Self {
        let gpu = if enable_gpu {
            let detected = gpu::detect();
            match &detected {
                Some(backend) => log::info!("GPU monitoring enabled: {} - {}", backend.vendor(), backend.name()),
                None => log::warn!("GPU monitoring enabled but no GPU detected; samples will not be persisted"),
            }
            detected
        } else {
            log::info!("GPU monitoring disabled");
            None
        };

        Self {
            system: SystemMetrics::new(),
            gpu,
        }
    }

    pub fn has_gpu(&self) -> bool {
        self.gpu.is_some()
    }

    pub fn system(&self) -> &SystemMetrics {
        &self.system
    }
}

impl MetricSource for HostSource {
    fn read_gpu(&mut self) -> Result<GpuReading, MetricError> {
        match &self.gpu {
            Some(backend) => backend.read(),
            None => Err(MetricError::NotPresent(MetricKind::Gpu)),
        }
    }

    fn read_cpu(&mut self) -> Result<CpuReading, MetricError> {
        self.system.read_cpu()
    }

    fn read_ram(&mut self) -> Result<RamReading, MetricError> {
        self.system.read_ram()
    }
}
