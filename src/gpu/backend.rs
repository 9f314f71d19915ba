use crate::metrics::{GpuReading, MetricError};

/// One physical GPU. Only device 0 is sampled; multi-GPU aggregation is out of scope.
pub trait GpuBackend: Send {
    fn name(&self) -> String;
    fn vendor(&self) -> String;
    fn read(&self) -> Result<GpuReading, MetricError>;
}

/// Probes the compiled-in backends and returns the first GPU found.
pub fn detect() -> Option<Box<dyn GpuBackend>> {
    #[cfg(feature = "nvidia")]
    {
        use super::nvidia::NvidiaBackend;
        match NvidiaBackend::detect() {
            Ok(gpu) => return Some(Box::new(gpu)),
            Err(e) => log::warn!("NVIDIA GPU unavailable: {}", e),
        }
    }

    None
}
