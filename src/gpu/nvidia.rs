use crate::error::{Error, Result};
use crate::gpu::backend::GpuBackend;
use crate::metrics::{GpuReading, MetricError, MetricKind};
use nvml_wrapper::Nvml;
use nvml_wrapper::enum_wrappers::device::TemperatureSensor;

/// NVML-backed reader for device 0.
///
/// The device handle is looked up on every read so a driver reset between
/// cycles surfaces as a read failure instead of a stale handle.
pub struct NvidiaBackend {
    nvml: Nvml,
    index: u32,
}

impl NvidiaBackend {
    pub fn detect() -> Result<Self> {
        let nvml = Nvml::init()
            .map_err(|e| Error::Gpu(format!("Failed to initialize NVML: {}", e)))?;

        let device_count = nvml.device_count()
            .map_err(|e| Error::Gpu(format!("Failed to get device count: {}", e)))?;

        if device_count == 0 {
            return Err(Error::Gpu("No NVIDIA GPUs detected".to_string()));
        }
        if device_count > 1 {
            log::info!("{} NVIDIA GPUs present, sampling device 0 only", device_count);
        }

        Ok(Self { nvml, index: 0 })
    }

    fn failed(e: nvml_wrapper::error::NvmlError) -> MetricError {
        MetricError::ReadFailed(MetricKind::Gpu, e.to_string())
    }
}

impl GpuBackend for NvidiaBackend {
    fn name(&self) -> String {
        self.nvml.device_by_index(self.index)
            .and_then(|device| device.name())
            .unwrap_or_else(|_| "Unknown NVIDIA GPU".to_string())
    }

    fn vendor(&self) -> String {
        "NVIDIA".to_string()
    }

    fn read(&self) -> std::result::Result<GpuReading, MetricError> {
        let device = self.nvml.device_by_index(self.index).map_err(Self::failed)?;
        let utilization = device.utilization_rates().map_err(Self::failed)?;
        let temperature = device.temperature(TemperatureSensor::Gpu).map_err(Self::failed)?;
        let memory = device.memory_info().map_err(Self::failed)?;

        Ok(GpuReading {
            util: utilization.gpu as f64,
            temp: temperature as f64,
            mem_used: memory.used,
            mem_total: memory.total,
        })
    }
}
