pub mod backend;

#[cfg(feature = "nvidia")]
pub mod nvidia;

pub use backend::{detect, GpuBackend};
