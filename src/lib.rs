pub mod alerts;
pub mod classify;
pub mod config;
pub mod daemon;
pub mod error;
pub mod gpu;
pub mod history;
pub mod metrics;
pub mod presenter;
pub mod sampler;

pub use classify::{Classifier, Severities, SeverityLevel};
pub use config::Config;
pub use error::{Error, MetricError, Result};
pub use sampler::{CycleReport, Sampler, SamplerState};
