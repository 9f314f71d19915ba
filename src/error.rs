use crate::metrics::MetricKind;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GPU error: {0}")]
    Gpu(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("Metric error: {0}")]
    Metric(#[from] MetricError),

    #[error("Export error: {0}")]
    Export(String),

    #[error("Daemon error: {0}")]
    Daemon(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A single provider read that produced no value this cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MetricError {
    #[error("{0} provider not present")]
    NotPresent(MetricKind),

    #[error("{0} read failed: {1}")]
    ReadFailed(MetricKind, String),

    #[error("{0} read took {1:?}, over the {2:?} budget")]
    TimedOut(MetricKind, Duration, Duration),
}
