use std::fmt;
use std::time::Duration;

use crate::error::Result;
use crate::history::sample::{Sample, TimeRange};
use crate::history::store::SampleStore;

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryNotice {
    /// End before start, or a bound that does not parse.
    InvalidRange(String),
    NoData,
    /// Fewer rows than one per sampling period over the requested span.
    PartialData { expected: u64, actual: u64 },
}

impl fmt::Display for HistoryNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HistoryNotice::InvalidRange(reason) => write!(f, "Invalid range: {}", reason),
            HistoryNotice::NoData => write!(f, "No data is available for the selected range"),
            HistoryNotice::PartialData { expected, actual } => write!(
                f,
                "Data is missing for part of the selected range ({} of {} expected samples)",
                actual, expected
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct HistoryReport {
    pub samples: Vec<Sample>,
    pub notice: Option<HistoryNotice>,
}

impl HistoryReport {
    fn empty(notice: HistoryNotice) -> Self {
        Self { samples: Vec::new(), notice: Some(notice) }
    }
}

/// Parses the text bounds and runs [`load_range`]. Malformed bounds become an
/// `InvalidRange` notice instead of an error.
pub fn load_history(store: &SampleStore, start: &str, end: &str, period: Duration) -> Result<HistoryReport> {
    match TimeRange::parse(start, end) {
        Ok(range) => load_range(store, &range, period),
        Err(e) => {
            log::warn!("Rejected history range {:?}..{:?}: {}", start, end, e);
            Ok(HistoryReport::empty(HistoryNotice::InvalidRange(e.to_string())))
        }
    }
}

/// Only storage failures are errors; range problems and gaps are notices.
pub fn load_range(store: &SampleStore, range: &TimeRange, period: Duration) -> Result<HistoryReport> {
    if !range.is_valid() {
        let reason = format!(
            "end {} is before start {}",
            range.end, range.start
        );
        log::warn!("Rejected history range: {}", reason);
        return Ok(HistoryReport::empty(HistoryNotice::InvalidRange(reason)));
    }

    let samples = store.query(range)?;
    if samples.is_empty() {
        log::info!("No history between {} and {}", range.start, range.end);
        return Ok(HistoryReport::empty(HistoryNotice::NoData));
    }

    let expected = expected_count(range, period);
    let actual = samples.len() as u64;
    let notice = if actual < expected {
        log::info!("Partial history: {} of {} expected samples", actual, expected);
        Some(HistoryNotice::PartialData { expected, actual })
    } else {
        None
    };

    Ok(HistoryReport { samples, notice })
}

/// One sample per period across the span, not counting the start instant.
pub fn expected_count(range: &TimeRange, period: Duration) -> u64 {
    let period_secs = period.as_secs().max(1);
    range.duration_secs().max(0) as u64 / period_secs
}
