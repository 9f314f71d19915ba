use chrono::{NaiveDateTime, Timelike};
use crate::error::{Error, Result};

/// Text format of persisted timestamps. Comparisons and range bounds work on
/// this string, so anything below one second is dropped.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One synchronized GPU/CPU/RAM reading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub timestamp: NaiveDateTime,
    pub gpu_util: f64,
    pub gpu_temp: f64,
    pub cpu_util: f64,
    pub ram_util: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, gpu_util: f64, gpu_temp: f64, cpu_util: f64, ram_util: f64) -> Self {
        Self {
            timestamp: truncate_to_second(timestamp),
            gpu_util,
            gpu_temp,
            cpu_util,
            ram_util,
        }
    }

    pub fn timestamp_text(&self) -> String {
        format_timestamp(&self.timestamp)
    }
}

/// Inclusive `[start, end]`. A range with `start > end` matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeRange {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TimeRange {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: truncate_to_second(start),
            end: truncate_to_second(end),
        }
    }

    pub fn parse(start: &str, end: &str) -> Result<Self> {
        Ok(Self::new(parse_timestamp(start)?, parse_timestamp(end)?))
    }

    pub fn is_valid(&self) -> bool {
        self.start <= self.end
    }

    pub fn duration_secs(&self) -> i64 {
        (self.end - self.start).num_seconds()
    }

    pub fn contains(&self, timestamp: &NaiveDateTime) -> bool {
        self.start <= *timestamp && *timestamp <= self.end
    }
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
        .map_err(|e| Error::Parse(format!("invalid timestamp '{}': {}", text, e)))
}

pub fn truncate_to_second(timestamp: NaiveDateTime) -> NaiveDateTime {
    timestamp.with_nanosecond(0).unwrap_or(timestamp)
}
