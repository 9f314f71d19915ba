use chrono::NaiveDateTime;

use crate::classify::{Classifier, SeverityLevel};
use crate::history::{format_timestamp, Sample};

/// A sample whose GPU severity reached Critical.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    pub timestamp: NaiveDateTime,
    pub gpu_temp: f64,
    pub gpu_util: f64,
    pub message: String,
}

impl AlertEvent {
    fn from_sample(sample: &Sample) -> Self {
        let message = format!(
            "[{}] GPU threshold exceeded: temperature {:.1} °C, utilization {:.1}%",
            format_timestamp(&sample.timestamp),
            sample.gpu_temp,
            sample.gpu_util
        );
        Self {
            timestamp: sample.timestamp,
            gpu_temp: sample.gpu_temp,
            gpu_util: sample.gpu_util,
            message,
        }
    }
}

/// Append-only record of Critical GPU samples.
///
/// Every Critical sample produces its own event, so a sustained condition
/// yields one event per cycle and its duration is the run length.
pub struct AlertLog {
    classifier: Classifier,
    events: Vec<AlertEvent>,
    drained: usize,
}

impl AlertLog {
    pub fn new(classifier: Classifier) -> Self {
        Self {
            classifier,
            events: Vec::new(),
            drained: 0,
        }
    }

    pub fn record_if_critical(&mut self, sample: &Sample) -> Option<AlertEvent> {
        if self.classifier.gpu(sample.gpu_util, sample.gpu_temp) != SeverityLevel::Critical {
            return None;
        }

        let event = AlertEvent::from_sample(sample);
        log::warn!("{}", event.message);
        self.events.push(event.clone());
        Some(event)
    }

    pub fn events(&self) -> &[AlertEvent] {
        &self.events
    }

    /// Events recorded since the previous call.
    pub fn drain_new(&mut self) -> Vec<AlertEvent> {
        let fresh = self.events[self.drained..].to_vec();
        self.drained = self.events.len();
        fresh
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl Default for AlertLog {
    fn default() -> Self {
        Self::new(Classifier::default())
    }
}
