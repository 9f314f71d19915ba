use std::sync::mpsc::{Receiver, Sender, channel};

use crate::alerts::AlertEvent;
use crate::classify::Severities;
use crate::error::Error;

/// Receives the sampler's output once per cycle. Implementations must return
/// promptly: the sampler calls them inline.
pub trait Presenter {
    fn on_sample(&mut self, severities: &Severities, summary: &str);

    fn on_alert(&mut self, event: &AlertEvent);

    fn on_storage_error(&mut self, _error: &Error) {}
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn on_sample(&mut self, severities: &Severities, summary: &str) {
        (**self).on_sample(severities, summary)
    }

    fn on_alert(&mut self, event: &AlertEvent) {
        (**self).on_alert(event)
    }

    fn on_storage_error(&mut self, error: &Error) {
        (**self).on_storage_error(error)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PresenterEvent {
    Sample { severities: Severities, summary: String },
    Alert(AlertEvent),
    StorageError(String),
}

/// Forwards every callback over an unbounded channel, so a slow consumer
/// never stalls a sampling cycle.
pub struct ChannelPresenter {
    tx: Sender<PresenterEvent>,
    disconnected: bool,
}

impl ChannelPresenter {
    pub fn new() -> (Self, Receiver<PresenterEvent>) {
        let (tx, rx) = channel();
        (Self { tx, disconnected: false }, rx)
    }

    fn send(&mut self, event: PresenterEvent) {
        if self.tx.send(event).is_err() && !self.disconnected {
            log::warn!("Presenter receiver dropped; further cycle output is discarded");
            self.disconnected = true;
        }
    }
}

impl Presenter for ChannelPresenter {
    fn on_sample(&mut self, severities: &Severities, summary: &str) {
        self.send(PresenterEvent::Sample {
            severities: *severities,
            summary: summary.to_string(),
        });
    }

    fn on_alert(&mut self, event: &AlertEvent) {
        self.send(PresenterEvent::Alert(event.clone()));
    }

    fn on_storage_error(&mut self, error: &Error) {
        self.send(PresenterEvent::StorageError(error.to_string()));
    }
}

/// Drops everything; useful when only the store and alert log matter.
#[derive(Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_sample(&mut self, _severities: &Severities, _summary: &str) {}

    fn on_alert(&mut self, _event: &AlertEvent) {}
}
