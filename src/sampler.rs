use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{Local, NaiveDateTime};

use crate::alerts::{AlertEvent, AlertLog};
use crate::classify::{Classifier, Severities};
use crate::config::Config;
use crate::history::sample::truncate_to_second;
use crate::history::{RecentWindow, Sample, SampleStore, WindowPoint};
use crate::metrics::{CpuReading, GpuReading, MetricError, MetricKind, MetricSource, RamReading};
use crate::presenter::Presenter;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplerState {
    Idle,
    Running,
}

/// What one cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub timestamp: NaiveDateTime,
    pub severities: Severities,
    pub summary: String,
    pub persisted: bool,
    pub alert: Option<AlertEvent>,
    pub failures: Vec<MetricError>,
}

pub struct Sampler<S, P> {
    source: S,
    presenter: P,
    classifier: Classifier,
    window: RecentWindow,
    store: Arc<SampleStore>,
    alerts: AlertLog,
    read_budget: Duration,
    state: SamplerState,
    started_at: Option<Instant>,
    last_persisted: Option<NaiveDateTime>,
}

impl<S: MetricSource, P: Presenter> Sampler<S, P> {
    pub fn new(config: &Config, source: S, store: Arc<SampleStore>, presenter: P) -> Self {
        let classifier = Classifier::new(config.thresholds.clone());
        Self {
            source,
            presenter,
            alerts: AlertLog::new(classifier.clone()),
            classifier,
            window: RecentWindow::new(config.sampling.max_recent_points),
            store,
            read_budget: config.sampling.read_budget(),
            state: SamplerState::Idle,
            started_at: None,
            last_persisted: None,
        }
    }

    /// Runs one cycle stamped with the local wall clock.
    pub fn tick(&mut self) -> CycleReport {
        let now = Local::now().naive_local();
        let started_at = *self.started_at.get_or_insert_with(Instant::now);
        self.tick_at(now, started_at.elapsed().as_secs_f64())
    }

    /// Runs one cycle with an explicit wall-clock timestamp and seconds since start.
    pub fn tick_at(&mut self, timestamp: NaiveDateTime, elapsed_secs: f64) -> CycleReport {
        if self.state == SamplerState::Idle {
            log::info!("Sampler running");
            self.state = SamplerState::Running;
        }
        let mut timestamp = truncate_to_second(timestamp);

        let budget = self.read_budget;
        let gpu = timed(MetricKind::Gpu, budget, || self.source.read_gpu());
        let cpu = timed(MetricKind::Cpu, budget, || self.source.read_cpu());
        let ram = timed(MetricKind::Ram, budget, || self.source.read_ram());

        let failures: Vec<MetricError> = [
            gpu.as_ref().err(),
            cpu.as_ref().err(),
            ram.as_ref().err(),
        ]
        .into_iter()
        .flatten()
        .cloned()
        .collect();
        for failure in &failures {
            log::warn!("Metric unavailable this cycle: {}", failure);
        }

        let severities = Severities {
            gpu: gpu.as_ref().ok().map(|g| self.classifier.gpu(g.util, g.temp)),
            cpu: cpu.as_ref().ok().map(|c| self.classifier.cpu(c.util)),
            ram: ram.as_ref().ok().map(|r| self.classifier.ram(r.util)),
        };

        if failures.len() < 3 {
            self.window.append(WindowPoint {
                t: elapsed_secs,
                gpu: gpu.as_ref().ok().map(|g| g.util),
                cpu: cpu.as_ref().ok().map(|c| c.util),
                ram: ram.as_ref().ok().map(|r| r.util),
            });
        }

        let mut persisted = false;
        let mut alert = None;
        match (&gpu, &cpu, &ram) {
            (Ok(g), Ok(c), Ok(r)) => {
                let stamp = self.non_decreasing(timestamp);
                let sample = Sample::new(stamp, g.util, g.temp, c.util, r.util);
                match self.store.append(&sample) {
                    Ok(()) => {
                        persisted = true;
                        timestamp = stamp;
                        self.last_persisted = Some(stamp);
                        alert = self.alerts.record_if_critical(&sample);
                    }
                    Err(e) => {
                        log::error!("Failed to persist sample at {}: {}", sample.timestamp_text(), e);
                        self.presenter.on_storage_error(&e);
                    }
                }
            }
            _ => {
                log::debug!("Skipping persistence: {} metric(s) unavailable", failures.len());
            }
        }

        let summary = summary_text(&gpu, &cpu, &ram);
        self.presenter.on_sample(&severities, &summary);
        if let Some(event) = &alert {
            self.presenter.on_alert(event);
        }

        CycleReport {
            timestamp,
            severities,
            summary,
            persisted,
            alert,
            failures,
        }
    }

    /// Persisted timestamps never go backwards, even if the wall clock does.
    fn non_decreasing(&self, timestamp: NaiveDateTime) -> NaiveDateTime {
        match self.last_persisted {
            Some(last) if timestamp < last => {
                log::warn!("Wall clock moved back from {} to {}; keeping {}", last, timestamp, last);
                last
            }
            _ => timestamp,
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    pub fn window(&self) -> &RecentWindow {
        &self.window
    }

    pub fn alerts(&self) -> &AlertLog {
        &self.alerts
    }

    pub fn alerts_mut(&mut self) -> &mut AlertLog {
        &mut self.alerts
    }

    pub fn store(&self) -> &Arc<SampleStore> {
        &self.store
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Ends sampling and hands back the store handle so the host can close it.
    pub fn into_store(self) -> Arc<SampleStore> {
        self.store
    }
}

/// Times a provider read; one that overruns `budget` counts as failed.
fn timed<T>(
    kind: MetricKind,
    budget: Duration,
    read: impl FnOnce() -> Result<T, MetricError>,
) -> Result<T, MetricError> {
    let start = Instant::now();
    let result = read();
    let elapsed = start.elapsed();
    if result.is_ok() && elapsed > budget {
        return Err(MetricError::TimedOut(kind, elapsed, budget));
    }
    result
}

fn summary_text(
    gpu: &Result<GpuReading, MetricError>,
    cpu: &Result<CpuReading, MetricError>,
    ram: &Result<RamReading, MetricError>,
) -> String {
    let gpu_line = match gpu {
        Ok(g) => format!(
            "GPU: Memory Used: {:.2} MB / {:.2} MB, Temp: {:.1} °C, Utilization: {:.1}%",
            g.mem_used as f64 / BYTES_PER_MB,
            g.mem_total as f64 / BYTES_PER_MB,
            g.temp,
            g.util
        ),
        Err(e) => format!("GPU: unavailable ({})", e),
    };
    let cpu_part = match cpu {
        Ok(c) => format!("{:.1}%", c.util),
        Err(_) => "unavailable".to_string(),
    };
    let ram_part = match ram {
        Ok(r) => format!("{:.1}%", r.util),
        Err(_) => "unavailable".to_string(),
    };
    format!("{}\nCPU: CPU Usage: {}, Memory Usage: {}", gpu_line, cpu_part, ram_part)
}
