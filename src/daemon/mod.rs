mod signals;

pub use signals::setup_signal_handlers;

use crate::error::Result;
use crate::history::SampleStore;
use crate::metrics::MetricSource;
use crate::presenter::Presenter;
use crate::sampler::Sampler;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Granularity of the stop-flag check while waiting for the next tick.
const STOP_POLL: Duration = Duration::from_millis(100);

pub struct Daemon<S, P> {
    sampler: Sampler<S, P>,
    period: Duration,
    stop: Arc<AtomicBool>,
    cycles: u64,
    skipped: u64,
}

impl<S: MetricSource, P: Presenter> Daemon<S, P> {
    pub fn new(sampler: Sampler<S, P>, period: Duration) -> Self {
        Self {
            sampler,
            period: period.max(Duration::from_millis(1)),
            stop: Arc::new(AtomicBool::new(false)),
            cycles: 0,
            skipped: 0,
        }
    }

    /// Handle that stops the loop when set, from any thread or a signal handler.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    pub fn sampler(&self) -> &Sampler<S, P> {
        &self.sampler
    }

    /// Ticks until the stop flag is raised or `max_cycles` is reached.
    pub fn run(&mut self, max_cycles: Option<u64>) {
        log::info!("Starting monitoring loop (interval: {}ms)", self.period.as_millis());

        loop {
            if self.should_stop() {
                log::info!("Stop signal received");
                break;
            }
            if max_cycles.is_some_and(|max| self.cycles >= max) {
                break;
            }

            let loop_start = Instant::now();
            let report = self.sampler.tick();
            self.cycles += 1;
            log::debug!(
                "Cycle {} at {}: persisted={} failures={}",
                self.cycles,
                report.timestamp,
                report.persisted,
                report.failures.len()
            );

            self.sleep_until_next_cycle(loop_start);
        }

        log::info!("Monitoring loop stopped after {} cycles ({} ticks skipped)", self.cycles, self.skipped);
    }

    /// Runs until stopped, then closes the store. The store is released on
    /// every path: explicitly here, or by `Drop` if the loop unwinds.
    pub fn run_to_shutdown(mut self) -> Result<()> {
        self.run(None);
        let store = self.sampler.into_store();
        close_store(store)
    }

    fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    /// Sleeps to the next period boundary. An overrunning cycle skips the
    /// ticks it missed instead of running them back to back.
    fn sleep_until_next_cycle(&mut self, loop_start: Instant) {
        let elapsed = loop_start.elapsed();
        let period_nanos = self.period.as_nanos();
        let missed = (elapsed.as_nanos() / period_nanos) as u64;
        if missed > 0 {
            log::warn!(
                "Cycle took {}ms, longer than the {}ms period; skipping {} tick(s)",
                elapsed.as_millis(),
                self.period.as_millis(),
                missed
            );
            self.skipped += missed;
        }

        let into_period = Duration::from_nanos((elapsed.as_nanos() % period_nanos) as u64);
        let deadline = Instant::now() + (self.period - into_period);
        while !self.should_stop() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep((deadline - now).min(STOP_POLL));
        }
    }
}

/// Closes the store if this is the last handle to it; otherwise the final
/// holder releases it on drop.
pub fn close_store(store: Arc<SampleStore>) -> Result<()> {
    match Arc::try_unwrap(store) {
        Ok(store) => store.close(),
        Err(shared) => {
            log::warn!(
                "Sample store {} still shared by {} other handle(s); it closes when the last one drops",
                shared.path(),
                Arc::strong_count(&shared) - 1
            );
            Ok(())
        }
    }
}

/// Installs signal handlers and runs the daemon until SIGINT/SIGTERM.
pub fn start<S: MetricSource, P: Presenter>(daemon: Daemon<S, P>) -> Result<()> {
    log::info!("Initializing sampler daemon");
    setup_signal_handlers(&daemon.stop_handle())?;
    daemon.run_to_shutdown()
}
