use clap::Parser;
use resource_sentinel::alerts::AlertEvent;
use resource_sentinel::daemon::{self, Daemon};
use resource_sentinel::history::{self, SampleStore};
use resource_sentinel::metrics::HostSource;
use resource_sentinel::presenter::Presenter;
use resource_sentinel::{Config, Error, Result, Sampler, Severities, SeverityLevel};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "resource-sentinel")]
#[command(author, version, about = "GPU/CPU/RAM sampler with persisted history", long_about = None)]
struct Args {
    #[arg(short, long, help = "Sampling period in seconds")]
    interval: Option<u64>,

    #[arg(short, long, help = "Path to custom config file")]
    config: Option<PathBuf>,

    #[arg(long, help = "Path to the SQLite history database")]
    db: Option<PathBuf>,

    #[arg(
        long,
        num_args = 2,
        value_names = ["START", "END"],
        help = "Print history between two \"YYYY-MM-DD HH:MM:SS\" timestamps and exit"
    )]
    history: Option<Vec<String>>,

    #[arg(long, value_name = "FILE", requires = "history", help = "Export the queried history to FILE (.csv or .json)")]
    export: Option<PathBuf>,

    #[arg(long, help = "Disable GPU monitoring")]
    no_gpu: bool,

    #[arg(short, long, help = "Verbose logging")]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    log::info!("Starting resource-sentinel v{}", env!("CARGO_PKG_VERSION"));

    let mut config = match &args.config {
        Some(path) => {
            log::info!("Loading config from: {}", path.display());
            Config::load_from(path)?
        }
        None => Config::load().unwrap_or_else(|e| {
            log::warn!("Ignoring user config: {}", e);
            Config::default()
        }),
    };

    if let Some(interval) = args.interval {
        config.sampling.period_secs = interval;
    }
    if let Some(db) = args.db {
        config.storage.path = db;
    }
    config.validate()?;

    match args.history {
        Some(bounds) => run_history(&config, &bounds, args.export),
        None => run_sampler(config, !args.no_gpu),
    }
}

fn run_history(config: &Config, bounds: &[String], export: Option<PathBuf>) -> Result<()> {
    let [start, end] = bounds else {
        return Err(Error::Parse("--history takes exactly two timestamps".to_string()));
    };

    let store = SampleStore::open(&config.storage.path)?;
    let report = history::load_history(&store, start, end, config.sampling.period());

    let outcome = report.and_then(|report| {
        if let Some(notice) = &report.notice {
            println!("Note: {}", notice);
        }

        match &export {
            Some(path) => {
                history::export_by_extension(&report.samples, path)?;
                log::info!("Exported {} samples to {}", report.samples.len(), path.display());
            }
            None => {
                println!("timestamp,gpu_util,gpu_temp,cpu_util,ram_util");
                for s in &report.samples {
                    println!(
                        "{},{:.1},{:.1},{:.1},{:.1}",
                        s.timestamp_text(),
                        s.gpu_util,
                        s.gpu_temp,
                        s.cpu_util,
                        s.ram_util
                    );
                }
            }
        }
        Ok(())
    });

    store.close()?;
    outcome
}

fn run_sampler(config: Config, enable_gpu: bool) -> Result<()> {
    log::info!("Running headless sampler (period: {}s)", config.sampling.period_secs);

    let store = Arc::new(SampleStore::open(&config.storage.path)?);
    let source = HostSource::new(enable_gpu);

    log::info!("CPU cores detected: {}", source.system().cpu_count());
    log::info!("Total memory: {} MB", source.system().memory_total() / 1024 / 1024);

    let sampler = Sampler::new(&config, source, store, ConsolePresenter);
    let daemon = Daemon::new(sampler, config.sampling.period());

    daemon::start(daemon)
}

/// Prints one line per cycle to stdout.
struct ConsolePresenter;

fn label(level: Option<SeverityLevel>) -> String {
    level.map(|l| l.to_string()).unwrap_or_else(|| "n/a".to_string())
}

impl Presenter for ConsolePresenter {
    fn on_sample(&mut self, severities: &Severities, summary: &str) {
        println!(
            "[GPU {} | CPU {} | RAM {}] {}",
            label(severities.gpu),
            label(severities.cpu),
            label(severities.ram),
            summary.replace('\n', " | ")
        );
    }

    fn on_alert(&mut self, event: &AlertEvent) {
        println!("ALERT {}", event.message);
    }

    fn on_storage_error(&mut self, error: &Error) {
        println!("STORAGE ERROR {} (retrying next cycle)", error);
    }
}
