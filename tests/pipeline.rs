use chrono::{NaiveDate, NaiveDateTime};
use resource_sentinel::history::{self, HistoryNotice, Sample, SampleStore, TimeRange};
use resource_sentinel::metrics::{CpuReading, GpuReading, MetricKind, RamReading, ScriptedSource};
use resource_sentinel::presenter::{ChannelPresenter, NullPresenter, PresenterEvent};
use resource_sentinel::{Config, MetricError, Sampler, SeverityLevel};
use std::sync::Arc;
use std::time::Duration;

fn at(s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 9, 14)
        .unwrap()
        .and_hms_opt(18, s / 60, s % 60)
        .unwrap()
}

fn whole_day() -> TimeRange {
    TimeRange::parse("2024-09-14 00:00:00", "2024-09-14 23:59:59").unwrap()
}

#[test]
fn samples_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resource_monitor.db");

    {
        let store = Arc::new(SampleStore::open(&path).unwrap());
        let mut source = ScriptedSource::new();
        source.push_cycle(33.0, 61.0, 12.5, 47.25);
        let mut sampler = Sampler::new(&Config::default(), source, store, NullPresenter);
        assert!(sampler.tick_at(at(1), 0.0).persisted);
        // No close: dropping must not lose a committed sample.
    }

    let store = SampleStore::open(&path).unwrap();
    let rows = store.query(&whole_day()).unwrap();
    assert_eq!(rows, vec![Sample::new(at(1), 33.0, 61.0, 12.5, 47.25)]);
    store.close().unwrap();
}

#[test]
fn partial_cycles_are_never_persisted() {
    let store = Arc::new(SampleStore::open_in_memory().unwrap());
    let mut source = ScriptedSource::new();
    let gpu_down = || -> Result<GpuReading, MetricError> {
        Err(MetricError::ReadFailed(MetricKind::Gpu, "nvml".to_string()))
    };

    // cycle 0: complete; cycle 1: GPU fails; cycle 2: RAM fails; cycle 3: complete
    source.push_cycle(10.0, 40.0, 10.0, 10.0);
    source.push_gpu(gpu_down());
    source.push_cpu(Ok(CpuReading { util: 20.0 }));
    source.push_ram(Ok(RamReading { util: 20.0 }));
    source.push_gpu(Ok(GpuReading {
        util: 95.0,
        temp: 90.0,
        mem_used: 0,
        mem_total: 0,
    }));
    source.push_cpu(Ok(CpuReading { util: 30.0 }));
    source.push_ram(Err(MetricError::TimedOut(MetricKind::Ram, Duration::from_secs(2), Duration::from_secs(1))));
    source.push_cycle(40.0, 40.0, 40.0, 40.0);

    let mut sampler = Sampler::new(&Config::default(), source, Arc::clone(&store), NullPresenter);
    let persisted: Vec<bool> = (0..4).map(|i| sampler.tick_at(at(i), i as f64).persisted).collect();

    assert_eq!(persisted, vec![true, false, false, true]);
    assert_eq!(sampler.window().len(), 4);
    // The Critical GPU reading in cycle 2 was not persisted, so it raised no alert.
    assert!(sampler.alerts().is_empty());

    let rows = store.query(&whole_day()).unwrap();
    let gpu: Vec<f64> = rows.iter().map(|r| r.gpu_util).collect();
    assert_eq!(gpu, vec![10.0, 40.0]);
}

#[test]
fn every_alert_matches_a_critical_persisted_sample() {
    let store = Arc::new(SampleStore::open_in_memory().unwrap());
    let mut source = ScriptedSource::new();
    let readings = [
        (95.0, 60.0),
        (75.0, 72.0),
        (20.0, 85.0),
        (90.0, 80.0),
        (92.0, 82.0),
        (5.0, 30.0),
    ];
    for (util, temp) in readings {
        source.push_cycle(util, temp, 50.0, 40.0);
    }

    let (presenter, rx) = ChannelPresenter::new();
    let mut sampler = Sampler::new(&Config::default(), source, Arc::clone(&store), presenter);
    for i in 0..readings.len() {
        sampler.tick_at(at(i as u32), i as f64);
    }

    let events = sampler.alerts_mut().drain_new();
    assert_eq!(events.len(), 3);

    let rows = store.query(&whole_day()).unwrap();
    for event in &events {
        let matching: Vec<&Sample> = rows.iter().filter(|s| s.timestamp == event.timestamp).collect();
        assert_eq!(matching.len(), 1);
        assert!(matching[0].gpu_util > 90.0 || matching[0].gpu_temp > 80.0);
    }

    let alerts_seen = rx.try_iter().filter(|e| matches!(e, PresenterEvent::Alert(_))).count();
    assert_eq!(alerts_seen, 3);
}

#[test]
fn scenario_severities() {
    let store = Arc::new(SampleStore::open_in_memory().unwrap());
    let mut source = ScriptedSource::new();
    source.push_cycle(95.0, 60.0, 50.0, 40.0);
    source.push_cycle(75.0, 72.0, 80.0, 85.0);
    let mut sampler = Sampler::new(&Config::default(), source, store, NullPresenter);

    let first = sampler.tick_at(at(0), 0.0);
    assert_eq!(first.severities.gpu, Some(SeverityLevel::Critical));
    assert!(first.alert.is_some());

    let second = sampler.tick_at(at(1), 1.0);
    assert_eq!(second.severities.gpu, Some(SeverityLevel::Warning));
    assert_eq!(second.severities.cpu, Some(SeverityLevel::Warning));
    assert_eq!(second.severities.ram, Some(SeverityLevel::Warning));
    assert!(second.alert.is_none());
}

#[test]
fn inverted_range_returns_empty() {
    let store = SampleStore::open_in_memory().unwrap();
    store.append(&Sample::new(at(5), 1.0, 1.0, 1.0, 1.0)).unwrap();

    let rows = store.query(&TimeRange::new(at(10), at(0))).unwrap();
    assert!(rows.is_empty());

    let report = history::load_history(&store, "2024-09-14 18:00:10", "2024-09-14 18:00:00", Duration::from_secs(1)).unwrap();
    assert!(report.samples.is_empty());
    assert!(matches!(report.notice, Some(HistoryNotice::InvalidRange(_))));
}

#[test]
fn queries_run_alongside_sampling() {
    let store = Arc::new(SampleStore::open_in_memory().unwrap());
    let mut source = ScriptedSource::new();
    for i in 0..200 {
        source.push_cycle(i as f64 % 100.0, 50.0, 25.0, 35.0);
    }
    let mut sampler = Sampler::new(&Config::default(), source, Arc::clone(&store), NullPresenter);

    let reader_store = Arc::clone(&store);
    let reader = std::thread::spawn(move || {
        let mut last = 0;
        for _ in 0..50 {
            let rows = reader_store.query(&whole_day()).unwrap();
            assert!(rows.len() >= last);
            assert!(rows.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
            for row in &rows {
                assert_eq!(row.gpu_temp, 50.0);
                assert_eq!(row.cpu_util, 25.0);
            }
            last = rows.len();
        }
    });

    for i in 0..200 {
        sampler.tick_at(at(i), i as f64);
    }
    reader.join().unwrap();

    assert_eq!(store.count().unwrap(), 200);
}

#[test]
fn export_queried_range() {
    let dir = tempfile::tempdir().unwrap();
    let store = SampleStore::open_in_memory().unwrap();
    for s in 0..5 {
        store.append(&Sample::new(at(s), 10.0 * s as f64, 50.0, 20.0, 30.0)).unwrap();
    }

    let report = history::load_range(&store, &TimeRange::new(at(1), at(3)), Duration::from_secs(1)).unwrap();
    assert_eq!(report.samples.len(), 3);

    let csv = dir.path().join("range.csv");
    history::export_by_extension(&report.samples, &csv).unwrap();
    let content = std::fs::read_to_string(&csv).unwrap();
    assert_eq!(content.lines().count(), 4);
    assert!(content.contains("2024-09-14 18:00:02,20,50,20,30"));
}
