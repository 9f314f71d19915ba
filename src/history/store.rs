use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDateTime;
use rusqlite::types::Type;
use rusqlite::{params, Connection};

use crate::error::{Error, Result};
use crate::history::sample::{format_timestamp, Sample, TimeRange, TIMESTAMP_FORMAT};

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS resource_usage (
    timestamp TEXT,
    gpu_util REAL,
    gpu_temp REAL,
    cpu_util REAL,
    ram_util REAL
);
CREATE INDEX IF NOT EXISTS idx_resource_usage_timestamp ON resource_usage(timestamp);
";

pub struct SampleStore {
    path: String,
    conn: Mutex<Connection>,
}

impl SampleStore {
    /// Open or create the database at `path` (":memory:" for a private in-memory one).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let conn = Connection::open(path.as_ref())?;
        init_schema(&conn)?;
        log::info!("Sample store opened at {}", path_str);

        Ok(Self { path: path_str, conn: Mutex::new(conn) })
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Persists one sample. The insert is committed before this returns.
    pub fn append(&self, sample: &Sample) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO resource_usage (timestamp, gpu_util, gpu_temp, cpu_util, ram_util)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                sample.timestamp_text(),
                sample.gpu_util,
                sample.gpu_temp,
                sample.cpu_util,
                sample.ram_util,
            ],
        )?;
        Ok(())
    }

    /// Samples with `start <= timestamp <= end`, ascending. Rows sharing a
    /// timestamp keep their insertion order.
    pub fn query(&self, range: &TimeRange) -> Result<Vec<Sample>> {
        if !range.is_valid() {
            log::warn!(
                "Range query with start {} after end {}; returning no rows",
                format_timestamp(&range.start),
                format_timestamp(&range.end)
            );
            return Ok(Vec::new());
        }

        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT timestamp, gpu_util, gpu_temp, cpu_util, ram_util
             FROM resource_usage
             WHERE timestamp BETWEEN ?1 AND ?2
             ORDER BY timestamp ASC, rowid ASC",
        )?;

        let rows = stmt.query_map(
            params![format_timestamp(&range.start), format_timestamp(&range.end)],
            |row| {
                let text: String = row.get(0)?;
                let timestamp = NaiveDateTime::parse_from_str(&text, TIMESTAMP_FORMAT)
                    .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;
                Ok(Sample::new(timestamp, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
            },
        )?;

        let samples = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        log::debug!("Range query returned {} samples", samples.len());
        Ok(samples)
    }

    pub fn count(&self) -> Result<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM resource_usage", [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Releases the connection, reporting any error SQLite raises while closing.
    pub fn close(self) -> Result<()> {
        let conn = self.conn
            .into_inner()
            .map_err(|_| Error::StorageUnavailable("store lock poisoned".to_string()))?;
        conn.close().map_err(|(_, e)| Error::Storage(e))?;
        log::info!("Sample store at {} closed", self.path);
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::StorageUnavailable("store lock poisoned".to_string()))
    }
}

/// WAL with `synchronous = FULL` makes every autocommitted insert durable on return.
fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = FULL;
         PRAGMA busy_timeout = 5000;",
    )?;
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(8, 0, s)
            .unwrap()
    }

    fn sample(s: u32, gpu: f64) -> Sample {
        Sample::new(at(s), gpu, 55.5, 23.25, 41.0)
    }

    #[test]
    fn test_open_in_memory() {
        let store = SampleStore::open_in_memory().unwrap();
        assert_eq!(store.path(), ":memory:");
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_append_then_query_returns_values() {
        let store = SampleStore::open_in_memory().unwrap();
        let s = Sample::new(at(3), 87.5, 66.0, 12.125, 48.75);
        store.append(&s).unwrap();

        let rows = store.query(&TimeRange::new(at(3), at(3))).unwrap();
        assert_eq!(rows, vec![s]);
    }

    #[test]
    fn test_query_is_inclusive_and_sorted() {
        let store = SampleStore::open_in_memory().unwrap();
        for s in [5, 1, 3, 9, 7] {
            store.append(&sample(s, s as f64)).unwrap();
        }

        let rows = store.query(&TimeRange::new(at(3), at(7))).unwrap();
        let seconds: Vec<f64> = rows.iter().map(|r| r.gpu_util).collect();
        assert_eq!(seconds, vec![3.0, 5.0, 7.0]);
    }

    #[test]
    fn test_duplicate_timestamps_kept_in_insert_order() {
        let store = SampleStore::open_in_memory().unwrap();
        store.append(&sample(2, 10.0)).unwrap();
        store.append(&sample(2, 20.0)).unwrap();
        store.append(&sample(2, 30.0)).unwrap();

        let rows = store.query(&TimeRange::new(at(0), at(10))).unwrap();
        let order: Vec<f64> = rows.iter().map(|r| r.gpu_util).collect();
        assert_eq!(order, vec![10.0, 20.0, 30.0]);
        assert_eq!(store.count().unwrap(), 3);
    }

    #[test]
    fn test_inverted_range_is_empty_not_error() {
        let store = SampleStore::open_in_memory().unwrap();
        store.append(&sample(5, 50.0)).unwrap();

        let rows = store.query(&TimeRange::new(at(9), at(1))).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_no_matches_is_empty() {
        let store = SampleStore::open_in_memory().unwrap();
        store.append(&sample(5, 50.0)).unwrap();

        let rows = store.query(&TimeRange::new(at(20), at(30))).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_malformed_row_surfaces_storage_error() {
        let store = SampleStore::open_in_memory().unwrap();
        {
            let conn = store.lock().unwrap();
            conn.execute(
                "INSERT INTO resource_usage VALUES ('2024-05-01 08:00:01x', 1, 1, 1, 1)",
                [],
            )
            .unwrap();
        }
        let result = store.query(&TimeRange::new(at(0), at(59)));
        assert!(matches!(result, Err(Error::Storage(_))));
    }

    #[test]
    fn test_close() {
        let store = SampleStore::open_in_memory().unwrap();
        store.append(&sample(1, 1.0)).unwrap();
        assert!(store.close().is_ok());
    }
}
