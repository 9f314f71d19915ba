use crate::history::sample::Sample;
use crate::error::{Error, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use serde_json::json;

pub fn export_to_csv(samples: &[Sample], path: &Path) -> Result<()> {
    let mut file = File::create(path)?;

    writeln!(file, "timestamp,gpu_util,gpu_temp,cpu_util,ram_util")?;

    for sample in samples {
        writeln!(
            file,
            "{},{},{},{},{}",
            sample.timestamp_text(),
            sample.gpu_util,
            sample.gpu_temp,
            sample.cpu_util,
            sample.ram_util
        )?;
    }

    file.sync_all()?;
    Ok(())
}

pub fn export_to_json(samples: &[Sample], path: &Path) -> Result<()> {
    let rows: Vec<_> = samples.iter()
        .map(|s| json!({
            "timestamp": s.timestamp_text(),
            "gpu_util": s.gpu_util,
            "gpu_temp": s.gpu_temp,
            "cpu_util": s.cpu_util,
            "ram_util": s.ram_util,
        }))
        .collect();

    let output = json!({
        "count": rows.len(),
        "samples": rows,
    });

    let json_str = serde_json::to_string_pretty(&output)
        .map_err(|e| Error::Export(format!("Failed to serialize JSON: {}", e)))?;

    let mut file = File::create(path)?;
    file.write_all(json_str.as_bytes())?;
    file.sync_all()?;

    Ok(())
}

/// Picks the format from the file extension (`.csv` or `.json`).
pub fn export_by_extension(samples: &[Sample], path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()).map(str::to_ascii_lowercase).as_deref() {
        Some("csv") => export_to_csv(samples, path),
        Some("json") => export_to_json(samples, path),
        _ => Err(Error::Export(format!(
            "Unsupported export format for {} (use .csv or .json)",
            path.display()
        ))),
    }
}
