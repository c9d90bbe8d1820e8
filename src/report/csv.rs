use std::path::Path;

use anyhow::{Context, Result};

use crate::stats::MonthBucket;

/// CSV header columns
const HEADER: [&str; 2] = ["month", "active_members"];

/// Write one row per month in chronological order, with a header row.
pub fn write_csv(path: &Path, buckets: &[MonthBucket]) -> Result<()> {
    let mut writer = ::csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create CSV file {}", path.display()))?;

    writer.write_record(HEADER)?;
    for bucket in buckets {
        writer.write_record([bucket.month.to_string(), bucket.active.to_string()])?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush CSV file {}", path.display()))?;
    Ok(())
}

/// Read a CSV written by `write_csv` back into the month series.
pub fn read_csv(path: &Path) -> Result<Vec<MonthBucket>> {
    let mut reader = ::csv::Reader::from_path(path)
        .with_context(|| format!("Failed to open CSV file {}", path.display()))?;

    let mut buckets = Vec::new();
    for (row, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", row + 1))?;
        let month = record
            .get(0)
            .with_context(|| format!("CSV row {} has no month column", row + 1))?
            .parse()
            .with_context(|| format!("CSV row {}", row + 1))?;
        let active = record
            .get(1)
            .with_context(|| format!("CSV row {} has no count column", row + 1))?
            .parse()
            .with_context(|| format!("CSV row {}: invalid count", row + 1))?;
        buckets.push(MonthBucket { month, active });
    }
    Ok(buckets)
}
