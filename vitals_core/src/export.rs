//! CSV export of a user's daily records.

use crate::records::RecordStore;
use crate::types::TIMESTAMP_FORMAT;
use crate::Result;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    date: String,
    sleep: f64,
    water: f64,
    mood: u8,
    meals: &'a str,
    reflection: &'a str,
    timestamp: String,
}

/// Write every record, oldest first, to `csv_path`
///
/// The file is replaced if it exists. Returns the number of rows written.
pub fn export_records_csv(store: &RecordStore, csv_path: &Path) -> Result<usize> {
    // Ensure parent directory exists
    if let Some(parent) = csv_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_path(csv_path)?;

    for (date, record) in store.all() {
        writer.serialize(CsvRow {
            date: date.format("%Y-%m-%d").to_string(),
            sleep: record.sleep,
            water: record.water,
            mood: record.mood,
            meals: &record.meals,
            reflection: &record.reflection,
            timestamp: record.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        })?;
    }

    // Flush and sync to disk
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} record(s) to {:?}", store.len(), csv_path);
    Ok(store.len())
}
