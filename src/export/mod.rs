//! CSV files in the record layout external tools read:
//! `text, sentiment, source, date, user_id, location, confidence`.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::app::Result;
use crate::domain::ReviewRecord;

pub const COLUMNS: [&str; 7] = [
    "text",
    "sentiment",
    "source",
    "date",
    "user_id",
    "location",
    "confidence",
];

/// `scraped_reviews_YYYYMMDD_HHMMSS.csv` in the current directory
pub fn default_output_path() -> PathBuf {
    PathBuf::from(format!(
        "scraped_reviews_{}.csv",
        Local::now().format("%Y%m%d_%H%M%S")
    ))
}

pub fn write_records<W: Write>(writer: W, records: &[ReviewRecord]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    if records.is_empty() {
        csv.write_record(COLUMNS)?;
    }
    for record in records {
        csv.serialize(record)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn read_records<R: Read>(reader: R) -> Result<Vec<ReviewRecord>> {
    let mut csv = csv::Reader::from_reader(reader);
    let records = csv
        .deserialize()
        .collect::<std::result::Result<Vec<ReviewRecord>, _>>()?;
    Ok(records)
}

pub fn write_csv<P: AsRef<Path>>(path: P, records: &[ReviewRecord]) -> Result<()> {
    let file = File::create(path.as_ref())?;
    write_records(file, records)?;
    tracing::info!("Wrote {} records to {}", records.len(), path.as_ref().display());
    Ok(())
}

pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<Vec<ReviewRecord>> {
    let file = File::open(path.as_ref())?;
    read_records(file)
}
