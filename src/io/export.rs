//! Export the ex-ante rate frame to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::domain::RateFrame;
use crate::error::AppError;

/// Default file name offered by the dashboard export.
pub const DEFAULT_EXPORT_FILE: &str = "tasa_real_ex_ante.csv";

const HEADER: [&str; 5] = ["month", "overnight_rate_mean", "expectation", "ex_ante_real_rate", "date"];

#[derive(Debug, Serialize)]
struct RateRecord {
    month: String,
    overnight_rate_mean: f64,
    expectation: f64,
    ex_ante_real_rate: f64,
    date: String,
}

/// Write the frame as CSV to any writer. The header is always written.
pub fn write_rate_csv<W: Write>(writer: W, frame: &RateFrame) -> Result<(), AppError> {
    let mut wtr = csv::WriterBuilder::new().has_headers(false).from_writer(writer);

    wtr.write_record(HEADER)
        .map_err(|e| AppError::config(format!("Failed to write export CSV header: {e}")))?;

    for row in &frame.rows {
        let day = row.month.first_day().format("%Y-%m-%d").to_string();
        wtr.serialize(RateRecord {
            month: day.clone(),
            overnight_rate_mean: row.overnight_rate,
            expectation: row.expectation,
            ex_ante_real_rate: row.ex_ante,
            date: day,
        })
        .map_err(|e| AppError::config(format!("Failed to write export CSV row: {e}")))?;
    }

    wtr.flush()
        .map_err(|e| AppError::config(format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

/// Write the frame to a CSV file at `path`.
pub fn write_rate_csv_file(path: &Path, frame: &RateFrame) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::config(format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_rate_csv(file, frame)
}
