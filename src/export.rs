//! Export of tracking results
//!
//! One row per growth line and time step with the number of hypotheses in
//! the optimal segmentation, written as CSV (`growth_line,time,active_hypotheses`)
//! or JSON.

use std::fmt;
use std::io::Write;

use csv::WriterBuilder;
use serde::Serialize;

use crate::errors::TrackingError;
use crate::growth_line::GrowthLine;
use crate::solver::IlpModel;
use crate::tree::RegionTree;

/// CSV header line
pub const CSV_HEADER: &str = "growth_line,time,active_hypotheses";

/// Active hypotheses of one growth line at one time step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActiveCountRow {
    pub growth_line: usize,
    pub time: usize,
    pub active_hypotheses: usize,
}

/// Collect rows for every solved growth line
///
/// Lines without a usable solution are skipped with a warning.
pub fn active_count_rows<T: RegionTree, M: IlpModel>(lines: &[GrowthLine<T, M>]) -> Vec<ActiveCountRow> {
    let mut rows = Vec::new();
    for (index, line) in lines.iter().enumerate() {
        match line.active_hypothesis_counts() {
            Ok(counts) => rows.extend(counts.into_iter().enumerate().map(|(time, count)| {
                ActiveCountRow {
                    growth_line: index,
                    time,
                    active_hypotheses: count,
                }
            })),
            Err(e) => log::warn!("Skipping growth line {} in export: {}", index, e),
        }
    }
    rows
}

fn export_error(e: impl fmt::Display) -> TrackingError {
    TrackingError::Export {
        description: e.to_string(),
    }
}

/// Write rows as CSV
///
/// The header is written even when there are no rows.
pub fn write_csv<W: Write>(rows: &[ActiveCountRow], writer: W) -> Result<(), TrackingError> {
    let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
    wtr.write_record(CSV_HEADER.split(',')).map_err(export_error)?;
    for row in rows {
        wtr.serialize(row).map_err(export_error)?;
    }
    wtr.flush().map_err(export_error)
}

/// Rows as a CSV string
pub fn to_csv_string(rows: &[ActiveCountRow]) -> Result<String, TrackingError> {
    let mut buffer = Vec::new();
    write_csv(rows, &mut buffer)?;
    String::from_utf8(buffer).map_err(export_error)
}

/// Rows as a pretty-printed JSON array
pub fn to_json(rows: &[ActiveCountRow]) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(rows)
}
