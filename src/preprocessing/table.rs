//! History-table ingestion and repair.
//!
//! Accepts well-formed CSVs as well as the known malformed export where
//! every row landed in a single semicolon- or comma-delimited text column.

use std::path::Path;

use chrono::NaiveDate;

use crate::error::{AppError, Result};
use crate::types::Reading;

/// Date format the upstream export writes.
const DATE_FORMAT: &str = "%m/%d/%Y";

/// Outcome of merged-column detection on the header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnShape {
    /// Header already has multiple columns.
    WellFormed,
    /// One column whose text contains ';' separators.
    SemicolonMerged,
    /// One column whose text contains ',' separators.
    CommaMerged,
    /// One column with no recognizable separator.
    Unrecoverable,
}

/// Classify the header row of a parsed table.
pub fn detect_shape(header: &[String]) -> ColumnShape {
    if header.len() != 1 {
        return ColumnShape::WellFormed;
    }
    let only = &header[0];
    if only.contains(';') {
        ColumnShape::SemicolonMerged
    } else if only.contains(',') {
        ColumnShape::CommaMerged
    } else {
        ColumnShape::Unrecoverable
    }
}

/// A header plus data rows, after any column-shape repair.
#[derive(Debug, Clone)]
struct RawTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

fn split_row(row: &str, delim: char) -> Vec<String> {
    row.split(delim).map(|s| s.trim().to_string()).collect()
}

/// Repair a merged-column table by re-splitting every cell, or pass a
/// well-formed one through unchanged.
fn repair(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<RawTable> {
    match detect_shape(&columns) {
        ColumnShape::WellFormed => Ok(RawTable { columns, rows }),
        ColumnShape::SemicolonMerged => Ok(resplit(columns, rows, ';')),
        ColumnShape::CommaMerged => Ok(resplit(columns, rows, ',')),
        ColumnShape::Unrecoverable => Err(AppError::MalformedTable(format!(
            "single column '{}' with no recognizable delimiter",
            columns[0]
        ))),
    }
}

fn resplit(columns: Vec<String>, rows: Vec<Vec<String>>, delim: char) -> RawTable {
    let columns = split_row(&columns[0], delim);
    let rows = rows
        .iter()
        .map(|r| split_row(r.first().map(String::as_str).unwrap_or(""), delim))
        .collect();
    RawTable { columns, rows }
}

/// Locate the case-sensitive 'date' column.
fn date_column(table: &RawTable) -> Result<usize> {
    table
        .columns
        .iter()
        .position(|c| c == "date")
        .ok_or_else(|| AppError::MissingDateColumn {
            columns: table.columns.clone(),
        })
}

/// Locate the AQI column case-insensitively (trimmed).
fn aqi_column(table: &RawTable) -> Result<usize> {
    table
        .columns
        .iter()
        .position(|c| c.trim().eq_ignore_ascii_case("aqi"))
        .ok_or_else(|| AppError::MissingAqiColumn {
            columns: table.columns.clone(),
        })
}

/// Load and canonicalize a city's historical readings.
///
/// Rows with unparseable dates or non-numeric AQI values are dropped
/// silently; a table with no resolvable date or AQI column after repair
/// fails with the columns actually found. The result is sorted ascending
/// by date.
pub fn load_history(path: &Path) -> Result<Vec<Reading>> {
    if !path.exists() {
        return Err(AppError::ArtifactMissing {
            path: path.display().to_string(),
        });
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_path(path)?;

    let columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(|f| f.to_string()).collect::<Vec<_>>());
    }

    parse_table(columns, rows)
}

/// Shared core for file and in-memory tables.
fn parse_table(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Vec<Reading>> {
    let table = repair(columns, rows)?;
    let date_idx = date_column(&table)?;
    let aqi_idx = aqi_column(&table)?;

    let mut readings: Vec<Reading> = table
        .rows
        .iter()
        .filter_map(|row| {
            let date_cell = row.get(date_idx)?;
            let aqi_cell = row.get(aqi_idx)?;
            let date = NaiveDate::parse_from_str(date_cell, DATE_FORMAT).ok()?;
            let aqi: f64 = aqi_cell.parse().ok()?;
            Some(Reading { date, aqi })
        })
        .collect();

    readings.sort_by_key(|r| r.date);
    Ok(readings)
}
