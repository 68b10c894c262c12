//! CSV loading for the incident dataset.
//!
//! The dataset has a header row followed by one incident per record.
//! Quoted fields may contain commas and line breaks. Only these columns are
//! read:
//!
//! | index | column            |
//! |-------|-------------------|
//! | 0     | incident id       |
//! | 1     | date (YYYY-MM-DD) |
//! | 2     | state / region    |
//! | 3     | city or county    |
//! | 4     | address           |
//! | 5     | number killed     |
//! | 6     | number injured    |
//! | 7     | latitude          |
//! | 8     | longitude         |
//!
//! Rows missing any required field, with a number that does not parse, with
//! coordinates off the globe, or with text that is not UTF-8 are skipped
//! rather than failing the whole load.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, info};

use crate::geo::Coordinate;
use crate::model::Incident;

const COL_ID: usize = 0;
const COL_DATE: usize = 1;
const COL_REGION: usize = 2;
const COL_CITY: usize = 3;
const COL_ADDRESS: usize = 4;
const COL_KILLED: usize = 5;
const COL_INJURED: usize = 6;
const COL_LATITUDE: usize = 7;
const COL_LONGITUDE: usize = 8;

/// Error type for dataset loading.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("dataset not found at: {0}")]
    NotFound(PathBuf),
    #[error("failed to read dataset: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why a single row was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RowError {
    #[error("missing required column {0}")]
    Missing(usize),
    #[error("column {column} is not a valid number: {value:?}")]
    BadNumber { column: usize, value: String },
}

/// Incidents parsed from a dataset, plus what was left out.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    pub incidents: Vec<Incident>,

    /// Rows rejected for missing or malformed fields.
    pub skipped_rows: usize,

    /// Rows whose id had already been seen. The first occurrence is kept.
    pub duplicate_ids: usize,
}

/// Load incidents from a CSV file on disk.
pub fn load_incidents<P: AsRef<Path>>(path: P) -> Result<LoadOutcome, LoadError> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(LoadError::NotFound(path.to_path_buf()));
    }

    let outcome = parse_incidents(File::open(path)?)?;

    info!(
        path = %path.display(),
        incidents = outcome.incidents.len(),
        skipped = outcome.skipped_rows,
        duplicates = outcome.duplicate_ids,
        "Dataset loaded"
    );

    Ok(outcome)
}

/// Parse incidents from any CSV source with a header row.
pub fn parse_incidents<R: Read>(reader: R) -> Result<LoadOutcome, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut outcome = LoadOutcome::default();
    let mut seen_ids = HashSet::new();

    for (line, result) in csv_reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                debug!(record = line + 1, error = %e, "Skipping unreadable incident row");
                outcome.skipped_rows += 1;
                continue;
            }
        };

        let incident = match parse_record(&record) {
            Ok(incident) => incident,
            Err(e) => {
                debug!(record = line + 1, error = %e, "Skipping incident row");
                outcome.skipped_rows += 1;
                continue;
            }
        };

        if !seen_ids.insert(incident.id.clone()) {
            debug!(id = %incident.id, "Skipping duplicate incident id");
            outcome.duplicate_ids += 1;
            continue;
        }

        outcome.incidents.push(incident);
    }

    Ok(outcome)
}

/// Turn one CSV record into a validated incident.
pub fn parse_record(record: &StringRecord) -> Result<Incident, RowError> {
    let id = required(record, COL_ID)?;
    let region = required(record, COL_REGION)?;
    let city = required(record, COL_CITY)?;
    let address = required(record, COL_ADDRESS)?;

    let killed: u32 = parse_number(COL_KILLED, required(record, COL_KILLED)?)?;
    let injured: u32 = parse_number(COL_INJURED, required(record, COL_INJURED)?)?;
    let latitude: f64 = parse_number(COL_LATITUDE, required(record, COL_LATITUDE)?)?;
    let longitude: f64 = parse_number(COL_LONGITUDE, required(record, COL_LONGITUDE)?)?;

    let location = Coordinate::new(latitude, longitude);
    if !location.is_valid() {
        let (column, value) = if Coordinate::new(latitude, 0.0).is_valid() {
            (COL_LONGITUDE, longitude)
        } else {
            (COL_LATITUDE, latitude)
        };
        return Err(RowError::BadNumber {
            column,
            value: value.to_string(),
        });
    }

    let date = record
        .get(COL_DATE)
        .and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok());

    Ok(Incident {
        id: id.to_string(),
        address: address.to_string(),
        region: region.to_string(),
        city: city.to_string(),
        longitude,
        latitude,
        killed,
        injured,
        date,
    })
}

fn required(record: &StringRecord, column: usize) -> Result<&str, RowError> {
    match record.get(column) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(RowError::Missing(column)),
    }
}

fn parse_number<T: std::str::FromStr>(column: usize, value: &str) -> Result<T, RowError> {
    value.parse().map_err(|_| RowError::BadNumber {
        column,
        value: value.to_string(),
    })
}
