use chrono::{DateTime, NaiveDate, NaiveDateTime};
use log::{info, warn};
use serde::Serialize;

use crate::error::IngestError;
use crate::loader::{CellValue, RawTable, excel_serial_to_datetime};
use crate::record::Record;
use crate::schema::{columns, display};
use crate::station::Station;

/// Text layouts accepted for the acquisition time, tried in order
const DATETIME_FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// What ingestion kept and what it left out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    /// Non-blank data rows in the upload
    pub rows_read: usize,
    /// Rows whose acquisition time was empty or could not be parsed
    pub dropped_bad_timestamp: usize,
    /// Rows with a valid time but a station outside the line
    pub dropped_unknown_station: usize,
    /// Rows that became records
    pub kept: usize,
}

impl IngestReport {
    pub fn dropped(&self) -> usize {
        self.dropped_bad_timestamp + self.dropped_unknown_station
    }
}

/// Records that survived validation, in upload order
#[derive(Debug, Clone, Default)]
pub struct CleanedDataset {
    pub records: Vec<Record>,
    pub report: IngestReport,
}

struct ColumnIndexes {
    body: usize,
    station: usize,
    acquired_at: usize,
    lot: usize,
}

impl ColumnIndexes {
    fn locate(table: &RawTable) -> Result<Self, IngestError> {
        let find = |name: &'static str| {
            table
                .column_index(name)
                .ok_or(IngestError::MissingColumn { missing: name })
        };
        Ok(ColumnIndexes {
            body: find(columns::BODY)?,
            station: find(columns::STATION)?,
            acquired_at: find(columns::ACQUIRED_AT)?,
            lot: find(columns::LOT)?,
        })
    }
}

/// Validate and clean a raw table into tracking records
///
/// Fails only when one of the four required columns is absent, naming the
/// first one missing (in body, station, time, lot order). Rows with an
/// unusable time are dropped first; of the remaining rows, those whose
/// station is not on the line are dropped next. Completely blank rows are
/// skipped without being counted.
///
/// # Arguments
/// * `table` - The decoded upload
///
/// # Returns
/// * `Result<CleanedDataset, IngestError>` - Kept records plus drop counts
pub fn ingest(table: &RawTable) -> Result<CleanedDataset, IngestError> {
    let idx = ColumnIndexes::locate(table)?;

    let mut report = IngestReport::default();
    let mut records = Vec::with_capacity(table.rows.len());

    for row in &table.rows {
        if row.iter().all(CellValue::is_empty) {
            continue;
        }
        report.rows_read += 1;

        let Some(acquired_at) = parse_timestamp(&row[idx.acquired_at]) else {
            report.dropped_bad_timestamp += 1;
            continue;
        };

        let station = match &row[idx.station] {
            CellValue::Text(name) => Station::from_name(name),
            _ => None,
        };
        let Some(station) = station else {
            report.dropped_unknown_station += 1;
            continue;
        };

        records.push(Record::new(
            cell_text(&row[idx.body]),
            station,
            acquired_at,
            cell_text(&row[idx.lot]),
        ));
    }

    report.kept = records.len();
    if report.dropped_bad_timestamp > 0 {
        warn!(
            "Dropped {} row(s) with an empty or unparseable '{}'",
            report.dropped_bad_timestamp,
            columns::ACQUIRED_AT
        );
    }
    if report.dropped_unknown_station > 0 {
        warn!(
            "Dropped {} row(s) with a station outside the line",
            report.dropped_unknown_station
        );
    }
    info!("Ingested {} of {} row(s)", report.kept, report.rows_read);

    Ok(CleanedDataset { records, report })
}

/// Coerce a cell into an acquisition time, `None` when it is not one
pub fn parse_timestamp(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::DateTime(ts) => Some(*ts),
        CellValue::Number(serial) => excel_serial_to_datetime(*serial),
        CellValue::Text(text) => parse_timestamp_text(text.trim()),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

fn parse_timestamp_text(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.naive_local());
    }
    if let Some(ts) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
    {
        return Some(ts);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Text form of an identifier cell; whole numbers lose their `.0`
fn cell_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s.clone(),
        CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        CellValue::Number(n) => n.to_string(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::DateTime(ts) => ts.format(display::FULL_TIME_FORMAT).to_string(),
    }
}
