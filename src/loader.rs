use calamine::{Data, Reader, open_workbook_auto_from_rs};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use log::debug;
use std::io::Cursor;
use std::path::Path;

use crate::error::LoadError;

/// A single decoded cell, before any column-specific coercion
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    /// A cell the workbook itself stores as a date/time
    DateTime(NaiveDateTime),
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

/// Header row plus data rows of the first worksheet
///
/// Every data row has exactly `headers.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RawTable {
    /// Builds a table, padding or truncating rows to the header width
    pub fn new(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Empty);
                row
            })
            .collect();
        RawTable { headers, rows }
    }

    /// Index of the first column whose header is exactly `name`
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Load a table from an uploaded CSV file
///
/// The delimiter is `;` when the header line contains semicolons but no
/// commas (the usual export of a spreadsheet set to a comma-decimal locale),
/// `,` otherwise. A leading UTF-8 byte-order mark is ignored.
///
/// # Arguments
/// * `bytes` - Raw content of the CSV file
///
/// # Returns
/// * `Result<RawTable, LoadError>` - The header row and data rows, or an error
pub fn from_csv(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let header_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let delimiter = if header_line.contains(&b';') && !header_line.contains(&b',') {
        b';'
    } else {
        b','
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(bytes);

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_string())
        .collect();
    if headers.iter().all(|h| h.is_empty()) {
        return Err(LoadError::EmptySheet);
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(
            record
                .iter()
                .map(|field| {
                    if field.trim().is_empty() {
                        CellValue::Empty
                    } else {
                        CellValue::Text(field.to_string())
                    }
                })
                .collect(),
        );
    }

    Ok(RawTable::new(headers, rows))
}

/// Load a table from an uploaded workbook (xlsx, xlsm, xlsb, xls or ods)
///
/// Only the first worksheet is read. Its first row is taken as the header.
///
/// # Arguments
/// * `bytes` - Raw content of the workbook
///
/// # Returns
/// * `Result<RawTable, LoadError>` - The header row and data rows, or an error
pub fn from_excel(bytes: &[u8]) -> Result<RawTable, LoadError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))?;

    let range = workbook
        .worksheet_range_at(0)
        .ok_or(LoadError::NoWorksheet)??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row.iter().map(header_text).collect(),
        None => return Err(LoadError::EmptySheet),
    };

    let rows: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(cell_from_data).collect())
        .collect();

    debug!(
        "Read worksheet with {} columns and {} data rows",
        headers.len(),
        rows.len()
    );
    Ok(RawTable::new(headers, rows))
}

/// Detect file type from the upload name and load the appropriate format
///
/// # Arguments
/// * `file_name` - Name the file was uploaded with; only its extension is used
/// * `bytes` - Raw file content
///
/// # Returns
/// * `Result<RawTable, LoadError>` - The decoded table or an error
///
/// # Examples
/// ```
/// use assembly_tracker::loader::load_table;
///
/// let csv = "Body number,Estação de aquisição,Tempo de aquisição,Número Lote\n\
///            B1,BAIN,2024-05-01 08:00:00,L1\n";
/// let table = load_table("line.csv", csv.as_bytes()).unwrap();
/// assert_eq!(table.rows.len(), 1);
/// ```
pub fn load_table(file_name: &str, bytes: &[u8]) -> Result<RawTable, LoadError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase());

    match extension.as_deref() {
        Some("csv") => from_csv(bytes),
        Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("xls") | Some("ods") => {
            from_excel(bytes)
        }
        Some(ext) => Err(LoadError::UnsupportedFormat(ext.to_string())),
        None => Err(LoadError::MissingExtension),
    }
}

/// Converts an Excel serial date (1900 date system) to a timestamp
///
/// The fractional part is the time of day; it is rounded to the millisecond
/// so values written by a spreadsheet library read back unchanged.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    if !serial.is_finite() || serial < 0.0 || serial > 2_958_465.0 {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let millis = (serial * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(Duration::milliseconds(millis))
}

fn header_text(cell: &Data) -> String {
    match cell_from_data(cell) {
        CellValue::Empty => String::new(),
        CellValue::Text(s) => s,
        CellValue::Number(n) => n.to_string(),
        CellValue::Bool(b) => b.to_string(),
        CellValue::DateTime(ts) => ts.to_string(),
    }
}

fn cell_from_data(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) if s.trim().is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(ts) if !dt.is_duration() => CellValue::DateTime(ts),
            _ => CellValue::Number(dt.as_f64()),
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(format!("#{:?}", e)),
    }
}
