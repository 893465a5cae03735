use chrono::NaiveDateTime;
use rust_xlsxwriter::{Format, Workbook};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ExportError;
use crate::schema::{columns, display, export};
use crate::sequence::SequencedDataset;

/// File formats the sequence can be downloaded in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            ExportFormat::Xlsx => export::XLSX_MIME,
            ExportFormat::Csv => export::CSV_MIME,
        }
    }
}

/// A generated download: its suggested name, MIME type and content
#[derive(Debug, Clone)]
pub struct ExportArtifact {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// Generate a fresh export of the full sequence
///
/// # Arguments
/// * `dataset` - The sequenced records; every record is written, in order
/// * `format` - Target file format
/// * `generated_at` - Generation time, used for the file name suffix
///
/// # Returns
/// * `Result<ExportArtifact, ExportError>` - The file to offer for download
pub fn export_sequence(
    dataset: &SequencedDataset,
    format: ExportFormat,
    generated_at: NaiveDateTime,
) -> Result<ExportArtifact, ExportError> {
    let bytes = match format {
        ExportFormat::Xlsx => to_xlsx(dataset)?,
        ExportFormat::Csv => to_csv(dataset)?,
    };
    Ok(ExportArtifact {
        file_name: export_file_name(generated_at, format),
        mime: format.mime(),
        bytes,
    })
}

/// Generate an export and write it to disk
///
/// When `target` is an existing directory the file is created inside it under
/// the generated name; otherwise `target` is used as the file path.
///
/// # Returns
/// * `Result<PathBuf, ExportError>` - Where the file was written
pub fn write_export(
    dataset: &SequencedDataset,
    format: ExportFormat,
    target: &Path,
    generated_at: NaiveDateTime,
) -> Result<PathBuf, ExportError> {
    let artifact = export_sequence(dataset, format, generated_at)?;
    let path = if target.is_dir() {
        target.join(&artifact.file_name)
    } else {
        target.to_path_buf()
    };
    fs::write(&path, &artifact.bytes)?;
    Ok(path)
}

/// `Sequencia_Montagem_<YYYYMMDD_HHMM>.<ext>`
pub fn export_file_name(generated_at: NaiveDateTime, format: ExportFormat) -> String {
    format!(
        "{}{}.{}",
        export::FILE_PREFIX,
        generated_at.format(export::STAMP_FORMAT),
        format.extension()
    )
}

/// Convert the sequence to XLSX format
///
/// One sheet, header row first, then one row per record in sequence order.
/// Acquisition times are written as real spreadsheet datetimes.
///
/// # Arguments
/// * `dataset` - The sequenced records to write
///
/// # Returns
/// * `Result<Vec<u8>, ExportError>` - XLSX file content as bytes or an error
pub fn to_xlsx(dataset: &SequencedDataset) -> Result<Vec<u8>, ExportError> {
    let header_format = Format::new().set_bold();
    let datetime_format = Format::new().set_num_format(export::DATETIME_NUM_FORMAT);

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(export::SHEET_NAME)?;

    for (col, name) in columns::ALL.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *name, &header_format)?;
    }
    worksheet.set_column_width(0, 18)?;
    worksheet.set_column_width(1, 20)?;
    worksheet.set_column_width(2, 20)?;
    worksheet.set_column_width(3, 14)?;

    for (idx, record) in dataset.records().iter().enumerate() {
        let row = (idx + 1) as u32;
        worksheet.write_string(row, 0, &record.body_id)?;
        worksheet.write_string(row, 1, record.station.name())?;
        worksheet.write_datetime_with_format(row, 2, &record.acquired_at, &datetime_format)?;
        worksheet.write_string(row, 3, &record.lot_number)?;
    }

    let buffer = workbook.save_to_buffer()?;
    Ok(buffer)
}

/// Convert the sequence to CSV format
///
/// Same columns and order as the XLSX export; times are written as
/// `YYYY-MM-DD HH:MM:SS`.
pub fn to_csv(dataset: &SequencedDataset) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(columns::ALL)?;

    for record in dataset.records() {
        let acquired_at = record
            .acquired_at
            .format(display::FULL_TIME_FORMAT)
            .to_string();
        writer.write_record([
            record.body_id.as_str(),
            record.station.name(),
            acquired_at.as_str(),
            record.lot_number.as_str(),
        ])?;
    }

    writer.into_inner().map_err(|e| ExportError::Io(e.into_error()))
}
