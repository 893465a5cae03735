use log::info;

use crate::error::ProcessError;
use crate::ingest::{IngestReport, ingest};
use crate::loader::load_table;
use crate::sequence::SequencedDataset;

/// The outcome of processing one upload
#[derive(Debug, Clone, Default)]
pub struct ProcessedUpload {
    pub report: IngestReport,
    pub dataset: SequencedDataset,
}

/// Run an uploaded file through load, validation, cleaning and sequencing
///
/// Either the whole pass succeeds or nothing is produced; there is no
/// partial result when a required column is missing.
///
/// # Arguments
/// * `file_name` - Name the file was uploaded with, used to pick the decoder
/// * `bytes` - File content
///
/// # Returns
/// * `Result<ProcessedUpload, ProcessError>` - Drop counts and the sequence
pub fn process_upload(file_name: &str, bytes: &[u8]) -> Result<ProcessedUpload, ProcessError> {
    let table = load_table(file_name, bytes)?;
    let cleaned = ingest(&table)?;
    let dataset = SequencedDataset::from_records(cleaned.records);
    info!(
        "Processed '{}': {} record(s) in sequence",
        file_name,
        dataset.len()
    );
    Ok(ProcessedUpload {
        report: cleaned.report,
        dataset,
    })
}
