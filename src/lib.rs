/*!
# Assembly Line Slot Board

A browser dashboard that shows which vehicle bodies currently occupy the
buffer slots of an assembly line, built in Rust.

## Overview

Operators upload the tracking spreadsheet exported by the acquisition points.
Each row is a body seen at a station. The dashboard validates the file, keeps
the rows it can use, sequences them along the line and draws, per station, a
fixed grid of the most recent arrivals plus the queue of older bodies. The
full sequence can be downloaded back as a spreadsheet.

## Architecture

### Pipeline (always built)
- **loader**: Decodes uploaded bytes (xlsx/xlsm/xlsb/xls/ods, csv) into a raw table
- **ingest**: Checks the required columns, parses acquisition times, drops unusable rows
- **sequence**: Orders records by station, newest first
- **view**: Splits each station into visible slots and the overflow queue
- **downloader**: Writes the sequence back to xlsx or csv

### Web layer (`web` feature)
- **app**: Routes, multipart upload, error mapping
- **dashboard**: Handlebars rendering of the upload page and slot board
- **export_cache**: Keeps processed uploads so download links work without re-uploading

## Stations

| Station | Slots |
|---------|-------|
| PBS_Off | 6     |
| BAIN    | 15    |
| BAOFF   | 8     |
| AF-IN   | 9     |

## REST API Endpoints

- `GET /` - Upload page
- `POST /upload` - Process a file and render the dashboard
- `GET /export/{id}`, `GET /export/{id}/csv` - Download the sequence of a processed upload
- `POST /api/sequence` - Process a file, answer with JSON station views
- `POST /api/export` - Process a file, answer with the xlsx export
*/

pub mod config;
pub mod downloader;
pub mod error;
pub mod ingest;
pub mod loader;
pub mod pipeline;
pub mod record;
pub mod schema;
pub mod sequence;
pub mod station;
pub mod view;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod dashboard;
#[cfg(feature = "web")]
pub mod export_cache;

/// Re-export the pipeline entry points to make them easier to use
pub use error::{ExportError, IngestError, LoadError, ProcessError};
pub use pipeline::{ProcessedUpload, process_upload};
pub use record::Record;
pub use sequence::SequencedDataset;
pub use station::Station;
pub use view::StationView;
