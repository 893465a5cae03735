#![cfg(feature = "web")]
//! Server-side rendering of the upload page and the slot board.

use handlebars::{Handlebars, RenderError, TemplateError};
use serde::Serialize;

use crate::ingest::IngestReport;
use crate::schema::{columns, display};
use crate::view::{QueueIndicator, Slot, StationView};

const PAGE_TEMPLATE: &str = "page";

/// One slot card of a station grid
#[derive(Debug, Serialize)]
pub struct SlotCard {
    pub number: usize,
    pub occupied: bool,
    pub body_id: String,
    pub lot_number: String,
    pub time: String,
}

/// One row of the collapsed waiting-queue table
#[derive(Debug, Serialize)]
pub struct QueueRow {
    pub body_id: String,
    pub time: String,
    pub lot_number: String,
}

/// Everything the template needs to draw one station
#[derive(Debug, Serialize)]
pub struct StationCard {
    pub name: &'static str,
    pub capacity: usize,
    pub total: usize,
    pub empty: bool,
    pub occupancy: String,
    pub queue_label: String,
    pub queue_len: usize,
    pub warning: bool,
    pub slots: Vec<SlotCard>,
    pub queue: Vec<QueueRow>,
}

impl From<&StationView<'_>> for StationCard {
    fn from(view: &StationView<'_>) -> Self {
        let slots = view
            .positions()
            .into_iter()
            .enumerate()
            .map(|(i, slot)| match slot {
                Slot::Occupied(record) => SlotCard {
                    number: i + 1,
                    occupied: true,
                    body_id: record.body_id.clone(),
                    lot_number: record.lot_number.clone(),
                    time: record.slot_time(),
                },
                Slot::Empty => SlotCard {
                    number: i + 1,
                    occupied: false,
                    body_id: String::new(),
                    lot_number: String::new(),
                    time: String::new(),
                },
            })
            .collect();

        let queue = view
            .overflow
            .iter()
            .map(|record| QueueRow {
                body_id: record.body_id.clone(),
                time: record
                    .acquired_at
                    .format(display::FULL_TIME_FORMAT)
                    .to_string(),
                lot_number: record.lot_number.clone(),
            })
            .collect();

        StationCard {
            name: view.station.name(),
            capacity: view.capacity,
            total: view.total(),
            empty: view.is_empty(),
            occupancy: view.occupancy_label(),
            queue_label: view.queue_label(),
            queue_len: view.queue_len(),
            warning: view.indicator() == QueueIndicator::Warning,
            slots,
            queue,
        }
    }
}

/// Download links offered once an upload has been processed
#[derive(Debug, Serialize)]
pub struct ExportLinks {
    pub xlsx: String,
    pub csv: String,
}

impl ExportLinks {
    pub fn for_upload(id: impl std::fmt::Display) -> Self {
        ExportLinks {
            xlsx: format!("/export/{}", id),
            csv: format!("/export/{}/csv", id),
        }
    }
}

#[derive(Debug, Serialize, Default)]
struct PageContext {
    error: Option<String>,
    missing_column: bool,
    waiting: bool,
    processed: bool,
    notices: Vec<String>,
    export: Option<ExportLinks>,
    stations: Vec<StationCard>,
    expected_columns: Vec<&'static str>,
    empty_slot: &'static str,
}

/// Compiled page templates
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.register_template_string(PAGE_TEMPLATE, include_str!("./static/page.hbs"))?;
        Ok(Renderer { registry })
    }

    /// The bare upload form, waiting for a file
    pub fn upload_page(&self) -> Result<String, RenderError> {
        self.render(PageContext {
            waiting: true,
            ..Self::base_context()
        })
    }

    /// The upload form with an error notice and no dashboard
    ///
    /// The expected headers are listed only when `missing_column` is set;
    /// any other failure is reported as unexpected.
    pub fn error_page(&self, message: &str, missing_column: bool) -> Result<String, RenderError> {
        self.render(PageContext {
            error: Some(message.to_string()),
            missing_column,
            ..Self::base_context()
        })
    }

    /// The full slot board for a processed upload
    ///
    /// # Arguments
    /// * `report` - Drop counts from ingestion, shown as notices when non-zero
    /// * `views` - One view per station, in line order
    /// * `export` - Download links for the processed sequence
    pub fn dashboard(
        &self,
        report: &IngestReport,
        views: &[StationView<'_>],
        export: ExportLinks,
    ) -> Result<String, RenderError> {
        self.render(PageContext {
            processed: true,
            notices: drop_notices(report),
            export: Some(export),
            stations: views.iter().map(StationCard::from).collect(),
            ..Self::base_context()
        })
    }

    fn base_context() -> PageContext {
        PageContext {
            expected_columns: columns::ALL.to_vec(),
            empty_slot: display::EMPTY_SLOT,
            ..PageContext::default()
        }
    }

    fn render(&self, context: PageContext) -> Result<String, RenderError> {
        self.registry.render(PAGE_TEMPLATE, &context)
    }
}

fn drop_notices(report: &IngestReport) -> Vec<String> {
    let mut notices = Vec::new();
    if report.dropped_bad_timestamp > 0 {
        notices.push(format!(
            "{} linha(s) ignorada(s): '{}' vazio ou inválido.",
            report.dropped_bad_timestamp,
            columns::ACQUIRED_AT
        ));
    }
    if report.dropped_unknown_station > 0 {
        notices.push(format!(
            "{} linha(s) ignorada(s): estação fora da linha.",
            report.dropped_unknown_station
        ));
    }
    notices
}
