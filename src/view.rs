use serde::Serialize;
use serde::ser::{SerializeStruct, Serializer};
use std::fmt::Write;

use crate::record::Record;
use crate::schema::display;
use crate::station::Station;

/// Colour of the queue metric next to the occupancy figure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueIndicator {
    /// Nothing waiting beyond the slots
    Neutral,
    /// Bodies are queued beyond the station's capacity
    Warning,
}

/// One display position of a station's slot grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot<'a> {
    Occupied(&'a Record),
    Empty,
}

/// A station's records split into visible slots and the waiting queue
///
/// `slots` holds the `capacity` most recent arrivals (fewer when the station
/// is not full); `overflow` holds everything older, still newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StationView<'a> {
    pub station: Station,
    pub capacity: usize,
    pub slots: &'a [Record],
    pub overflow: &'a [Record],
}

impl<'a> StationView<'a> {
    /// Splits a station's records, which must already be sorted newest first
    pub fn new(station: Station, records: &'a [Record]) -> Self {
        let capacity = station.capacity();
        let (slots, overflow) = records.split_at(records.len().min(capacity));
        StationView {
            station,
            capacity,
            slots,
            overflow,
        }
    }

    pub fn total(&self) -> usize {
        self.slots.len() + self.overflow.len()
    }

    pub fn occupied(&self) -> usize {
        self.slots.len()
    }

    pub fn queue_len(&self) -> usize {
        self.overflow.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// `occupied/capacity`, e.g. `6/15`
    pub fn occupancy_label(&self) -> String {
        format!("{}/{}", self.occupied(), self.capacity)
    }

    pub fn queue_label(&self) -> String {
        format!("Fila: {} carros", self.queue_len())
    }

    pub fn indicator(&self) -> QueueIndicator {
        if self.queue_len() == 0 {
            QueueIndicator::Neutral
        } else {
            QueueIndicator::Warning
        }
    }

    /// Exactly `capacity` positions: occupied ones first, then empty ones
    pub fn positions(&self) -> Vec<Slot<'a>> {
        (0..self.capacity)
            .map(|i| match self.slots.get(i) {
                Some(record) => Slot::Occupied(record),
                None => Slot::Empty,
            })
            .collect()
    }
}

impl Serialize for StationView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("StationView", 8)?;
        state.serialize_field("station", &self.station)?;
        state.serialize_field("capacity", &self.capacity)?;
        state.serialize_field("total", &self.total())?;
        state.serialize_field("occupied", &self.occupied())?;
        state.serialize_field("queue_len", &self.queue_len())?;
        state.serialize_field("indicator", &self.indicator())?;
        state.serialize_field("slots", self.slots)?;
        state.serialize_field("overflow", self.overflow)?;
        state.end()
    }
}

/// Plain-text rendering of the board, one block per station
pub fn render_text_board(views: &[StationView<'_>]) -> String {
    let mut out = String::new();
    for view in views {
        if view.is_empty() {
            let _ = writeln!(out, "Nenhum carro encontrado na estação: {}.", view.station);
            let _ = writeln!(out);
            continue;
        }

        let marker = match view.indicator() {
            QueueIndicator::Neutral => "",
            QueueIndicator::Warning => " (!)",
        };
        let _ = writeln!(
            out,
            "== {} ({} carros no total) | Ocupação {} | {}{}",
            view.station,
            view.total(),
            view.occupancy_label(),
            view.queue_label(),
            marker
        );
        for (i, slot) in view.positions().iter().enumerate() {
            match slot {
                Slot::Occupied(record) => {
                    let _ = writeln!(
                        out,
                        "  [{:>2}] {:<16} Lote: {:<12} Entrada: {}",
                        i + 1,
                        record.body_id,
                        record.lot_number,
                        record.slot_time()
                    );
                }
                Slot::Empty => {
                    let _ = writeln!(out, "  [{:>2}] {}", i + 1, display::EMPTY_SLOT);
                }
            }
        }
        if !view.overflow.is_empty() {
            let _ = writeln!(out, "  Fila de espera ({}):", view.queue_len());
            for record in view.overflow {
                let _ = writeln!(
                    out,
                    "    {:<16} {} {}",
                    record.body_id,
                    record.acquired_at.format(display::FULL_TIME_FORMAT),
                    record.lot_number
                );
            }
        }
        let _ = writeln!(out);
    }
    out
}
