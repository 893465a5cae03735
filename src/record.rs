use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::schema::display;
use crate::station::Station;

/// One vehicle body seen at an acquisition point
///
/// Records come out of ingestion already cleaned: the station is known and
/// the timestamp parsed. They are never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Body identifier, kept as the text the spreadsheet showed
    pub body_id: String,

    /// Station where the body was acquired
    pub station: Station,

    /// Acquisition time (wall clock of the line, no timezone)
    pub acquired_at: NaiveDateTime,

    /// Production lot, kept as text
    pub lot_number: String,
}

impl Record {
    pub fn new(
        body_id: impl Into<String>,
        station: Station,
        acquired_at: NaiveDateTime,
        lot_number: impl Into<String>,
    ) -> Self {
        Record {
            body_id: body_id.into(),
            station,
            acquired_at,
            lot_number: lot_number.into(),
        }
    }

    /// Acquisition time as shown on a slot card (`dd/mm HH:MM:SS`)
    pub fn slot_time(&self) -> String {
        format_slot_time(Some(&self.acquired_at))
    }
}

/// Formats a slot timestamp, falling back to the "no time" placeholder
pub fn format_slot_time(acquired_at: Option<&NaiveDateTime>) -> String {
    match acquired_at {
        Some(ts) => ts.format(display::SLOT_TIME_FORMAT).to_string(),
        None => display::NO_TIME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn slot_time_is_day_first_without_year() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 7)
            .unwrap()
            .and_hms_opt(6, 5, 4)
            .unwrap();
        let record = Record::new("B-1", Station::BaIn, ts, "L7");
        assert_eq!(record.slot_time(), "07/03 06:05:04");
    }

    #[test]
    fn missing_time_uses_placeholder() {
        assert_eq!(format_slot_time(None), "S/ Tempo");
    }
}
