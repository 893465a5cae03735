use serde::Serialize;

use crate::record::Record;
use crate::station::Station;
use crate::view::StationView;

/// All kept records in line sequence
///
/// Ordered by station rank, then newest acquisition first. The sort is
/// stable: records with the same station and time keep their upload order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SequencedDataset {
    records: Vec<Record>,
}

impl SequencedDataset {
    /// Sequences a set of cleaned records
    pub fn from_records(mut records: Vec<Record>) -> Self {
        sort_records(&mut records);
        SequencedDataset { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The contiguous run of records belonging to `station`, newest first
    pub fn for_station(&self, station: Station) -> &[Record] {
        let start = self.records.partition_point(|r| r.station < station);
        let end = self.records.partition_point(|r| r.station <= station);
        &self.records[start..end]
    }

    /// One view per station, in line order, including empty stations
    pub fn station_views(&self) -> Vec<StationView<'_>> {
        Station::ALL
            .into_iter()
            .map(|station| StationView::new(station, self.for_station(station)))
            .collect()
    }
}

/// Sorts records by (station rank ascending, acquisition time descending)
pub fn sort_records(records: &mut [Record]) {
    records.sort_by(|a, b| {
        a.station
            .cmp(&b.station)
            .then_with(|| b.acquired_at.cmp(&a.acquired_at))
    });
}
