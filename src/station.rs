use serde::{Deserialize, Serialize};
use std::fmt;

/// Assembly-line station tracked by the slot board
///
/// The declaration order is the line order: it drives both the display order
/// of the dashboard and the primary sort key of the sequence. Deriving `Ord`
/// on the enum makes the rank the variant's position, so renaming a station
/// never changes its place in the line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Station {
    /// Painted body storage exit
    #[serde(rename = "PBS_Off")]
    PbsOff,

    /// Body assembly inbound buffer
    #[serde(rename = "BAIN")]
    BaIn,

    /// Body assembly outbound buffer
    #[serde(rename = "BAOFF")]
    BaOff,

    /// Final assembly infeed
    #[serde(rename = "AF-IN")]
    AfIn,
}

impl Station {
    /// Every station, in line order
    pub const ALL: [Station; 4] = [Station::PbsOff, Station::BaIn, Station::BaOff, Station::AfIn];

    /// Name of the station as it appears in the tracking spreadsheet
    pub fn name(self) -> &'static str {
        match self {
            Station::PbsOff => "PBS_Off",
            Station::BaIn => "BAIN",
            Station::BaOff => "BAOFF",
            Station::AfIn => "AF-IN",
        }
    }

    /// Number of slot positions the station displays
    ///
    /// # Examples
    /// ```
    /// use assembly_tracker::station::Station;
    ///
    /// assert_eq!(Station::BaIn.capacity(), 15);
    /// ```
    pub fn capacity(self) -> usize {
        match self {
            Station::PbsOff => 6,
            Station::BaIn => 15,
            Station::BaOff => 8,
            Station::AfIn => 9,
        }
    }

    /// Looks up a station by its exact spreadsheet name
    ///
    /// Matching is case- and whitespace-sensitive: `"bain"` or `" BAIN"` are
    /// not stations.
    pub fn from_name(name: &str) -> Option<Station> {
        Station::ALL.into_iter().find(|station| station.name() == name)
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
