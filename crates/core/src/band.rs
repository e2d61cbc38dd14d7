use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the seven ordered CPU-utilisation bands, named after the notes of
/// the C major scale.
///
/// Each band owns a half-open interval `[min, max)` of the percentage range.
/// Together they partition `[0, 100)`; `B` additionally absorbs `100` itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum Band {
    #[default]
    C,
    D,
    E,
    F,
    G,
    A,
    B,
}

impl Band {
    /// All bands in canonical (ascending threshold) order.
    pub const ALL: [Band; 7] = [
        Band::C,
        Band::D,
        Band::E,
        Band::F,
        Band::G,
        Band::A,
        Band::B,
    ];

    /// Lower (inclusive) and upper (exclusive) percentage bounds.
    #[must_use]
    pub const fn interval(self) -> (f64, f64) {
        match self {
            Band::C => (0.0, 15.0),
            Band::D => (15.0, 30.0),
            Band::E => (30.0, 45.0),
            Band::F => (45.0, 60.0),
            Band::G => (60.0, 75.0),
            Band::A => (75.0, 90.0),
            Band::B => (90.0, 100.0),
        }
    }

    #[must_use]
    pub fn contains(self, percent: f64) -> bool {
        let (min, max) = self.interval();
        min <= percent && percent < max
    }

    /// Look up the band whose interval contains `percent`.
    ///
    /// Scans in canonical order and takes the first match; anything that
    /// falls through (100 and above) lands in `B`.
    #[must_use]
    pub fn from_percent(percent: f64) -> Band {
        Self::ALL
            .into_iter()
            .find(|band| band.contains(percent))
            .unwrap_or(Band::B)
    }

    /// Single-letter label, e.g. `"F"`.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Band::C => "C",
            Band::D => "D",
            Band::E => "E",
            Band::F => "F",
            Band::G => "G",
            Band::A => "A",
            Band::B => "B",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
