//! Station redistribution along one side.

use serde::{Deserialize, Serialize};

/// Usable lengths at or below this (world units, mm) produce no stations.
pub const MIN_USABLE_LENGTH: f32 = 1.0;

/// Spacings below this (mm) are raised to it, bounding the station count.
pub const MIN_SPACING: f32 = 1.0;

/// Evenly redistributed stations over the usable part of a side.
///
/// The target spacing is only an upper bound: the usable length is divided
/// into `bays` equal bays so that stations land exactly on both ends.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct StationDistribution {
    /// Distance along the side of the first station.
    pub start: f32,
    /// Actual spacing between consecutive stations.
    pub pitch: f32,
    /// Number of bays; there are `bays + 1` stations.
    pub bays: usize,
}

impl StationDistribution {
    /// Distributes stations over `length − start_offset − end_offset`.
    ///
    /// Returns `None` when the usable length is at or below
    /// [`MIN_USABLE_LENGTH`]. A non-positive `spacing` gives a single bay;
    /// a positive one is never taken below [`MIN_SPACING`].
    pub fn new(length: f32, start_offset: f32, end_offset: f32, spacing: f32) -> Option<Self> {
        let usable = length - start_offset - end_offset;
        if !(usable > MIN_USABLE_LENGTH) {
            return None;
        }

        let bays = if spacing > 0.0 {
            ((usable / spacing.max(MIN_SPACING)).ceil() as usize).max(1)
        } else {
            1
        };

        Some(Self {
            start: start_offset,
            pitch: usable / bays as f32,
            bays,
        })
    }

    pub fn station_count(&self) -> usize {
        self.bays + 1
    }

    /// Distance along the side of station `i` (`0..=bays`).
    pub fn position(&self, i: usize) -> f32 {
        self.start + i as f32 * self.pitch
    }

    /// Distances along the side of every station, first to last.
    pub fn positions(&self) -> impl Iterator<Item = f32> + '_ {
        (0..=self.bays).map(|i| self.position(i))
    }

    /// Usable length covered from the first to the last station.
    pub fn usable_length(&self) -> f32 {
        self.pitch * self.bays as f32
    }
}
