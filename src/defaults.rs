//! Fixed fabrication choices that are not user settings.

use crate::blueprint::PartSpec;
use serde::{Deserialize, Serialize};

/// Shop standards the layout uses for every run.
///
/// Dimensions are in inches. The engine takes one of these at construction
/// and never mutates it; swap the whole struct to change shop standards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FabricationDefaults {
    /// Rail tube.
    pub rail: PartSpec,
    /// Plate closing rail ends.
    pub rail_cap: PartSpec,
    /// Plate on post tops.
    pub post_cap: PartSpec,
    /// Seat angle under rails.
    pub seat: PartSpec,

    /// Rail tube width when its profile has no readable dimension.
    pub rail_width_fallback_in: f64,
    /// Rails longer than this are split into equal pieces.
    pub max_rail_piece_in: f64,
    pub cap_thickness_in: f64,
    pub seat_length_in: f64,
    pub seat_leg_thickness_in: f64,
    /// Extra push of an inside-corner seat along the bisector.
    pub inside_corner_inset_in: f64,
}

impl Default for FabricationDefaults {
    fn default() -> Self {
        Self {
            rail: PartSpec::new("TS1-1/2X1-1/2X.188", "A53", "1", "RAIL"),
            rail_cap: PartSpec::new("PL3.175", "A36", "4", "RAIL CAP"),
            post_cap: PartSpec::new("PL3.175", "A36", "4", "POST CAP"),
            seat: PartSpec::new("L1-1/2X1-1/2X1/8", "A1011-GR.50", "6", "RAIL POST ANGLE"),
            rail_width_fallback_in: 1.5,
            max_rail_piece_in: 240.0,
            cap_thickness_in: 0.125,
            seat_length_in: 1.5,
            seat_leg_thickness_in: 0.125,
            // 3/8" clearance less the 1/4" the angle heel already sits back.
            inside_corner_inset_in: 0.375 - 0.25,
        }
    }
}
