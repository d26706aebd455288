//! Railing settings: the raw string bundle a dialog or INI file holds, and
//! the typed configuration the engine runs on.
//!
//! [`RailingSettings`] keeps every value as the text the user typed. A blank
//! instance value means "use the default"; [`RailingSettings::merged_over`]
//! fills those in and [`RailingSettings::resolve`] validates the result into
//! a [`RailingConfig`]. [`RailingConfig::to_settings`] goes back the other
//! way with every distance re-formatted in canonical form.

use crate::blueprint::PartSpec;
use crate::distance::{DEFAULT_DENOMINATOR, format_inches, parse_inches};
use crate::error::SettingsError;
use crate::offset::LineRef;
use serde::{Deserialize, Serialize};

/// Smallest post spacing accepted from settings (1/16 inch).
pub const MIN_SPACING_IN: f64 = 1.0 / 16.0;

/// Raw, user-editable settings. Field names serialize to the persisted keys.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct RailingSettings {
    pub spacing_in: String,
    pub post_height_in: String,
    pub start_offset_in: String,
    pub end_offset_in: String,
    pub base_offset_in: String,
    pub line_ref: String,
    pub deck_edge_in: String,

    pub post_profile: String,
    pub post_material: String,
    pub post_class: String,
    pub post_name: String,

    #[serde(alias = "ConnEnabled")]
    pub create_connection: String,
    #[serde(alias = "ConnName")]
    pub connection_name: String,
    #[serde(alias = "ConnAttr")]
    pub connection_attr: String,

    pub rail_enabled: String,
    pub rail_start_offset_in: String,
    pub rail_end_offset_in: String,
    pub rail_from_top_in: String,
    pub rail_count: String,
    pub rail_spacing_in: String,

    pub seat_hole_line_from_bend_in: String,
    #[serde(rename = "SeatSlotC2CIn")]
    pub seat_slot_c2c_in: String,
    pub seat_slot_size_in: String,
    pub seat_slot_standard: String,
    pub seat_slot_cut_length_in: String,
    pub seat_slot_special1: String,
    #[serde(rename = "SeatPilotC2CIn")]
    pub seat_pilot_c2c_in: String,
    pub seat_pilot_dia_in: String,
    pub seat_pilot_standard: String,
    pub seat_pilot_cut_length_in: String,
}

fn pick(instance: &str, default: &str) -> String {
    if instance.trim().is_empty() {
        default.to_owned()
    } else {
        instance.to_owned()
    }
}

impl RailingSettings {
    /// Instance values over `defaults`: any blank instance value is replaced
    /// by the default's value for the same key.
    pub fn merged_over(&self, defaults: &RailingSettings) -> RailingSettings {
        RailingSettings {
            spacing_in: pick(&self.spacing_in, &defaults.spacing_in),
            post_height_in: pick(&self.post_height_in, &defaults.post_height_in),
            start_offset_in: pick(&self.start_offset_in, &defaults.start_offset_in),
            end_offset_in: pick(&self.end_offset_in, &defaults.end_offset_in),
            base_offset_in: pick(&self.base_offset_in, &defaults.base_offset_in),
            line_ref: pick(&self.line_ref, &defaults.line_ref),
            deck_edge_in: pick(&self.deck_edge_in, &defaults.deck_edge_in),
            post_profile: pick(&self.post_profile, &defaults.post_profile),
            post_material: pick(&self.post_material, &defaults.post_material),
            post_class: pick(&self.post_class, &defaults.post_class),
            post_name: pick(&self.post_name, &defaults.post_name),
            create_connection: pick(&self.create_connection, &defaults.create_connection),
            connection_name: pick(&self.connection_name, &defaults.connection_name),
            connection_attr: pick(&self.connection_attr, &defaults.connection_attr),
            rail_enabled: pick(&self.rail_enabled, &defaults.rail_enabled),
            rail_start_offset_in: pick(&self.rail_start_offset_in, &defaults.rail_start_offset_in),
            rail_end_offset_in: pick(&self.rail_end_offset_in, &defaults.rail_end_offset_in),
            rail_from_top_in: pick(&self.rail_from_top_in, &defaults.rail_from_top_in),
            rail_count: pick(&self.rail_count, &defaults.rail_count),
            rail_spacing_in: pick(&self.rail_spacing_in, &defaults.rail_spacing_in),
            seat_hole_line_from_bend_in: pick(
                &self.seat_hole_line_from_bend_in,
                &defaults.seat_hole_line_from_bend_in,
            ),
            seat_slot_c2c_in: pick(&self.seat_slot_c2c_in, &defaults.seat_slot_c2c_in),
            seat_slot_size_in: pick(&self.seat_slot_size_in, &defaults.seat_slot_size_in),
            seat_slot_standard: pick(&self.seat_slot_standard, &defaults.seat_slot_standard),
            seat_slot_cut_length_in: pick(
                &self.seat_slot_cut_length_in,
                &defaults.seat_slot_cut_length_in,
            ),
            seat_slot_special1: pick(&self.seat_slot_special1, &defaults.seat_slot_special1),
            seat_pilot_c2c_in: pick(&self.seat_pilot_c2c_in, &defaults.seat_pilot_c2c_in),
            seat_pilot_dia_in: pick(&self.seat_pilot_dia_in, &defaults.seat_pilot_dia_in),
            seat_pilot_standard: pick(&self.seat_pilot_standard, &defaults.seat_pilot_standard),
            seat_pilot_cut_length_in: pick(
                &self.seat_pilot_cut_length_in,
                &defaults.seat_pilot_cut_length_in,
            ),
        }
    }

    /// Validates every value and parses it into a [`RailingConfig`].
    ///
    /// Lengths that only make sense as positive (spacing, heights, seat
    /// dimensions) reject zero and negatives; offsets may be negative. The
    /// connection name is only required when connections are enabled.
    pub fn resolve(&self) -> Result<RailingConfig, SettingsError> {
        let create_connection = flag("CreateConnection", &self.create_connection)?;
        let connection_name = self.connection_name.trim().to_owned();
        if create_connection && connection_name.is_empty() {
            return Err(SettingsError::BlankValue {
                key: "ConnectionName",
            });
        }

        let spacing_in = distance("SpacingIn", &self.spacing_in, false)?;
        if spacing_in < MIN_SPACING_IN {
            return Err(SettingsError::BelowMinimum {
                key: "SpacingIn",
                min: "1/16\"",
            });
        }

        Ok(RailingConfig {
            spacing_in,
            post_height_in: distance("PostHeightIn", &self.post_height_in, false)?,
            start_offset_in: distance("StartOffsetIn", &self.start_offset_in, true)?,
            end_offset_in: distance("EndOffsetIn", &self.end_offset_in, true)?,
            base_offset_in: distance("BaseOffsetIn", &self.base_offset_in, true)?,
            line_ref: self.line_ref.parse()?,
            deck_edge_in: distance("DeckEdgeIn", &self.deck_edge_in, true)?,
            post: PartSpec {
                profile: required("PostProfile", &self.post_profile)?,
                material: required("PostMaterial", &self.post_material)?,
                class: required("PostClass", &self.post_class)?,
                name: required("PostName", &self.post_name)?,
            },
            create_connection,
            connection_name,
            connection_attr: self.connection_attr.trim().to_owned(),
            rails: RailConfig {
                enabled: flag("RailEnabled", &self.rail_enabled)?,
                start_offset_in: distance("RailStartOffsetIn", &self.rail_start_offset_in, true)?,
                end_offset_in: distance("RailEndOffsetIn", &self.rail_end_offset_in, true)?,
                from_top_in: distance("RailFromTopIn", &self.rail_from_top_in, false)?,
                count: count("RailCount", &self.rail_count)?,
                spacing_in: distance("RailSpacingIn", &self.rail_spacing_in, false)?,
            },
            seats: SeatConfig {
                hole_line_in: distance(
                    "SeatHoleLineFromBendIn",
                    &self.seat_hole_line_from_bend_in,
                    false,
                )?,
                slot_c2c_in: distance("SeatSlotC2CIn", &self.seat_slot_c2c_in, false)?,
                slot_size_in: distance("SeatSlotSizeIn", &self.seat_slot_size_in, false)?,
                slot_standard: required("SeatSlotStandard", &self.seat_slot_standard)?,
                slot_cut_length_in: distance(
                    "SeatSlotCutLengthIn",
                    &self.seat_slot_cut_length_in,
                    false,
                )?,
                slot_special_first_layer: flag("SeatSlotSpecial1", &self.seat_slot_special1)?,
                pilot_c2c_in: distance("SeatPilotC2CIn", &self.seat_pilot_c2c_in, false)?,
                pilot_diameter_in: distance("SeatPilotDiaIn", &self.seat_pilot_dia_in, false)?,
                pilot_standard: required("SeatPilotStandard", &self.seat_pilot_standard)?,
                pilot_cut_length_in: distance(
                    "SeatPilotCutLengthIn",
                    &self.seat_pilot_cut_length_in,
                    false,
                )?,
            },
        })
    }
}

fn distance(key: &'static str, raw: &str, allow_negative: bool) -> Result<f64, SettingsError> {
    if raw.trim().is_empty() {
        return Err(SettingsError::BlankValue { key });
    }
    parse_inches(raw, allow_negative).map_err(|source| SettingsError::Distance { key, source })
}

fn required(key: &'static str, raw: &str) -> Result<String, SettingsError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(SettingsError::BlankValue { key });
    }
    Ok(value.to_owned())
}

fn flag(key: &'static str, raw: &str) -> Result<bool, SettingsError> {
    match raw.trim().to_uppercase().as_str() {
        "1" | "TRUE" | "YES" | "ON" => Ok(true),
        "0" | "FALSE" | "NO" | "OFF" => Ok(false),
        "" => Err(SettingsError::BlankValue { key }),
        _ => Err(SettingsError::InvalidFlag {
            key,
            raw: raw.to_owned(),
        }),
    }
}

/// Integer count; negative counts clamp to zero.
fn count(key: &'static str, raw: &str) -> Result<usize, SettingsError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(SettingsError::BlankValue { key });
    }
    let n: i64 = value.parse().map_err(|_| SettingsError::InvalidCount {
        key,
        raw: raw.to_owned(),
    })?;
    Ok(n.max(0) as usize)
}

fn flag_text(value: bool) -> String {
    if value { "1" } else { "0" }.to_owned()
}

/// Typed layout configuration. Lengths are inches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RailingConfig {
    /// Target (maximum) post spacing.
    pub spacing_in: f64,
    pub post_height_in: f64,
    /// Gap before the first station of each side.
    pub start_offset_in: f64,
    /// Gap after the last station of each side.
    pub end_offset_in: f64,
    /// Vertical offset of post bases from the host top (or the path).
    pub base_offset_in: f64,
    pub line_ref: LineRef,
    /// Distance from the path to the deck edge; zero treats the path as a
    /// post face.
    pub deck_edge_in: f64,
    pub post: PartSpec,

    pub create_connection: bool,
    pub connection_name: String,
    /// Attribute file for the connection; blank means none.
    pub connection_attr: String,

    pub rails: RailConfig,
    pub seats: SeatConfig,
}

/// Horizontal rail rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RailConfig {
    pub enabled: bool,
    /// Extension past the first station (negative shortens).
    pub start_offset_in: f64,
    /// Extension past the last station (negative shortens).
    pub end_offset_in: f64,
    /// Drop of the first row's centreline below the post tops.
    pub from_top_in: f64,
    pub count: usize,
    /// Vertical pitch between rows.
    pub spacing_in: f64,
}

/// Seat angle hole pattern.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeatConfig {
    /// Hole line measured from the angle's bend.
    pub hole_line_in: f64,
    /// Slot length (centre to centre of the slot ends).
    pub slot_c2c_in: f64,
    pub slot_size_in: f64,
    pub slot_standard: String,
    pub slot_cut_length_in: f64,
    pub slot_special_first_layer: bool,
    /// Spacing of the two pilot holes in the post.
    pub pilot_c2c_in: f64,
    pub pilot_diameter_in: f64,
    pub pilot_standard: String,
    pub pilot_cut_length_in: f64,
}

impl Default for RailingConfig {
    fn default() -> Self {
        Self {
            spacing_in: 48.0,
            post_height_in: 42.0,
            start_offset_in: 0.0,
            end_offset_in: 0.0,
            base_offset_in: 0.0,
            line_ref: LineRef::Middle,
            deck_edge_in: 0.0,
            post: PartSpec::new("HSS2X2X1/8", "A500", "2", "POST"),
            create_connection: false,
            connection_name: String::new(),
            connection_attr: String::new(),
            rails: RailConfig {
                enabled: true,
                start_offset_in: 0.0,
                end_offset_in: 0.0,
                from_top_in: 0.75,
                count: 2,
                spacing_in: 18.0,
            },
            seats: SeatConfig {
                hole_line_in: 0.75,
                slot_c2c_in: 0.5,
                slot_size_in: 0.3125,
                slot_standard: "CARRIAGE".to_owned(),
                slot_cut_length_in: 1.0,
                slot_special_first_layer: false,
                pilot_c2c_in: 1.0,
                pilot_diameter_in: 0.125,
                pilot_standard: "TEK-3".to_owned(),
                pilot_cut_length_in: 1.0,
            },
        }
    }
}

impl RailingConfig {
    /// Effective values as persisted settings, distances at 1/16 inch.
    pub fn to_settings(&self) -> RailingSettings {
        let d = |inches: f64| format_inches(inches, DEFAULT_DENOMINATOR);
        RailingSettings {
            spacing_in: d(self.spacing_in),
            post_height_in: d(self.post_height_in),
            start_offset_in: d(self.start_offset_in),
            end_offset_in: d(self.end_offset_in),
            base_offset_in: d(self.base_offset_in),
            line_ref: self.line_ref.as_str().to_owned(),
            deck_edge_in: d(self.deck_edge_in),
            post_profile: self.post.profile.clone(),
            post_material: self.post.material.clone(),
            post_class: self.post.class.clone(),
            post_name: self.post.name.clone(),
            create_connection: flag_text(self.create_connection),
            connection_name: self.connection_name.clone(),
            connection_attr: self.connection_attr.clone(),
            rail_enabled: flag_text(self.rails.enabled),
            rail_start_offset_in: d(self.rails.start_offset_in),
            rail_end_offset_in: d(self.rails.end_offset_in),
            rail_from_top_in: d(self.rails.from_top_in),
            rail_count: self.rails.count.to_string(),
            rail_spacing_in: d(self.rails.spacing_in),
            seat_hole_line_from_bend_in: d(self.seats.hole_line_in),
            seat_slot_c2c_in: d(self.seats.slot_c2c_in),
            seat_slot_size_in: d(self.seats.slot_size_in),
            seat_slot_standard: self.seats.slot_standard.clone(),
            seat_slot_cut_length_in: d(self.seats.slot_cut_length_in),
            seat_slot_special1: flag_text(self.seats.slot_special_first_layer),
            seat_pilot_c2c_in: d(self.seats.pilot_c2c_in),
            seat_pilot_dia_in: d(self.seats.pilot_diameter_in),
            seat_pilot_standard: self.seats.pilot_standard.clone(),
            seat_pilot_cut_length_in: d(self.seats.pilot_cut_length_in),
        }
    }
}
