//! Optional hole properties a host object model may or may not support.
//!
//! Host CAD APIs add and remove bolt-group properties between releases. A
//! caller describes what its host version can set with a
//! [`HoleCapabilities`] table and [`HoleCapabilities::apply`] pushes a
//! [`HoleSpec`] through whichever setters are present.

use crate::blueprint::Rotation;
use crate::seat::HoleSpec;

/// Layout version of [`HoleCapabilities`].
pub const HOLE_CAPABILITIES_VERSION: u32 = 1;

/// Setters a host bolt-group type `T` supports. `None` means the host
/// version has no such property and the value is skipped.
pub struct HoleCapabilities<T> {
    pub version: u32,
    pub set_standard: Option<fn(&mut T, &str)>,
    pub set_size: Option<fn(&mut T, f32)>,
    pub set_cut_length: Option<fn(&mut T, f32)>,
    pub set_slot_length: Option<fn(&mut T, f32)>,
    pub set_special_first_layer: Option<fn(&mut T, bool)>,
    pub set_rotation: Option<fn(&mut T, Rotation)>,
}

impl<T> Clone for HoleCapabilities<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for HoleCapabilities<T> {}

impl<T> Default for HoleCapabilities<T> {
    fn default() -> Self {
        Self {
            version: HOLE_CAPABILITIES_VERSION,
            set_standard: None,
            set_size: None,
            set_cut_length: None,
            set_slot_length: None,
            set_special_first_layer: None,
            set_rotation: None,
        }
    }
}

impl<T> HoleCapabilities<T> {
    /// An empty table at the current version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the properties this table cannot set.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("standard", self.set_standard.is_none()),
            ("size", self.set_size.is_none()),
            ("cut_length", self.set_cut_length.is_none()),
            ("slot_length", self.set_slot_length.is_none()),
            ("special_first_layer", self.set_special_first_layer.is_none()),
            ("rotation", self.set_rotation.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, missing)| missing.then_some(name))
        .collect()
    }

    /// Sets every supported property of `target` from `hole`; returns how
    /// many were set. Slot length is only pushed for slotted holes.
    pub fn apply(&self, target: &mut T, hole: &HoleSpec) -> usize {
        let mut applied = 0;

        if let Some(set) = self.set_standard {
            set(target, &hole.standard);
            applied += 1;
        }
        if let Some(set) = self.set_size {
            set(target, hole.size);
            applied += 1;
        }
        if let Some(set) = self.set_cut_length {
            set(target, hole.cut_length);
            applied += 1;
        }
        if hole.is_slot()
            && let Some(set) = self.set_slot_length
        {
            set(target, hole.slot_length);
            applied += 1;
        }
        if let Some(set) = self.set_special_first_layer {
            set(target, hole.special_first_layer);
            applied += 1;
        }
        if let Some(set) = self.set_rotation {
            set(target, hole.rotation);
            applied += 1;
        }

        applied
    }
}
