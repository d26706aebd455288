//! Lateral offset of the post line from the picked reference path.

use crate::error::SettingsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which edge of the post the picked path describes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LineRef {
    /// Posts sit to the left of the path (walking direction, seen from above).
    Left,
    /// Posts sit to the right of the path.
    Right,
    /// The path runs through the post centres.
    #[default]
    Middle,
}

impl LineRef {
    /// `+1` for LEFT, `-1` for RIGHT, `0` for MIDDLE.
    pub fn sign(self) -> f32 {
        match self {
            Self::Left => 1.0,
            Self::Right => -1.0,
            Self::Middle => 0.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Left => "LEFT",
            Self::Right => "RIGHT",
            Self::Middle => "MIDDLE",
        }
    }
}

impl FromStr for LineRef {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "LEFT" => Ok(Self::Left),
            "RIGHT" => Ok(Self::Right),
            "MIDDLE" => Ok(Self::Middle),
            _ => Err(SettingsError::InvalidLineRef { raw: s.to_owned() }),
        }
    }
}

impl fmt::Display for LineRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Signed perpendicular offset of the post centreline from the path.
///
/// Positive values move towards the side's left vector. With a deck edge
/// distance the offset is `deck_edge + half_post_width` on the referenced
/// side, and MIDDLE is read as LEFT (a deck edge always has a side). Without
/// one the path is taken as a post face, so the centre sits half a post
/// width away (zero for MIDDLE). Units are whatever the inputs use.
pub fn lateral_offset(line_ref: LineRef, deck_edge: f32, half_post_width: f32) -> f32 {
    if deck_edge.abs() > 1e-4 {
        let sign = match line_ref {
            LineRef::Middle => 1.0,
            other => other.sign(),
        };
        return sign * (deck_edge + half_post_width);
    }

    line_ref.sign() * half_post_width
}
