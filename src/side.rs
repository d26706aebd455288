//! Path geometry: the picked polyline and the frame of each side.

use crate::blueprint::Rotation;
use crate::error::LayoutError;
use bevy_math::Dir3;
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Sides shorter than this (mm) are skipped.
pub const MIN_SIDE_LENGTH: f32 = 1.0;

/// A trailing pick within this distance (mm) of the first one closes the loop.
pub const CLOSING_TOLERANCE: f32 = 0.5;

/// The ordered pick points a railing runs along.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunPolyline {
    points: Vec<Vec3>,
    closed: bool,
}

impl RunPolyline {
    /// Builds a polyline from at least two picks.
    ///
    /// Picking back onto the first point is a common way to ask for a closed
    /// loop: a repeated trailing point is dropped and the polyline is marked
    /// closed, which adds the wrap-around side from the last point back to
    /// the first.
    pub fn new(points: &[Vec3]) -> Result<Self, LayoutError> {
        if points.len() < 2 {
            return Err(LayoutError::TooFewPoints {
                count: points.len(),
            });
        }

        let mut points = points.to_vec();
        let mut closed = false;
        if points.len() >= 3
            && let (Some(&first), Some(&last)) = (points.first(), points.last())
            && first.distance(last) <= CLOSING_TOLERANCE
        {
            points.pop();
            closed = points.len() >= 3;
        }

        Ok(Self { points, closed })
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Number of sides, including the wrap-around side of a closed loop.
    pub fn side_count(&self) -> usize {
        if self.closed {
            self.points.len()
        } else {
            self.points.len() - 1
        }
    }

    /// Start and end point of side `index`.
    pub fn side_endpoints(&self, index: usize) -> (Vec3, Vec3) {
        let n = self.points.len();
        (self.points[index % n], self.points[(index + 1) % n])
    }

    /// Whether the start of side `index` is an interior vertex (shared with
    /// the previous side).
    pub fn starts_at_corner(&self, index: usize) -> bool {
        self.closed || index > 0
    }

    /// Whether the end of side `index` is an interior vertex (shared with
    /// the next side).
    pub fn ends_at_corner(&self, index: usize) -> bool {
        self.closed || index + 1 < self.side_count()
    }
}

/// One straight segment of the path and its local frame.
///
/// `direction` follows the segment in 3D (slope included); `left` is the
/// horizontal left perpendicular, so a sloped side never tilts its posts.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Side {
    /// Index of this side along the polyline.
    pub index: usize,
    pub start: Vec3,
    pub end: Vec3,
    pub length: f32,
    /// Unit direction from `start` to `end`.
    pub direction: Vec3,
    /// Unit left vector in plan (Z = 0).
    pub left: Vec3,
}

impl Side {
    /// Returns `None` for sides shorter than [`MIN_SIDE_LENGTH`].
    pub fn new(index: usize, start: Vec3, end: Vec3) -> Option<Self> {
        let (direction, length) = Dir3::new_and_length(end - start).ok()?;
        if length < MIN_SIDE_LENGTH {
            return None;
        }

        let direction = direction.as_vec3();
        Some(Self {
            index,
            start,
            end,
            length,
            direction,
            left: left_of(direction),
        })
    }

    /// Point at distance `d` along the side, on the path line.
    pub fn point_at(&self, d: f32) -> Vec3 {
        self.start + self.direction * d
    }

    /// Moves `on_line` sideways by `lateral` along the left vector; Z is kept.
    pub fn offset(&self, on_line: Vec3, lateral: f32) -> Vec3 {
        on_line + self.left * lateral
    }

    /// Horizontal unit direction; falls back to +X for a vertical side.
    pub fn plan_direction(&self) -> Vec3 {
        plan_unit(self.direction)
    }

    /// Coarse self-rotation of posts on this side from the dominant plan axis.
    pub fn post_rotation(&self) -> Rotation {
        let d = self.direction;
        if d.x.abs() >= d.y.abs() {
            if d.x >= 0.0 { Rotation::Top } else { Rotation::Below }
        } else if d.y >= 0.0 {
            Rotation::Back
        } else {
            Rotation::Front
        }
    }
}

/// Horizontal left perpendicular of `direction`; +X when it has no plan part.
pub fn left_of(direction: Vec3) -> Vec3 {
    direction
        .truncate()
        .perp()
        .try_normalize()
        .map_or(Vec3::X, |v| v.extend(0.0))
}

/// Horizontal unit of `v`; +X when it has no plan part.
pub fn plan_unit(v: Vec3) -> Vec3 {
    v.truncate().try_normalize().map_or(Vec3::X, |v| v.extend(0.0))
}

/// Z of the plan cross product `a × b`; positive for a left (CCW) turn.
pub fn plan_cross(a: Vec3, b: Vec3) -> f32 {
    Vec2::perp_dot(a.truncate(), b.truncate())
}
