//! Corner-aware rail joining.
//!
//! Every rail row runs one straight rail per side. Where two consecutive
//! sides share a vertex, one rail of the pair is cut to a face plane of the
//! other ("butted") and the other keeps its end cap. All decisions for a row
//! are taken against the untrimmed rails, so the result does not depend on
//! the order corners are visited in.

use crate::side::{plan_cross, plan_unit};
use bevy_math::primitives::InfinitePlane3d;
use bevy_math::{Dir3, Ray3d};
use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

/// Rails (and butt fits) shorter than this (mm) are not built.
pub const MIN_RAIL_LENGTH: f32 = 1.0;

/// Corners turning less than this (sine of the plan angle) are treated as
/// straight and fall back to a plain joint.
pub const MIN_CORNER_TURN: f32 = 0.02;

const PARALLEL_TOLERANCE: f32 = 1e-4;

/// Which end of a rail.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RailEnd {
    Start,
    End,
}

/// A plane a butted rail end is cut to: one face of the adjoining rail.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FacePlane {
    /// A point on the plane.
    pub anchor: Vec3,
    /// Unit normal (horizontal).
    pub normal: Vec3,
}

impl FacePlane {
    pub fn signed_distance(&self, point: Vec3) -> f32 {
        (point - self.anchor).dot(self.normal)
    }
}

/// How a rail end is finished.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum EndFinish {
    /// Closed with a cap plate.
    Cap,
    /// Cut to the given face of the adjoining rail.
    Butt(FacePlane),
    /// Left open (the other rail of a straight joint carries the cap).
    Plain,
}

/// Rail inputs for one side: the stretch between its first and last station.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RailSideSpec {
    pub side: usize,
    /// Polyline vertex the side starts at; sides meet where one's
    /// `end_vertex` is the next one's `start_vertex`.
    pub start_vertex: usize,
    pub end_vertex: usize,
    /// First station on the path.
    pub start_on_line: Vec3,
    /// Last station on the path.
    pub end_on_line: Vec3,
    pub direction: Vec3,
    pub left: Vec3,
    /// Signed offset of the rail centreline along `left`.
    pub rail_lateral: f32,
    /// Which side of the path the host lies on (`±1`).
    pub host_sign: f32,
    /// Post top elevation at the first station.
    pub start_top_z: f32,
    /// Post top elevation at the last station.
    pub end_top_z: f32,
}

impl RailSideSpec {
    /// Untrimmed rail of `row` on this side.
    pub fn raw_rail(&self, row: usize, params: &JoinParams) -> RailLine {
        let drop = params.drop_from_top + row as f32 * params.row_spacing;
        let shift = self.left * self.rail_lateral;

        let mut start = self.start_on_line - self.direction * params.start_extension + shift;
        let mut end = self.end_on_line + self.direction * params.end_extension + shift;
        start.z = self.start_top_z - drop;
        end.z = self.end_top_z - drop;

        RailLine { start, end }
    }

    /// Side of the path the rails sit on: `+1` along `left`, `-1` against it.
    pub fn lateral_sign(&self) -> f32 {
        if self.rail_lateral.abs() > 1e-4 {
            self.rail_lateral.signum()
        } else {
            self.host_sign
        }
    }
}

/// Rail row geometry in world units (mm).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct JoinParams {
    pub rows: usize,
    /// Drop of row 0's centreline below the post tops.
    pub drop_from_top: f32,
    pub row_spacing: f32,
    /// Extension before the first station.
    pub start_extension: f32,
    /// Extension after the last station.
    pub end_extension: f32,
    pub half_rail_width: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RailLine {
    pub start: Vec3,
    pub end: Vec3,
}

impl RailLine {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }
}

/// One finished rail of one row on one side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RailRun {
    pub side: usize,
    pub row: usize,
    pub start: Vec3,
    pub end: Vec3,
    pub start_finish: EndFinish,
    pub end_finish: EndFinish,
}

impl RailRun {
    pub fn length(&self) -> f32 {
        self.start.distance(self.end)
    }

    pub fn point(&self, end: RailEnd) -> Vec3 {
        match end {
            RailEnd::Start => self.start,
            RailEnd::End => self.end,
        }
    }

    pub fn finish(&self, end: RailEnd) -> EndFinish {
        match end {
            RailEnd::Start => self.start_finish,
            RailEnd::End => self.end_finish,
        }
    }

    /// Unit vector pointing out of the rail at `end`.
    pub fn outward(&self, end: RailEnd) -> Vec3 {
        let axis = (self.end - self.start).normalize_or(Vec3::X);
        match end {
            RailEnd::Start => -axis,
            RailEnd::End => axis,
        }
    }
}

/// Which rail of a corner was cut.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ButtAssignment {
    /// The next side's start is cut to the previous rail; the previous end is capped.
    NextButtsPrev,
    /// The previous side's end is cut to the next rail; the next start is capped.
    PrevButtsNext,
    /// No stable cut: the previous end is capped and the next start left plain.
    Fallback,
}

/// Whether the rails run on the inner or the outer side of a turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CornerKind {
    Inside,
    Outside,
}

/// The decision taken at one corner for one rail row.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CornerJoint {
    pub row: usize,
    pub prev_side: usize,
    pub next_side: usize,
    pub assignment: ButtAssignment,
    /// Signed extension of the butted end along its outward axis
    /// (negative shortens); zero for a fallback.
    pub travel: f32,
    pub plane: Option<FacePlane>,
    pub kind: CornerKind,
    /// Plan cross product of the two side directions.
    pub turn: f32,
    /// Where the two rail centrelines meet in plan, at the joint elevation.
    pub reference: Vec3,
    /// Plan unit pointing from the corner back along the previous side.
    pub leg_prev: Vec3,
    /// Plan unit pointing from the corner along the next side.
    pub leg_next: Vec3,
}

impl CornerJoint {
    /// The side whose rail end keeps its cap.
    pub fn capped_side(&self) -> usize {
        match self.assignment {
            ButtAssignment::NextButtsPrev | ButtAssignment::Fallback => self.prev_side,
            ButtAssignment::PrevButtsNext => self.next_side,
        }
    }

    /// The side whose rail end is cut, if any.
    pub fn butted_side(&self) -> Option<usize> {
        match self.assignment {
            ButtAssignment::NextButtsPrev => Some(self.next_side),
            ButtAssignment::PrevButtsNext => Some(self.prev_side),
            ButtAssignment::Fallback => None,
        }
    }
}

/// Every rail and corner decision of a layout.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinedRails {
    pub runs: Vec<RailRun>,
    pub corners: Vec<CornerJoint>,
    /// Rails that collapsed below [`MIN_RAIL_LENGTH`] after fitting.
    pub dropped_runs: usize,
}

/// A candidate cut of one rail end to a face of the other rail.
#[derive(Clone, Copy, Debug)]
struct ButtFit {
    travel: f32,
    plane: FacePlane,
    point: Vec3,
}

/// Joins the rails of `sides` (in path order) row by row.
///
/// Consecutive sides meet when the first's `end_vertex` is the second's
/// `start_vertex`; the last and first sides of a closed loop meet the same
/// way. At each meeting either rail may be cut to a face plane of the
/// other. The cut needing the smaller travel wins (ties cut the next side);
/// a cut that would leave its rail under [`MIN_RAIL_LENGTH`] or that runs
/// parallel to the plane is not considered. Corners turning less than
/// [`MIN_CORNER_TURN`], or with no usable cut, fall back to capping the
/// previous rail and leaving the next plain. Open ends are capped.
#[instrument(skip_all, fields(sides = sides.len(), rows = params.rows))]
pub fn join_rails(sides: &[RailSideSpec], params: &JoinParams) -> JoinedRails {
    let mut joined = JoinedRails::default();
    let n = sides.len();

    for row in 0..params.rows {
        let raw: Vec<RailLine> = sides.iter().map(|s| s.raw_rail(row, params)).collect();
        let mut lines = raw.clone();
        let mut finishes = vec![(EndFinish::Cap, EndFinish::Cap); n];

        for k in 0..n {
            let next = (k + 1) % n;
            if next == k || sides[k].end_vertex != sides[next].start_vertex {
                continue;
            }

            let (joint, fit) =
                resolve_corner(row, &sides[k], &raw[k], &sides[next], &raw[next], params);
            match (joint.assignment, fit) {
                (ButtAssignment::NextButtsPrev, Some(fit)) => {
                    lines[next].start = fit.point;
                    finishes[next].0 = EndFinish::Butt(fit.plane);
                    finishes[k].1 = EndFinish::Cap;
                }
                (ButtAssignment::PrevButtsNext, Some(fit)) => {
                    lines[k].end = fit.point;
                    finishes[k].1 = EndFinish::Butt(fit.plane);
                    finishes[next].0 = EndFinish::Cap;
                }
                _ => {
                    finishes[k].1 = EndFinish::Cap;
                    finishes[next].0 = EndFinish::Plain;
                }
            }
            joined.corners.push(joint);
        }

        for (k, line) in lines.iter().enumerate() {
            if line.length() < MIN_RAIL_LENGTH {
                warn!(side = sides[k].side, row, "rail collapsed after fitting, dropped");
                joined.dropped_runs += 1;
                continue;
            }
            joined.runs.push(RailRun {
                side: sides[k].side,
                row,
                start: line.start,
                end: line.end,
                start_finish: finishes[k].0,
                end_finish: finishes[k].1,
            });
        }
    }

    joined
}

fn resolve_corner(
    row: usize,
    prev: &RailSideSpec,
    prev_line: &RailLine,
    next: &RailSideSpec,
    next_line: &RailLine,
    params: &JoinParams,
) -> (CornerJoint, Option<ButtFit>) {
    let dir_prev = plan_unit(prev.direction);
    let dir_next = plan_unit(next.direction);
    let turn = plan_cross(dir_prev, dir_next);

    let kind = if turn * prev.lateral_sign() > 0.0 {
        CornerKind::Inside
    } else {
        CornerKind::Outside
    };

    let (assignment, fit) = if turn.abs() < MIN_CORNER_TURN {
        (ButtAssignment::Fallback, None)
    } else {
        let half = params.half_rail_width;
        let next_cut = butt_fit(prev_line.end, prev.left, next_line, RailEnd::Start, half);
        let prev_cut = butt_fit(next_line.start, next.left, prev_line, RailEnd::End, half);
        match (next_cut, prev_cut) {
            (Some(a), Some(b)) if a.travel.abs() <= b.travel.abs() => {
                (ButtAssignment::NextButtsPrev, Some(a))
            }
            (_, Some(b)) => (ButtAssignment::PrevButtsNext, Some(b)),
            (Some(a), None) => (ButtAssignment::NextButtsPrev, Some(a)),
            (None, None) => (ButtAssignment::Fallback, None),
        }
    };

    if assignment == ButtAssignment::Fallback {
        warn!(
            row,
            prev = prev.side,
            next = next.side,
            turn,
            "no stable butt cut at corner, capping previous rail"
        );
    }

    let joint = CornerJoint {
        row,
        prev_side: prev.side,
        next_side: next.side,
        assignment,
        travel: fit.map_or(0.0, |f| f.travel),
        plane: fit.map(|f| f.plane),
        kind,
        turn,
        reference: corner_reference(prev_line, next_line),
        leg_prev: -dir_prev,
        leg_next: dir_next,
    };
    debug!(
        row,
        prev = prev.side,
        next = next.side,
        assignment = ?joint.assignment,
        kind = ?joint.kind,
        travel = joint.travel,
        "corner resolved"
    );

    (joint, fit)
}

/// Cut of `moving`'s `end` to the nearer-in-travel face of the rail whose
/// endpoint `fixed_point` is fixed. The faces are the vertical planes
/// `fixed_left · half_width` either side of the fixed rail's centreline.
fn butt_fit(
    fixed_point: Vec3,
    fixed_left: Vec3,
    moving: &RailLine,
    end: RailEnd,
    half_width: f32,
) -> Option<ButtFit> {
    let (axis, length) = Dir3::new_and_length(moving.end - moving.start).ok()?;
    let normal = Dir3::new(fixed_left).ok()?;
    let (origin, outward) = match end {
        RailEnd::Start => (moving.start, -axis),
        RailEnd::End => (moving.end, axis),
    };

    [1.0_f32, -1.0]
        .into_iter()
        .filter_map(|sign| {
            let anchor = fixed_point + fixed_left * (sign * half_width);
            let travel = signed_travel(origin, outward, anchor, normal)?;
            Some(ButtFit {
                travel,
                plane: FacePlane {
                    anchor,
                    normal: fixed_left,
                },
                point: origin + outward.as_vec3() * travel,
            })
        })
        .min_by(|a, b| a.travel.total_cmp(&b.travel))
        .filter(|fit| length + fit.travel >= MIN_RAIL_LENGTH)
}

/// Signed distance along `outward` from `origin` to the plane through
/// `anchor`; `None` when the direction runs parallel to the plane.
fn signed_travel(origin: Vec3, outward: Dir3, anchor: Vec3, normal: Dir3) -> Option<f32> {
    if normal.dot(outward.as_vec3()).abs() < PARALLEL_TOLERANCE {
        return None;
    }
    let plane = InfinitePlane3d { normal };
    let forward = Ray3d::new(origin, outward).intersect_plane(anchor, plane);
    let backward = || Ray3d::new(origin, -outward).intersect_plane(anchor, plane).map(|t| -t);
    // Neither ray hits when the origin already lies on the plane.
    Some(forward.or_else(backward).unwrap_or(0.0))
}

/// Plan intersection of the two rail centrelines at the mean joint height,
/// or the midpoint of the joint ends when they run parallel.
fn corner_reference(prev: &RailLine, next: &RailLine) -> Vec3 {
    let z = 0.5 * (prev.end.z + next.start.z);
    let p = prev.start.truncate();
    let r = prev.end.truncate() - p;
    let q = next.start.truncate();
    let s = next.end.truncate() - q;

    let denom = r.perp_dot(s);
    let hit: Vec2 = if denom.abs() > 1e-6 * r.length() * s.length() {
        p + r * ((q - p).perp_dot(s) / denom)
    } else {
        (prev.end.truncate() + q) * 0.5
    };
    hit.extend(z)
}
