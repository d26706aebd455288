//! Seat angles: the short angle brackets that carry rails at posts and
//! corners, with their bolt holes.

use crate::blueprint::{Depth, PartSpec, Placement, Plane, Rotation};
use crate::joiner::{CornerJoint, CornerKind};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Smallest sine of the half corner angle used for radial offsets.
pub const MIN_HALF_ANGLE_SIN: f32 = 0.05;

/// Plan vectors whose |x| and |y| differ by less than this are diagonal.
pub const DIAGONAL_TOLERANCE: f32 = 0.05;

/// Seat geometry and hole pattern in world units (mm).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeatParams {
    pub part: PartSpec,
    pub length: f32,
    pub half_leg_thickness: f32,
    pub half_rail_depth: f32,
    pub rail_width: f32,
    pub inside_inset: f32,
    pub hole_line: f32,
    pub slot: HolePattern,
    pub pilot: HolePattern,
}

/// One kind of hole: standard, diameter, bolt cut length, spacing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HolePattern {
    pub standard: String,
    pub size: f32,
    pub cut_length: f32,
    /// Slot length for slots, hole spacing for pilots.
    pub spacing: f32,
    pub special_first_layer: bool,
}

/// What a seat is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatKind {
    Post {
        side: usize,
        station: usize,
        row: usize,
    },
    Corner {
        prev_side: usize,
        next_side: usize,
        row: usize,
        corner: CornerKind,
    },
}

/// Which part a hole is bored in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoleTarget {
    Seat,
    Post,
}

/// An alternative hole placement for hosts that reject the first one.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HolePlacement {
    pub center: Vec3,
    pub rotation: Rotation,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HoleSpec {
    pub target: HoleTarget,
    pub center: Vec3,
    /// Direction the slot runs along (the bolt group's X axis).
    pub axis: Vec3,
    pub rotation: Rotation,
    pub standard: String,
    pub size: f32,
    pub cut_length: f32,
    /// Zero for round holes.
    pub slot_length: f32,
    pub special_first_layer: bool,
    pub retry: Option<HolePlacement>,
}

impl HoleSpec {
    fn slot(pattern: &HolePattern, center: Vec3, axis: Vec3, rotation: Rotation) -> Self {
        Self {
            target: HoleTarget::Seat,
            center,
            axis,
            rotation,
            standard: pattern.standard.clone(),
            size: pattern.size,
            cut_length: pattern.cut_length,
            slot_length: pattern.spacing,
            special_first_layer: pattern.special_first_layer,
            retry: None,
        }
    }

    fn pilot(pattern: &HolePattern, center: Vec3, axis: Vec3) -> Self {
        Self {
            target: HoleTarget::Post,
            center,
            axis,
            rotation: Rotation::Below,
            standard: pattern.standard.clone(),
            size: pattern.size,
            cut_length: pattern.cut_length,
            slot_length: 0.0,
            special_first_layer: false,
            retry: None,
        }
    }

    pub fn is_slot(&self) -> bool {
        self.slot_length > 0.0
    }
}

/// A seat angle from `start` to `end` and its holes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeatSpec {
    pub kind: SeatKind,
    pub start: Vec3,
    pub end: Vec3,
    pub placement: Placement,
    pub part: PartSpec,
    pub holes: Vec<HoleSpec>,
}

impl SeatSpec {
    pub fn center(&self) -> Vec3 {
        (self.start + self.end) * 0.5
    }

    pub fn axis(&self) -> Vec3 {
        (self.end - self.start).normalize_or(Vec3::X)
    }
}

/// Where a straight-run seat goes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostSeatSite {
    pub side: usize,
    pub station: usize,
    pub row: usize,
    /// Station on the path.
    pub on_line: Vec3,
    /// Plan unit direction of the side.
    pub direction: Vec3,
    pub left: Vec3,
    pub post_lateral: f32,
    pub half_post_width: f32,
    /// Which side of the post the rails are on (`±1`).
    pub rail_sign: f32,
    /// Rail centreline elevation at the station.
    pub rail_z: f32,
}

/// Seat under a rail at a post, on the post face the rail bears against.
///
/// The angle runs along the side with its horizontal leg under the rail and
/// its vertical leg against the post. One slot goes in each leg; two pilot
/// holes for self-drilling screws go in the post either side of the
/// post-leg slot.
pub fn post_seat(site: &PostSeatSite, params: &SeatParams) -> SeatSpec {
    let dir = site.direction;
    let lateral = site.post_lateral + site.rail_sign * site.half_post_width;
    let mut mid = site.on_line + site.left * lateral;
    mid.z = site.rail_z - params.half_rail_depth;

    let half = dir * (params.length * 0.5);

    // Leg-normal pointing back at the post centre.
    let mut post_mid = site.on_line + site.left * site.post_lateral;
    post_mid.z = mid.z;
    let mut side = dir.cross(Vec3::Z).normalize_or(Vec3::X);
    if side.truncate().dot((post_mid - mid).truncate()) < 0.0 {
        side = -side;
    }

    let t = params.half_leg_thickness;
    let post_slot = mid - Vec3::Z * params.hole_line + side * t;
    let rail_slot = mid - side * params.hole_line - Vec3::Z * t;
    let rail_retry = mid - side * params.hole_line + Vec3::Z * t;

    let mut rail_hole = HoleSpec::slot(&params.slot, rail_slot, dir, Rotation::Back);
    rail_hole.retry = Some(HolePlacement {
        center: rail_retry,
        rotation: Rotation::Top,
    });

    let pilot_offset = dir * (params.pilot.spacing * 0.5);
    let holes = vec![
        HoleSpec::slot(&params.slot, post_slot, dir, Rotation::Below),
        rail_hole,
        HoleSpec::pilot(&params.pilot, post_slot - pilot_offset, dir),
        HoleSpec::pilot(&params.pilot, post_slot + pilot_offset, dir),
    ];

    SeatSpec {
        kind: SeatKind::Post {
            side: site.side,
            station: site.station,
            row: site.row,
        },
        start: mid - half,
        end: mid + half,
        placement: Placement {
            plane: Plane::Left,
            rotation: Rotation::Below,
            depth: Depth::Behind,
        },
        part: params.part.clone(),
        holes,
    }
}

/// Seat standing at a rail corner, legs against both rails.
///
/// The seat sits on the corner's bisector: into the turn for an inside
/// corner, out of it for an outside one. Returns `None` when the legs are
/// opposite and there is no bisector.
pub fn corner_seat(joint: &CornerJoint, params: &SeatParams) -> Option<SeatSpec> {
    let u = joint.leg_prev;
    let v = joint.leg_next;
    let bisector = (u + v).try_normalize()?;

    let half_angle = u.dot(v).clamp(-1.0, 1.0).acos() * 0.5;
    let sin = half_angle.sin().max(MIN_HALF_ANGLE_SIN);
    let base = params.half_rail_depth / sin;

    let (toward, radius, legs) = match joint.kind {
        CornerKind::Inside => (bisector, base + params.inside_inset, (u, v)),
        CornerKind::Outside => (-bisector, base + params.rail_width / sin, (-u, -v)),
    };
    let mid = joint.reference + toward * radius;
    let half = Vec3::Z * (params.length * 0.5);

    let holes = vec![
        HoleSpec::slot(&params.slot, mid + u * params.hole_line, u, Rotation::Below),
        HoleSpec::slot(&params.slot, mid + v * params.hole_line, v, Rotation::Top),
    ];

    Some(SeatSpec {
        kind: SeatKind::Corner {
            prev_side: joint.prev_side,
            next_side: joint.next_side,
            row: joint.row,
            corner: joint.kind,
        },
        start: mid - half,
        end: mid + half,
        placement: Placement::centered(corner_rotation(legs.0, legs.1)),
        part: params.part.clone(),
        holes,
    })
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Compass {
    East,
    North,
    West,
    South,
}

fn compass(v: Vec3) -> Option<Compass> {
    let (ax, ay) = (v.x.abs(), v.y.abs());
    if (ax - ay).abs() < DIAGONAL_TOLERANCE {
        return None;
    }
    Some(if ax > ay {
        if v.x >= 0.0 { Compass::East } else { Compass::West }
    } else if v.y >= 0.0 {
        Compass::North
    } else {
        Compass::South
    })
}

fn quadrant_rotation(east: bool, north: bool) -> Rotation {
    match (east, north) {
        (true, true) => Rotation::Top,
        (false, true) => Rotation::Back,
        (false, false) => Rotation::Below,
        (true, false) => Rotation::Front,
    }
}

/// Rotation of a corner seat whose legs point along `a` and `b` (plan).
///
/// Legs along two neighbouring compass directions name the quadrant the
/// angle opens into. Diagonal, collinear or opposite legs fall back to the
/// quadrant of their bisector, with zero components counted as east/north;
/// no bisector at all gives `Top`.
pub fn corner_rotation(a: Vec3, b: Vec3) -> Rotation {
    use Compass::*;

    match (compass(a), compass(b)) {
        (Some(East), Some(North)) | (Some(North), Some(East)) => quadrant_rotation(true, true),
        (Some(West), Some(North)) | (Some(North), Some(West)) => quadrant_rotation(false, true),
        (Some(West), Some(South)) | (Some(South), Some(West)) => quadrant_rotation(false, false),
        (Some(East), Some(South)) | (Some(South), Some(East)) => quadrant_rotation(true, false),
        _ => {
            let sum = (a + b).truncate();
            if sum.length_squared() < 1e-8 {
                Rotation::Top
            } else {
                quadrant_rotation(sum.x >= 0.0, sum.y >= 0.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joiner::ButtAssignment;
    use approx::assert_relative_eq;

    fn params() -> SeatParams {
        let slot = HolePattern {
            standard: "CARRIAGE".into(),
            size: 8.0,
            cut_length: 25.0,
            spacing: 12.0,
            special_first_layer: true,
        };
        SeatParams {
            part: PartSpec::new("L1-1/2X1-1/2X1/8", "A1011-GR.50", "6", "RAIL POST ANGLE"),
            length: 38.1,
            half_leg_thickness: 1.5875,
            half_rail_depth: 19.05,
            rail_width: 38.1,
            inside_inset: 3.175,
            hole_line: 19.05,
            slot,
            pilot: HolePattern {
                standard: "TEK-3".into(),
                size: 3.0,
                cut_length: 25.0,
                spacing: 25.4,
                special_first_layer: false,
            },
        }
    }

    fn joint(kind: CornerKind) -> CornerJoint {
        CornerJoint {
            row: 0,
            prev_side: 0,
            next_side: 1,
            assignment: ButtAssignment::NextButtsPrev,
            travel: -60.0,
            plane: None,
            kind,
            turn: 1.0,
            reference: Vec3::new(-40.0, 40.0, 900.0),
            leg_prev: -Vec3::X,
            leg_next: Vec3::Y,
        }
    }

    #[test]
    fn post_seat_sits_on_the_rail_side_face() {
        let site = PostSeatSite {
            side: 0,
            station: 2,
            row: 0,
            on_line: Vec3::new(1000.0, 0.0, 0.0),
            direction: Vec3::X,
            left: Vec3::Y,
            post_lateral: 0.0,
            half_post_width: 25.4,
            rail_sign: 1.0,
            rail_z: 950.0,
        };
        let seat = post_seat(&site, &params());

        assert_eq!(seat.placement.plane, Plane::Left);
        assert!(seat.center().abs_diff_eq(Vec3::new(1000.0, 25.4, 930.95), 1e-3));
        assert!(seat.axis().abs_diff_eq(Vec3::X, 1e-6));
        assert_relative_eq!(seat.start.distance(seat.end), 38.1, epsilon = 1e-3);

        assert_eq!(seat.holes.len(), 4);
        let post_slot = &seat.holes[0];
        // Leg-normal points back at the post centre (-Y here).
        assert!(post_slot.center.abs_diff_eq(Vec3::new(1000.0, 23.8125, 911.9), 1e-3));
        assert_eq!(post_slot.rotation, Rotation::Below);
        assert!(post_slot.is_slot());

        let rail_slot = &seat.holes[1];
        assert!(rail_slot.center.abs_diff_eq(Vec3::new(1000.0, 44.45, 929.3625), 1e-3));
        assert_eq!(rail_slot.rotation, Rotation::Back);
        let retry = rail_slot.retry.unwrap();
        assert_eq!(retry.rotation, Rotation::Top);
        assert_relative_eq!(retry.center.z, 932.5375, epsilon = 1e-3);

        let pilots: Vec<_> = seat.holes.iter().filter(|h| h.target == HoleTarget::Post).collect();
        assert_eq!(pilots.len(), 2);
        assert_relative_eq!(pilots[0].center.distance(pilots[1].center), 25.4, epsilon = 1e-3);
        assert!(pilots.iter().all(|h| !h.is_slot() && !h.special_first_layer));
    }

    #[test]
    fn inside_corner_seat_moves_into_the_turn() {
        let seat = corner_seat(&joint(CornerKind::Inside), &params()).unwrap();
        let center = seat.center();
        let expected = 19.05 / std::f32::consts::FRAC_PI_4.sin() + 3.175;
        let offset = center - Vec3::new(-40.0, 40.0, 900.0);
        assert_relative_eq!(offset.length(), expected, epsilon = 1e-3);
        assert!(offset.x < 0.0 && offset.y > 0.0);
        assert!(seat.axis().abs_diff_eq(Vec3::Z, 1e-6));
        assert_eq!(seat.placement.rotation, Rotation::Back);
        assert_eq!(seat.holes.len(), 2);
        assert!(seat.holes.iter().all(|h| h.target == HoleTarget::Seat));
    }

    #[test]
    fn outside_corner_seat_moves_out_of_the_turn() {
        let seat = corner_seat(&joint(CornerKind::Outside), &params()).unwrap();
        let offset = seat.center() - Vec3::new(-40.0, 40.0, 900.0);
        let sin = std::f32::consts::FRAC_PI_4.sin();
        assert_relative_eq!(offset.length(), (19.05 + 38.1) / sin, epsilon = 1e-3);
        assert!(offset.x > 0.0 && offset.y < 0.0);
        assert_eq!(seat.placement.rotation, Rotation::Front);
    }

    #[test]
    fn opposite_legs_get_no_seat() {
        let mut straight = joint(CornerKind::Inside);
        straight.leg_next = Vec3::X;
        assert!(corner_seat(&straight, &params()).is_none());
    }

    #[test]
    fn rotation_from_compass_quadrants() {
        assert_eq!(corner_rotation(Vec3::X, Vec3::Y), Rotation::Top);
        assert_eq!(corner_rotation(Vec3::Y, -Vec3::X), Rotation::Back);
        assert_eq!(corner_rotation(-Vec3::X, -Vec3::Y), Rotation::Below);
        assert_eq!(corner_rotation(-Vec3::Y, Vec3::X), Rotation::Front);
    }

    #[test]
    fn diagonal_legs_use_the_bisector_quadrant() {
        let diag = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert_eq!(corner_rotation(diag, -Vec3::X), Rotation::Back);
        assert_eq!(corner_rotation(Vec3::X, Vec3::new(0.6, -0.8, 0.0)), Rotation::Front);
        // Zero components count as east/north.
        assert_eq!(corner_rotation(Vec3::X, Vec3::new(-1.0, 0.5, 0.0)), Rotation::Top);
        // No bisector at all.
        assert_eq!(corner_rotation(Vec3::Y, -Vec3::Y), Rotation::Top);
        assert_eq!(
            corner_rotation(Vec3::X, Vec3::new(0.2, -0.1, 0.0)),
            Rotation::Front
        );
    }
}
