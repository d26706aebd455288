//! Property-based tests for codec, station and joiner invariants.

use glam::Vec3;
use proptest::prelude::*;

use railing_layout::{
    ButtAssignment, EndFinish, JoinParams, RailSideSpec, StationDistribution, format_inches,
    join_rails, left_of, parse_inches,
};

// ---------------------------------------------------------------------------
// Strategy helpers
// ---------------------------------------------------------------------------

/// Signed lengths up to ~400 feet.
fn arb_inches() -> impl Strategy<Value = f64> {
    -5000.0f64..5000.0
}

fn arb_denominator() -> impl Strategy<Value = i64> {
    prop_oneof![Just(2i64), Just(4), Just(8), Just(16), Just(32), Just(64)]
}

/// Plan turn between two sides, clear of straight and of hairpins.
fn arb_turn_degrees() -> impl Strategy<Value = f32> {
    prop_oneof![10.0f32..150.0, -150.0f32..-10.0]
}

fn side_spec(side: usize, a: Vec3, b: Vec3, rail_lateral: f32) -> RailSideSpec {
    let direction = (b - a).normalize();
    RailSideSpec {
        side,
        start_vertex: side,
        end_vertex: side + 1,
        start_on_line: a,
        end_on_line: b,
        direction,
        left: left_of(direction),
        rail_lateral,
        host_sign: rail_lateral.signum(),
        start_top_z: a.z + 1066.8,
        end_top_z: b.z + 1066.8,
    }
}

fn join_params(rows: usize) -> JoinParams {
    JoinParams {
        rows,
        drop_from_top: 19.05,
        row_spacing: 457.2,
        start_extension: 0.0,
        end_extension: 0.0,
        half_rail_width: 19.05,
    }
}

/// Two sides meeting at `corner`, the second turned by `turn_deg` in plan.
fn corner_pair(
    corner: Vec3,
    heading_deg: f32,
    turn_deg: f32,
    len_a: f32,
    len_b: f32,
    rail_lateral: f32,
) -> [RailSideSpec; 2] {
    let h0 = heading_deg.to_radians();
    let h1 = (heading_deg + turn_deg).to_radians();
    let d0 = Vec3::new(h0.cos(), h0.sin(), 0.0);
    let d1 = Vec3::new(h1.cos(), h1.sin(), 0.0);
    [
        side_spec(0, corner - d0 * len_a, corner, rail_lateral),
        side_spec(1, corner, corner + d1 * len_b, rail_lateral),
    ]
}

// ---------------------------------------------------------------------------
// 1. Codec round-trip: parse(format(x, d)) is within 1/(2d) of x
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn format_parse_round_trip(x in arb_inches(), d in arb_denominator()) {
        let text = format_inches(x, d);
        let back = parse_inches(&text, true);
        prop_assert!(back.is_ok(), "{:?} did not parse: {:?}", text, back);
        let back = back.unwrap();
        let tol = 0.5 / d as f64 + 1e-9;
        prop_assert!((back - x).abs() <= tol,
            "x={} formatted {:?} parsed back {}", x, text, back);
    }
}

// ---------------------------------------------------------------------------
// 2. Codec idempotence: format(parse(format(x))) == format(x)
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn format_is_idempotent(x in arb_inches(), d in arb_denominator()) {
        let once = format_inches(x, d);
        let twice = format_inches(parse_inches(&once, true).unwrap(), d);
        prop_assert_eq!(once, twice);
    }
}

// ---------------------------------------------------------------------------
// 3. Stations land on both ends without exceeding the target spacing
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn stations_span_usable_length(
        length in 10.0f32..20_000.0,
        start in 0.0f32..4.0,
        end in 0.0f32..4.0,
        spacing in 50.0f32..3000.0,
    ) {
        let dist = StationDistribution::new(length, start, end, spacing).unwrap();
        let first = dist.position(0);
        let last = dist.position(dist.bays);
        prop_assert!((first - start).abs() < 1e-3);
        prop_assert!((last - (length - end)).abs() < 1e-2,
            "last station {} vs usable end {}", last, length - end);
        prop_assert!(dist.pitch <= spacing * (1.0 + 1e-5));
        prop_assert_eq!(dist.positions().count(), dist.bays + 1);
    }
}

// ---------------------------------------------------------------------------
// 4. Joiner: every non-degenerate corner caps exactly one rail and butts the other
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn corner_caps_one_and_butts_one(
        (cx, cy, cz) in (-5000.0f32..5000.0, -5000.0f32..5000.0, -500.0f32..500.0),
        heading in -180.0f32..180.0,
        turn in arb_turn_degrees(),
        len_a in 1500.0f32..5000.0,
        len_b in 1500.0f32..5000.0,
        lateral in prop_oneof![-120.0f32..-20.0, 20.0f32..120.0],
        rows in 1usize..4,
    ) {
        let sides = corner_pair(Vec3::new(cx, cy, cz), heading, turn, len_a, len_b, lateral);
        let joined = join_rails(&sides, &join_params(rows));

        prop_assert_eq!(joined.corners.len(), rows);
        prop_assert_eq!(joined.runs.len(), 2 * rows);

        for row in 0..rows {
            let joint = joined.corners.iter().find(|c| c.row == row).unwrap();
            prop_assert_ne!(joint.assignment, ButtAssignment::Fallback);

            let prev = joined.runs.iter().find(|r| r.row == row && r.side == 0).unwrap();
            let next = joined.runs.iter().find(|r| r.row == row && r.side == 1).unwrap();
            let ends = [prev.end_finish, next.start_finish];
            let caps = ends.iter().filter(|f| matches!(f, EndFinish::Cap)).count();
            let butts = ends.iter().filter(|f| matches!(f, EndFinish::Butt(_))).count();
            prop_assert_eq!((caps, butts), (1, 1), "row {} ends {:?}", row, ends);

            // The cut end lies on its face plane.
            let (point, finish) = if matches!(prev.end_finish, EndFinish::Butt(_)) {
                (prev.end, prev.end_finish)
            } else {
                (next.start, next.start_finish)
            };
            if let EndFinish::Butt(plane) = finish {
                prop_assert!(plane.signed_distance(point).abs() < 0.05);
            }

            // Open ends always cap.
            prop_assert_eq!(prev.start_finish, EndFinish::Cap);
            prop_assert_eq!(next.end_finish, EndFinish::Cap);
        }
    }
}

// ---------------------------------------------------------------------------
// 5. Joiner idempotence: identical inputs give identical decisions
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn joiner_is_deterministic(
        heading in -180.0f32..180.0,
        turn in -179.0f32..179.0,
        lateral in -120.0f32..120.0,
    ) {
        let sides = corner_pair(Vec3::ZERO, heading, turn, 2000.0, 2000.0, lateral);
        let params = join_params(2);
        prop_assert_eq!(join_rails(&sides, &params), join_rails(&sides, &params));
    }
}
