// tests/railing_layout.rs
use approx::assert_relative_eq;
use glam::Vec3;
use railing_layout::{
    ButtAssignment, CornerKind, HostElement, LayoutError, LineRef, RailEnd, RailingConfig,
    RailingEngine, RailingSettings, Rotation, SeatKind, SettingsError,
};

fn engine() -> RailingEngine {
    RailingEngine::new(RailingConfig::default())
}

fn l_path() -> [Vec3; 3] {
    [
        Vec3::ZERO,
        Vec3::new(3000.0, 0.0, 0.0),
        Vec3::new(3000.0, 3000.0, 0.0),
    ]
}

#[test]
fn test_straight_run() {
    // 3000 mm at a 48" (1219.2 mm) target spacing: 3 bays of 1000 mm.
    let picks = [Vec3::ZERO, Vec3::new(3000.0, 0.0, 0.0)];
    let blueprint = engine().build_blueprint(&picks, &[]).unwrap();

    assert_eq!(blueprint.posts.len(), 4, "Should have 4 posts");
    assert_eq!(blueprint.post_caps.len(), 4);
    assert!(blueprint.connections.is_empty(), "Connections are off by default");

    let xs: Vec<f32> = blueprint.posts.iter().map(|p| p.start.x).collect();
    assert_eq!(xs, vec![0.0, 1000.0, 2000.0, 3000.0]);
    for post in &blueprint.posts {
        assert_eq!(post.placement.rotation, Rotation::Top);
        assert_eq!(post.start.z, 0.0);
        assert_relative_eq!(post.end.z, 1066.8, epsilon = 1e-3);
        assert_eq!(post.part.profile, "HSS2X2X1/8");
    }

    // Cap plate sits half its thickness above the post top.
    let cap = &blueprint.post_caps[2];
    assert_eq!(cap.post, 2);
    assert_relative_eq!(cap.center.z, 1066.8 + 1.5875, epsilon = 1e-3);
    assert_relative_eq!(cap.half_size, 25.4, epsilon = 1e-4);

    // Two rows, one piece each, capped at both ends.
    assert_eq!(blueprint.rail_pieces.len(), 2);
    assert_eq!(blueprint.end_caps.len(), 4);
    assert!(blueprint.end_fittings.is_empty());
    assert!(blueprint.corners.is_empty());

    let top_rail = &blueprint.rail_pieces[0];
    assert_eq!(top_rail.row, 0);
    // Rail sits beside the post: half post + half rail off the centreline.
    assert_relative_eq!(top_rail.start.y, 44.45, epsilon = 1e-3);
    assert_relative_eq!(top_rail.start.z, 1066.8 - 19.05, epsilon = 1e-3);
    assert_relative_eq!(top_rail.end.x, 3000.0, epsilon = 1e-3);

    let second_rail = &blueprint.rail_pieces[1];
    assert_relative_eq!(second_rail.start.z, 1066.8 - 19.05 - 457.2, epsilon = 1e-3);

    let start_cap = blueprint
        .end_caps
        .iter()
        .find(|c| c.row == 0 && c.end == RailEnd::Start)
        .unwrap();
    assert!(start_cap.normal.abs_diff_eq(-Vec3::X, 1e-6));
    assert_relative_eq!(start_cap.center.x, -1.5875, epsilon = 1e-3);

    // One seat per post per row.
    assert_eq!(blueprint.seats.len(), 8);
    assert!(blueprint.seats.iter().all(|s| matches!(s.kind, SeatKind::Post { .. })));
    assert!(blueprint.seats.iter().all(|s| s.holes.len() == 4));
}

#[test]
fn test_l_corner_butts_one_rail_per_row() {
    let blueprint = engine().build_blueprint(&l_path(), &[]).unwrap();

    // 4 + 4 stations sharing the corner post.
    assert_eq!(blueprint.posts.len(), 7);
    assert_eq!(blueprint.summary.duplicate_stations, 1);
    assert_eq!(blueprint.summary.rail_sides, 2);

    assert_eq!(blueprint.corners.len(), 2, "One corner decision per row");
    for joint in &blueprint.corners {
        assert_ne!(joint.assignment, ButtAssignment::Fallback);
        assert_eq!(joint.kind, CornerKind::Inside);
        assert_eq!((joint.prev_side, joint.next_side), (0, 1));
    }

    // Per row: two open-end caps plus the capped rail at the corner.
    assert_eq!(blueprint.end_caps.len(), 6);
    assert_eq!(blueprint.end_fittings.len(), 2);
    for fitting in &blueprint.end_fittings {
        assert_relative_eq!(fitting.plane.signed_distance(fitting.point), 0.0, epsilon = 1e-2);
    }

    // Corner posts get a corner seat instead of post seats.
    let corner_seats = blueprint
        .seats
        .iter()
        .filter(|s| matches!(s.kind, SeatKind::Corner { .. }))
        .count();
    assert_eq!(corner_seats, 2);
    assert_eq!(blueprint.seats.len(), 6 * 2 + 2);
}

#[test]
fn test_closed_loop_joins_the_wrap_corner() {
    let picks = [
        Vec3::ZERO,
        Vec3::new(3000.0, 0.0, 0.0),
        Vec3::new(3000.0, 3000.0, 0.0),
        Vec3::new(0.0, 3000.0, 0.0),
        Vec3::new(0.0, 0.0, 0.0),
    ];
    let blueprint = engine().build_blueprint(&picks, &[]).unwrap();

    assert_eq!(blueprint.summary.sides, 4);
    assert_eq!(blueprint.posts.len(), 12);
    assert_eq!(blueprint.corners.len(), 8);
    assert!(blueprint.corners.iter().any(|c| c.prev_side == 3 && c.next_side == 0));

    // No open ends: every corner caps one rail and fits the other.
    assert_eq!(blueprint.end_caps.len(), 8);
    assert_eq!(blueprint.end_fittings.len(), 8);
    assert_eq!(blueprint.seats.len(), 8 * 2 + 8);
}

#[test]
fn test_posts_bear_on_hosts() {
    let deck = HostElement::new(
        77,
        Vec3::new(-500.0, -1000.0, -300.0),
        Vec3::new(3500.0, 10.0, -150.0),
    );
    let config = RailingConfig {
        create_connection: true,
        connection_name: "1042".into(),
        ..RailingConfig::default()
    };
    let picks = [Vec3::new(0.0, 0.0, 0.0), Vec3::new(3000.0, 0.0, 0.0)];
    let blueprint = RailingEngine::new(config).build_blueprint(&picks, &[deck]).unwrap();

    assert_eq!(blueprint.posts.len(), 4);
    for post in &blueprint.posts {
        assert_eq!(post.host, Some(77));
        assert_eq!(post.start.z, -150.0);
    }

    assert_eq!(blueprint.connections.len(), 4);
    assert!(blueprint.connections.iter().all(|c| c.host == 77 && c.attributes.is_none()));
    assert_eq!(blueprint.connections[3].post, 3);

    // The deck lies to the right of the run, so the rails do too.
    assert_relative_eq!(blueprint.rail_pieces[0].start.y, -44.45, epsilon = 1e-3);
}

#[test]
fn test_offset_posts_bear_on_the_host_under_the_path() {
    let under_path = HostElement::new(
        1,
        Vec3::new(-100.0, -50.0, -400.0),
        Vec3::new(3100.0, 50.0, -200.0),
    );
    let under_post = HostElement::new(
        2,
        Vec3::new(-100.0, 100.0, -300.0),
        Vec3::new(3100.0, 400.0, 0.0),
    );
    let config = RailingConfig {
        line_ref: LineRef::Left,
        deck_edge_in: 6.0,
        create_connection: true,
        connection_name: "1042".into(),
        ..RailingConfig::default()
    };
    let picks = [Vec3::ZERO, Vec3::new(3000.0, 0.0, 0.0)];
    let blueprint = RailingEngine::new(config)
        .build_blueprint(&picks, &[under_post, under_path])
        .unwrap();

    assert_eq!(blueprint.posts.len(), 4);
    for post in &blueprint.posts {
        assert_eq!(post.host, Some(1));
        // Deck edge plus half the 2" post.
        assert_relative_eq!(post.start.y, 177.8, epsilon = 1e-3);
        assert_eq!(post.start.z, -200.0);
    }
    assert!(blueprint.connections.iter().all(|c| c.host == 1));
}

#[test]
fn test_rail_extensions_move_open_ends() {
    let mut config = RailingConfig::default();
    config.rails.start_offset_in = 2.0;
    config.rails.end_offset_in = -1.0;
    let picks = [Vec3::ZERO, Vec3::new(3000.0, 0.0, 0.0)];
    let blueprint = RailingEngine::new(config).build_blueprint(&picks, &[]).unwrap();

    for rail in &blueprint.rail_pieces {
        assert_relative_eq!(rail.start.x, -50.8, epsilon = 1e-3);
        assert_relative_eq!(rail.end.x, 2974.6, epsilon = 1e-3);
    }
    let top = &blueprint.rail_pieces[0];
    assert_relative_eq!(top.start.z, 1066.8 - 19.05, epsilon = 1e-3);
    assert_relative_eq!(top.end.z, 1066.8 - 19.05, epsilon = 1e-3);
}

#[test]
fn test_long_rails_are_split() {
    let picks = [Vec3::ZERO, Vec3::new(10_000.0, 0.0, 0.0)];
    let blueprint = engine().build_blueprint(&picks, &[]).unwrap();
    let row0: Vec<_> = blueprint.rail_pieces.iter().filter(|p| p.row == 0).collect();
    assert_eq!(row0.len(), 2);
    assert_relative_eq!(row0[0].end.x, 5000.0, epsilon = 1e-2);
    assert_eq!(row0[1].piece, 1);
}

#[test]
fn test_rails_disabled() {
    let mut config = RailingConfig::default();
    config.rails.enabled = false;
    let blueprint = RailingEngine::new(config).build_blueprint(&l_path(), &[]).unwrap();
    assert_eq!(blueprint.posts.len(), 7);
    assert!(blueprint.rail_pieces.is_empty());
    assert!(blueprint.seats.is_empty());
    assert!(blueprint.corners.is_empty());
}

#[test]
fn test_short_sides_are_skipped_without_error() {
    let picks = [
        Vec3::ZERO,
        Vec3::new(0.4, 0.0, 0.0),
        Vec3::new(0.4, 2000.0, 0.0),
    ];
    let blueprint = engine().build_blueprint(&picks, &[]).unwrap();
    assert_eq!(blueprint.summary.skipped_sides, 1);
    assert_eq!(blueprint.posts.len(), 3);
    assert!(blueprint.corners.is_empty());
}

#[test]
fn test_invalid_input() {
    assert_eq!(
        engine().build_blueprint(&[Vec3::ZERO], &[]),
        Err(LayoutError::TooFewPoints { count: 1 })
    );

    let defaults = RailingConfig::default().to_settings();
    let instance = RailingSettings {
        spacing_in: "-4'".into(),
        ..Default::default()
    };
    let err = RailingEngine::from_settings(&instance, &defaults).unwrap_err();
    assert!(matches!(
        err,
        LayoutError::Settings(SettingsError::Distance { key: "SpacingIn", .. })
    ));
}

#[test]
fn test_blueprint_is_repeatable() {
    let engine = engine();
    let a = engine.build_blueprint(&l_path(), &[]).unwrap();
    let b = engine.build_blueprint(&l_path(), &[]).unwrap();
    assert_eq!(a, b);
}
