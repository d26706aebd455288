// tests/settings_roundtrip.rs
use glam::Vec3;
use railing_layout::{LineRef, RailingBlueprint, RailingConfig, RailingEngine, RailingSettings};

#[test]
fn test_settings_persist_with_original_keys() {
    let settings = RailingConfig::default().to_settings();
    let json = serde_json::to_value(&settings).unwrap();

    assert_eq!(json["SpacingIn"], "4'-0\"");
    assert_eq!(json["PostHeightIn"], "3'-6\"");
    assert_eq!(json["LineRef"], "MIDDLE");
    assert_eq!(json["SeatSlotC2CIn"], "1/2\"");
    assert_eq!(json["SeatPilotC2CIn"], "1\"");
    assert_eq!(json["SeatSlotSpecial1"], "0");
    assert_eq!(json["RailCount"], "2");

    let back: RailingSettings = serde_json::from_value(json).unwrap();
    assert_eq!(back, settings);
}

#[test]
fn test_partial_instance_falls_back_to_defaults() {
    // Older files use the short connection keys and omit most values.
    let instance: RailingSettings = serde_json::from_str(
        r#"{
            "SpacingIn": "3' 6\"",
            "LineRef": "left",
            "DeckEdgeIn": "1 1/2",
            "ConnEnabled": "1",
            "ConnName": "1042",
            "RailCount": "3"
        }"#,
    )
    .unwrap();
    assert_eq!(instance.post_height_in, "");

    let defaults = RailingConfig::default().to_settings();
    let config = instance.merged_over(&defaults).resolve().unwrap();

    assert_eq!(config.spacing_in, 42.0);
    assert_eq!(config.line_ref, LineRef::Left);
    assert_eq!(config.deck_edge_in, 1.5);
    assert!(config.create_connection);
    assert_eq!(config.connection_name, "1042");
    assert_eq!(config.rails.count, 3);
    assert_eq!(config.post_height_in, 42.0);
    assert_eq!(config.seats.slot_standard, "CARRIAGE");

    // Effective values re-format canonically.
    let effective = config.to_settings();
    assert_eq!(effective.spacing_in, "3'-6\"");
    assert_eq!(effective.deck_edge_in, "1\"1/2");
    assert_eq!(effective.line_ref, "LEFT");
    assert_eq!(effective.resolve().unwrap(), config);
}

#[test]
fn test_blueprint_serializes() {
    let picks = [
        Vec3::ZERO,
        Vec3::new(2500.0, 0.0, 0.0),
        Vec3::new(2500.0, 1800.0, 300.0),
    ];
    let blueprint = RailingEngine::new(RailingConfig::default())
        .build_blueprint(&picks, &[])
        .unwrap();

    let json = serde_json::to_string(&blueprint).unwrap();
    let back: RailingBlueprint = serde_json::from_str(&json).unwrap();
    assert_eq!(back, blueprint);
}
