//! End-to-end snapping and connectivity behavior over JSON-authored tables

use std::collections::HashSet;

use bk_core::{
    EngineConfig, PartInstance, PartKind, Scene, SnapCycle, SnapEngine, Transform,
    SNAP_PAIRS_FILE, SNAP_POINTS_FILE,
};
use glam::DVec3;
use uuid::Uuid;

const TOLERANCE: f64 = 1e-5;

const SNAP_POINTS: &str = r#"{
    "WALL": {
        "parts": ["W_WALL", "W_WALL_WINDOW"],
        "snap_points": {
            "LEFT": {
                "matrix": [[0,0,-1,-2],[0,1,0,0],[1,0,0,0],[0,0,0,1]],
                "opposite": "RIGHT"
            },
            "RIGHT": {
                "matrix": [[0,0,1,2],[0,1,0,0],[-1,0,0,0],[0,0,0,1]],
                "opposite": "LEFT"
            }
        }
    },
    "FENCE": {
        "parts": ["F_FENCE"],
        "snap_points": {
            "LEFT": {
                "matrix": [[0,0,-1,-2],[0,1,0,0],[1,0,0,0],[0,0,0,1]],
                "opposite": "RIGHT"
            },
            "RIGHT": {
                "matrix": [[0,0,1,2],[0,1,0,0],[-1,0,0,0],[0,0,0,1]],
                "opposite": "LEFT"
            }
        }
    },
    "FLOOR": {
        "parts": ["F_FLOOR"],
        "snap_points": {
            "TOP": { "matrix": [[1,0,0,0],[0,0,1,0.25],[0,-1,0,0],[0,0,0,1]] },
            "SIDE": { "matrix": [[0,0,1,2],[0,1,0,0],[-1,0,0,0],[0,0,0,1]] }
        }
    },
    "CRATE": {
        "parts": ["CRATE"],
        "snap_points": {
            "BASE": { "matrix": [[1,0,0,0],[0,0,-1,-0.5],[0,1,0,0],[0,0,0,1]] },
            "BACK": { "matrix": [[-1,0,0,0],[0,1,0,0],[0,0,-1,-0.5],[0,0,0,1]] }
        }
    },
    "CONTROL": {
        "parts": ["POWER_CONTROL"],
        "snap_points": {
            "POWER": { "matrix": [[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]] }
        }
    },
    "LINE": {
        "parts": ["U_POWERLINE"],
        "snap_points": {
            "POWER_START": { "matrix": [[1,0,0,0],[0,1,0,0],[0,0,1,0],[0,0,0,1]] },
            "POWER_END": { "matrix": [[1,0,0,0],[0,1,0,0],[0,0,1,1],[0,0,0,1]] }
        }
    },
    "GENERATOR": {
        "parts": ["U_GENERATOR_S"],
        "snap_points": {
            "POWER_OUT": { "matrix": [[1,0,0,0],[0,1,0,1],[0,0,1,0],[0,0,0,1]] }
        }
    },
    "DECOR": { "parts": ["PLANT"] }
}"#;

const SNAP_PAIRS: &str = r#"{
    "WALL": {
        "WALL": ["RIGHT, LEFT", "LEFT, RIGHT"],
        "CRATE": ["DOOR_SLOT", "BASE"]
    },
    "FENCE": { "FENCE": ["RIGHT", "LEFT"] },
    "FLOOR": {
        "CRATE": ["TOP, SIDE", "BASE, BACK"],
        "WALL": ["SIDE", "LEFT"]
    },
    "CONTROL": { "CONTROL": ["POWER", "POWER"] },
    "GENERATOR": { "CONTROL": ["POWER_OUT", "POWER"] }
}"#;

fn engine() -> SnapEngine {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(SNAP_POINTS_FILE), SNAP_POINTS).unwrap();
    std::fs::write(dir.path().join(SNAP_PAIRS_FILE), SNAP_PAIRS).unwrap();
    SnapEngine::load_tables(dir.path(), EngineConfig::default()).unwrap()
}

fn place(scene: &mut Scene, type_id: &str, transform: Transform) -> Uuid {
    let kind = PartKind::classify(type_id, &EngineConfig::default());
    scene.add_part(PartInstance::new(type_id, kind).with_transform(transform))
}

fn at(x: f64, y: f64, z: f64) -> Transform {
    Transform::from_translation(DVec3::new(x, y, z))
}

fn posed(x: f64, y: f64, z: f64, yaw: f64) -> Transform {
    at(x, y, z) * Transform::rotation_y(yaw)
}

fn world_of(scene: &Scene, id: Uuid) -> Transform {
    scene.get_part(id).unwrap().world_transform
}

fn snap_frame(engine: &SnapEngine, scene: &Scene, id: Uuid, key: &str) -> Transform {
    engine
        .connectivity()
        .snap_world_transform(scene.get_part(id).unwrap(), key)
        .unwrap()
}

#[test]
fn test_every_key_pair_coincides_and_faces() {
    let mut engine = engine();
    let mut scene = Scene::default();
    let floor = place(&mut scene, "F_FLOOR", posed(3.0, 0.0, -2.0, 0.6));
    let crate_part = place(&mut scene, "CRATE", posed(-10.0, 4.0, 1.0, 2.2));

    let steps = [
        SnapCycle::none(),
        SnapCycle::next_source(),
        SnapCycle::next_target(),
        SnapCycle::prev_source(),
    ];
    let mut seen = HashSet::new();
    for cycle in steps {
        assert!(engine.align(&mut scene, crate_part, floor, cycle).unwrap());

        let target_key = engine.cache().get(floor).target_key.unwrap();
        let source_key = engine.cache().get(crate_part).source_key.unwrap();
        let target_frame = snap_frame(&engine, &scene, floor, &target_key);
        let source_frame = snap_frame(&engine, &scene, crate_part, &source_key);

        let gap = source_frame.translation().distance(target_frame.translation());
        assert!(gap < TOLERANCE, "{source_key}->{target_key} gap {gap}");
        assert!((source_frame.at() + target_frame.at()).length() < TOLERANCE);
        seen.insert((target_key, source_key));
    }
    assert_eq!(seen.len(), 4);
}

#[test]
fn test_cycle_round_trip_returns_to_start() {
    let mut engine = engine();
    let mut scene = Scene::default();
    let floor = place(&mut scene, "F_FLOOR", Transform::IDENTITY);
    let crate_part = place(&mut scene, "CRATE", Transform::IDENTITY);

    engine.align(&mut scene, crate_part, floor, SnapCycle::none()).unwrap();
    let start = world_of(&scene, crate_part);

    engine.align(&mut scene, crate_part, floor, SnapCycle::next_source()).unwrap();
    assert!(!world_of(&scene, crate_part).approx_eq(&start, TOLERANCE));
    engine.align(&mut scene, crate_part, floor, SnapCycle::next_source()).unwrap();
    assert!(world_of(&scene, crate_part).approx_eq(&start, TOLERANCE));

    engine.align(&mut scene, crate_part, floor, SnapCycle::next_target()).unwrap();
    engine.align(&mut scene, crate_part, floor, SnapCycle::prev_target()).unwrap();
    assert!(world_of(&scene, crate_part).approx_eq(&start, TOLERANCE));
}

#[test]
fn test_identical_walls_chain_in_a_straight_line() {
    let mut engine = engine();
    let mut scene = Scene::default();
    let a = place(&mut scene, "W_WALL", Transform::IDENTITY);
    let b = place(&mut scene, "W_WALL", posed(30.0, 1.0, 2.0, 1.3));
    let c = place(&mut scene, "W_WALL_WINDOW", posed(-7.0, 0.0, 5.0, -0.4));

    assert!(engine.align(&mut scene, b, a, SnapCycle::none()).unwrap());
    assert!(engine.align(&mut scene, c, b, SnapCycle::none()).unwrap());

    let positions: Vec<DVec3> = [a, b, c]
        .iter()
        .map(|id| world_of(&scene, *id).translation())
        .collect();
    assert!(positions[1].distance(DVec3::new(4.0, 0.0, 0.0)) < TOLERANCE);
    assert!(positions[2].distance(DVec3::new(8.0, 0.0, 0.0)) < TOLERANCE);

    // Neighboring faces touch, and every segment keeps the same heading
    for (left, right) in [(a, b), (b, c)] {
        let gap = snap_frame(&engine, &scene, left, "RIGHT")
            .translation()
            .distance(snap_frame(&engine, &scene, right, "LEFT").translation());
        assert!(gap < TOLERANCE);
        assert!((world_of(&scene, right).at() - DVec3::Z).length() < TOLERANCE);
    }
}

#[test]
fn test_next_target_chain_is_straight() {
    let mut engine = engine();
    let mut scene = Scene::default();
    let first = place(&mut scene, "F_FENCE", at(0.0, 0.0, 3.0));
    let second = place(&mut scene, "F_FENCE", posed(12.0, 0.0, -5.0, 0.8));
    let third = place(&mut scene, "F_FENCE", posed(-3.0, 2.0, 1.0, 2.4));

    assert!(engine.align(&mut scene, second, first, SnapCycle::next_target()).unwrap());
    assert!(engine.align(&mut scene, third, second, SnapCycle::next_target()).unwrap());

    for (id, x) in [(first, 0.0), (second, 4.0), (third, 8.0)] {
        let position = world_of(&scene, id).translation();
        assert!(position.distance(DVec3::new(x, 0.0, 3.0)) < TOLERANCE, "{position}");
        assert!((world_of(&scene, id).at() - DVec3::Z).length() < TOLERANCE);
    }
}

#[test]
fn test_cycling_target_face_keeps_chain_continuous() {
    let mut engine = engine();
    let mut scene = Scene::default();
    let a = place(&mut scene, "W_WALL", Transform::IDENTITY);
    let b = place(&mut scene, "W_WALL", Transform::IDENTITY);
    let d = place(&mut scene, "W_WALL", at(0.0, 0.0, 9.0));

    engine.align(&mut scene, b, a, SnapCycle::none()).unwrap();
    // d remembers LEFT as its source key from an earlier snap
    engine.align(&mut scene, d, b, SnapCycle::none()).unwrap();
    assert_eq!(engine.cache().get(d).source_key.as_deref(), Some("LEFT"));

    // Cycling a's face from RIGHT to LEFT forces d onto LEFT's opposite,
    // overriding the remembered key
    assert!(engine.align(&mut scene, d, a, SnapCycle::next_target()).unwrap());
    assert_eq!(engine.cache().get(a).target_key.as_deref(), Some("LEFT"));
    assert_eq!(engine.cache().get(d).source_key.as_deref(), Some("RIGHT"));
    assert!(world_of(&scene, d).translation().distance(DVec3::new(-4.0, 0.0, 0.0)) < TOLERANCE);

    let gap = snap_frame(&engine, &scene, a, "LEFT")
        .translation()
        .distance(snap_frame(&engine, &scene, d, "RIGHT").translation());
    assert!(gap < TOLERANCE);
}

#[test]
fn test_repeated_align_is_idempotent() {
    let mut engine = engine();
    let mut scene = Scene::default();
    let floor = place(&mut scene, "F_FLOOR", posed(1.0, 2.0, 3.0, 0.9));
    let crate_part = place(&mut scene, "CRATE", Transform::IDENTITY);

    engine.align(&mut scene, crate_part, floor, SnapCycle::next_source()).unwrap();
    let first = world_of(&scene, crate_part);
    for _ in 0..5 {
        engine.align(&mut scene, crate_part, floor, SnapCycle::none()).unwrap();
        assert!(world_of(&scene, crate_part).approx_eq(&first, 1e-12));
    }
}

#[test]
fn test_fallback_is_pure_coincidence() {
    let mut engine = engine();
    let mut scene = Scene::default();
    let floor_world = posed(4.0, -1.0, 0.5, 0.7);
    let floor = place(&mut scene, "F_FLOOR", floor_world);
    let wall_world = posed(-2.0, 0.0, 8.0, -1.1);
    let wall = place(&mut scene, "W_WALL", wall_world);
    let plant = place(&mut scene, "PLANT", at(9.0, 9.0, 9.0));
    let mystery = place(&mut scene, "UNREGISTERED", at(1.0, 1.0, 1.0));
    let crate_part = place(&mut scene, "CRATE", at(5.0, 5.0, 5.0));

    // no group at all
    assert!(!engine.align(&mut scene, mystery, floor, SnapCycle::none()).unwrap());
    assert_eq!(world_of(&scene, mystery), floor_world);

    // group without pairing
    assert!(!engine.align(&mut scene, plant, floor, SnapCycle::none()).unwrap());
    assert_eq!(world_of(&scene, plant), floor_world);

    // pairing declared in the other direction only
    assert!(!engine.align(&mut scene, floor, crate_part, SnapCycle::none()).unwrap());
    assert_eq!(world_of(&scene, floor), world_of(&scene, crate_part));

    // pairing whose target key names no snap point
    assert!(!engine.align(&mut scene, crate_part, wall, SnapCycle::none()).unwrap());
    assert_eq!(world_of(&scene, crate_part), wall_world);
    let state = engine.cache().get(crate_part);
    assert_eq!(state.source_key, None);
    assert_eq!(state.snapped_to, Some(wall));
}

#[test]
fn test_stale_cached_key_falls_back_to_default() {
    let mut engine = engine();
    let mut scene = Scene::default();
    let floor = place(&mut scene, "F_FLOOR", Transform::IDENTITY);
    let crate_part = place(&mut scene, "CRATE", Transform::IDENTITY);
    let wall = place(&mut scene, "W_WALL", Transform::IDENTITY);

    engine.align(&mut scene, crate_part, floor, SnapCycle::none()).unwrap();
    assert_eq!(engine.cache().get(floor).target_key.as_deref(), Some("TOP"));

    // TOP is not offered to walls; SIDE is used instead
    assert!(engine.align(&mut scene, wall, floor, SnapCycle::none()).unwrap());
    assert_eq!(engine.cache().get(floor).target_key.as_deref(), Some("SIDE"));
    let gap = snap_frame(&engine, &scene, floor, "SIDE")
        .translation()
        .distance(snap_frame(&engine, &scene, wall, "LEFT").translation());
    assert!(gap < TOLERANCE);
}

#[test]
fn test_connectivity_is_symmetric() {
    let engine = engine();
    let mut scene = Scene::default();
    let ids = [
        place(&mut scene, "U_POWERLINE", at(0.0, 0.0, 0.0)),
        place(&mut scene, "POWER_CONTROL", at(0.0, 0.0, 1.02)),
        place(&mut scene, "POWER_CONTROL", at(0.03, 0.0, 0.0)),
        place(&mut scene, "U_GENERATOR_S", at(0.0, -1.0, 1.0)),
        place(&mut scene, "POWER_CONTROL", at(4.0, 0.0, 0.0)),
        place(&mut scene, "F_FLOOR", at(0.0, 0.0, 0.0)),
    ];

    for a in ids {
        for b in ids {
            if a == b {
                continue;
            }
            let a_sees_b = engine.connected(&scene, a, "POWER").contains(&b);
            let b_sees_a = engine.connected(&scene, b, "POWER").contains(&a);
            assert_eq!(a_sees_b, b_sees_a);
        }
    }
    assert_eq!(engine.connected(&scene, ids[1], "POWER"), vec![ids[0], ids[3]]);
    // floors have no power points
    assert!(engine.connected(&scene, ids[5], "POWER").is_empty());
    assert_eq!(engine.connected(&scene, ids[5], "").len(), 0);
}

#[test]
fn test_lone_control_floats_until_wired_to_an_object() {
    let mut engine = engine();
    let mut scene = Scene::default();
    let control = place(&mut scene, "POWER_CONTROL", at(10.0, 0.0, 0.0));
    let generator = place(&mut scene, "U_GENERATOR_S", posed(-3.0, 0.0, 2.0, 0.5));

    assert!(engine.is_floating(&scene, control));
    assert_eq!(engine.floating_controls(&scene), vec![control]);

    assert!(engine.align(&mut scene, control, generator, SnapCycle::none()).unwrap());
    assert!(!engine.is_floating(&scene, control));
    assert!(engine.floating_controls(&scene).is_empty());
    assert!(!engine.is_floating(&scene, generator));
}

#[test]
fn test_control_floats_until_joined_to_another_wire_end() {
    let mut engine = engine();
    let mut scene = Scene::default();
    let line = place(&mut scene, "U_POWERLINE", at(5.0, 0.0, 0.0));
    let line_end = place(&mut scene, "POWER_CONTROL", at(5.0, 0.0, 1.0));
    let lone = place(&mut scene, "POWER_CONTROL", at(-8.0, 0.0, 0.0));

    // a wire end touching only its own line goes nowhere
    assert!(engine.is_floating(&scene, line_end));
    assert!(engine.is_floating(&scene, lone));

    assert!(engine.align(&mut scene, lone, line_end, SnapCycle::none()).unwrap());
    assert!(world_of(&scene, lone).translation().distance(DVec3::new(5.0, 0.0, 1.0)) < TOLERANCE);
    assert!(!engine.is_floating(&scene, lone));
    assert!(!engine.is_floating(&scene, line_end));
    assert!(!engine.is_floating(&scene, line));
}

#[test]
fn test_closest_snap_points_between_parts() {
    let engine = engine();
    let mut scene = Scene::default();
    let left = place(&mut scene, "W_WALL", at(0.0, 0.0, 0.0));
    let right = place(&mut scene, "W_WALL", at(6.0, 0.0, 0.0));

    let keys = engine.connectivity().closest_snap_points(
        scene.get_part(left).unwrap(),
        scene.get_part(right).unwrap(),
        "",
        "",
    );
    assert_eq!(keys, Some(("RIGHT".to_string(), "LEFT".to_string())));
}
