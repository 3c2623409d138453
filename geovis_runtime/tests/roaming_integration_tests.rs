//! Integration tests for path roaming over the mock scene
//!
//! Run with: cargo test --test roaming_integration_tests

use geovis_runtime::geovis::geodesy::WGS84;
use geovis_runtime::geovis::host::{MockScene, SceneHandle, SceneHost, SceneTime, SurfaceMaterial};
use geovis_runtime::geovis::material::{
    AnimatedMaterial, FixedWallClock, MaterialRegistry, PolylineTrailOptions,
};
use geovis_runtime::geovis::roaming::{
    ModelRoamingOptions, RoamingController, RoamingOptions, RoamingState, RoamingTarget,
    TerrainElevation, TrailOptions, ViewMode,
};
use geovis_runtime::glam::DVec3;
use std::sync::{Arc, Mutex};

fn scene() -> (Arc<Mutex<MockScene>>, SceneHandle) {
    let mock = MockScene::new().shared();
    let handle: SceneHandle = mock.clone();
    (mock, handle)
}

fn route() -> Vec<DVec3> {
    (0..5)
        .map(|i| WGS84.from_degrees(116.39 + 0.005 * i as f64, 39.9, 150.0))
        .collect()
}

fn run_frames(mock: &Arc<Mutex<MockScene>>, count: usize, dt: f64) {
    for _ in 0..count {
        mock.lock().unwrap().render_frame(dt);
    }
}

#[test]
fn test_integration_model_roaming_lifecycle() {
    let (mock, handle) = scene();

    let mut registry = MaterialRegistry::new();
    let trail_material = AnimatedMaterial::with_clock(
        PolylineTrailOptions::default(),
        &mut registry,
        Arc::new(FixedWallClock::new(0.0)),
    );
    let target = RoamingTarget::Model(ModelRoamingOptions {
        trail: Some(TrailOptions {
            width: 3.0,
            material: SurfaceMaterial::Animated(Arc::new(Mutex::new(trail_material))),
        }),
        ..ModelRoamingOptions::default()
    });

    let options = RoamingOptions {
        start_time: Some(SceneTime(1000.0)),
        multiplier: 2.0,
        ..RoamingOptions::default()
    };
    let mut roaming = RoamingController::new(handle, options);
    let progress = Arc::new(Mutex::new(Vec::new()));
    let sink = progress.clone();
    roaming.on_telemetry(move |t| sink.lock().unwrap().push(t.progress));

    roaming.start(&route(), 40.0, target).unwrap();
    assert_eq!(roaming.state(), RoamingState::Running);

    run_frames(&mock, 10, 1.0);

    let seen = progress.lock().unwrap().clone();
    assert_eq!(seen.len(), 10);
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert!((seen[9] - 0.5).abs() < 1e-9);
    assert_eq!(roaming.trail_positions().len(), 10);

    // Clamped clock: the model parks on the last point
    run_frames(&mock, 20, 1.0);
    let telemetry = roaming.telemetry().unwrap();
    assert_eq!(telemetry.progress, 1.0);
    assert!((telemetry.longitude - 116.41).abs() < 1e-9);
    assert_eq!(telemetry.elapsed_text(), "40 s");

    roaming.change_view(ViewMode::Track).unwrap();
    roaming.stop();

    let scene = mock.lock().unwrap();
    assert_eq!(scene.entity_count(), 0);
    assert_eq!(scene.hook_count(), 0);
    assert!(!scene.clock().should_animate);
}

#[test]
fn test_integration_looped_camera_roaming_wraps() {
    let (mock, handle) = scene();
    let options = RoamingOptions {
        start_time: Some(SceneTime(0.0)),
        looped: true,
        ..RoamingOptions::default()
    };
    let mut roaming = RoamingController::new(handle, options);
    roaming.start(&route(), 20.0, RoamingTarget::Camera).unwrap();

    run_frames(&mock, 25, 1.0);

    let scene = mock.lock().unwrap();
    // Frame 21 wraps to the start, four more frames follow
    assert_eq!(scene.clock().current_time, SceneTime(4.0));
    let entity = roaming.entity().unwrap();
    assert_eq!(scene.tracked_entity(), Some(entity));
}

#[test]
fn test_integration_ground_clamped_model_follows_terrain() {
    let (mock, handle) = scene();
    mock.lock().unwrap().set_terrain_height(25.0);

    let options = RoamingOptions {
        start_time: Some(SceneTime(0.0)),
        terrain: TerrainElevation::Available,
        ..RoamingOptions::default()
    };
    let target = RoamingTarget::Model(ModelRoamingOptions {
        clamp_to_ground: true,
        ..ModelRoamingOptions::default()
    });
    let mut roaming = RoamingController::new(handle, options);
    roaming.start(&route(), 40.0, target).unwrap();

    run_frames(&mock, 12, 0.5);

    let telemetry = roaming.telemetry().unwrap();
    assert_eq!(telemetry.terrain_height, 25.0);
    let grounded = roaming
        .path_samples()
        .iter()
        .filter(|s| (WGS84.cartesian_to_cartographic(s.position).unwrap().height - 25.0).abs() < 0.01)
        .count();
    assert!(grounded >= 10);
}
