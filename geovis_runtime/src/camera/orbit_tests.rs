use std::f64::consts::{FRAC_PI_2, PI};
use std::sync::{Arc, Mutex};
use super::*;
use crate::geodesy::{HeadingPitchRange, WGS84};
use crate::host::MockScene;

fn angle_diff(a: f64, b: f64) -> f64 {
    ((a - b + PI).rem_euclid(TAU) - PI).abs()
}

/// Camera 1 km from a ground target, looking at it from the south at -45°.
fn setup() -> (Arc<Mutex<MockScene>>, SceneHandle, DVec3) {
    let target = WGS84.from_degrees(116.39, 39.9, 0.0);
    let mut scene = MockScene::new();
    scene.look_at(target, HeadingPitchRange::from_degrees(0.0, -45.0, 1000.0)).unwrap();
    scene.clock_mut().should_animate = true;

    let mock = scene.shared();
    let handle: SceneHandle = mock.clone();
    (mock, handle, target)
}

#[test]
fn test_orbit_turns_with_clock_time() {
    let (mock, handle, target) = setup();
    let mut orbit = OrbitController::new(handle);
    orbit
        .start(OrbitOptions { center: Some(target), distance: Some(1000.0), period: 40.0 })
        .unwrap();

    mock.lock().unwrap().render_frame(10.0);

    let scene = mock.lock().unwrap();
    let camera = scene.camera();
    let camera_carto = WGS84.cartesian_to_cartographic(camera.position).unwrap();
    let target_carto = WGS84.cartesian_to_cartographic(target).unwrap();

    assert!((camera.position.distance(target) - 1000.0).abs() < 1e-3);
    // A quarter turn: looking east, so standing west of the target
    assert!(camera_carto.longitude < target_carto.longitude);
    assert!((camera_carto.latitude - target_carto.latitude).abs() < 1e-5);
    assert!(angle_diff(camera.heading_pitch_roll(&WGS84).heading, FRAC_PI_2) < 0.01);
}

#[test]
fn test_orbit_holds_still_on_paused_clock() {
    let (mock, handle, target) = setup();
    mock.lock().unwrap().clock_mut().should_animate = false;
    let before = mock.lock().unwrap().camera().position;

    let mut orbit = OrbitController::new(handle);
    orbit
        .start(OrbitOptions { center: Some(target), distance: Some(1000.0), period: 40.0 })
        .unwrap();
    mock.lock().unwrap().render_frame(10.0);

    let after = mock.lock().unwrap().camera().position;
    assert!(before.distance(after) < 1e-3);
}

#[test]
fn test_orbit_defaults_to_view_center() {
    let (mock, handle, target) = setup();
    let mut orbit = OrbitController::new(handle);
    orbit.start(OrbitOptions::default()).unwrap();

    mock.lock().unwrap().render_frame(15.0);

    let camera = mock.lock().unwrap().camera();
    assert!((camera.position.distance(target) - 1000.0).abs() < 0.01);
}

#[test]
fn test_restart_keeps_single_hook() {
    let (mock, handle, target) = setup();
    let mut orbit = OrbitController::new(handle);
    let options = OrbitOptions { center: Some(target), ..Default::default() };

    orbit.start(options).unwrap();
    orbit.start(options).unwrap();

    assert!(orbit.is_running());
    assert_eq!(mock.lock().unwrap().hook_count(), 1);
}

#[test]
fn test_stop_is_idempotent() {
    let (mock, handle, target) = setup();
    let mut orbit = OrbitController::new(handle);
    orbit.start(OrbitOptions { center: Some(target), ..Default::default() }).unwrap();

    orbit.stop();
    orbit.stop();

    assert!(!orbit.is_running());
    assert_eq!(mock.lock().unwrap().hook_count(), 0);
}

#[test]
fn test_stop_after_scene_destroyed() {
    let (mock, handle, target) = setup();
    let mut orbit = OrbitController::new(handle);
    orbit.start(OrbitOptions { center: Some(target), ..Default::default() }).unwrap();

    mock.lock().unwrap().destroy();
    orbit.stop();

    assert!(!orbit.is_running());
    assert!(orbit.start(OrbitOptions { center: Some(target), ..Default::default() }).is_err());
}

#[test]
fn test_spin_turns_in_place() {
    let (mock, handle, _) = setup();
    let before = mock.lock().unwrap().camera();
    let initial = before.heading_pitch_roll(&WGS84);

    let mut spin = SpinController::new(handle);
    spin.start(40.0).unwrap();
    mock.lock().unwrap().render_frame(10.0);

    let after = mock.lock().unwrap().camera();
    let turned = after.heading_pitch_roll(&WGS84);
    assert!(before.position.distance(after.position) < 1e-9);
    assert!(angle_diff(turned.heading, initial.heading + FRAC_PI_2) < 1e-6);
    assert!((turned.pitch - initial.pitch).abs() < 1e-6);

    spin.stop();
    assert_eq!(mock.lock().unwrap().hook_count(), 0);
}

#[test]
fn test_heading_at() {
    assert!((heading_at(0.0, 15.0, 60.0) - FRAC_PI_2).abs() < 1e-12);
    assert_eq!(valid_period(0.0), DEFAULT_PERIOD);
    assert_eq!(valid_period(-5.0), DEFAULT_PERIOD);
}
