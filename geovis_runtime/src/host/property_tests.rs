use std::sync::{Arc, Mutex};
use glam::DVec3;
use crate::geodesy::WGS84;
use super::*;

struct Linear;

impl PositionProvider for Linear {
    fn position_at(&self, time: SceneTime) -> Option<DVec3> {
        if time.0 < 0.0 || time.0 > 10.0 {
            return None;
        }
        Some(WGS84.from_degrees(0.0, 0.0, 0.0) + DVec3::Z * time.0 * 2.0)
    }
}

// ============================================================================
// Property<T>
// ============================================================================

#[test]
fn test_constant_property() {
    let p = Property::constant(3.0);
    assert_eq!(p.value(SceneTime(10.0)), 3.0);
    assert!(p.is_constant());
}

#[test]
fn test_callback_property_evaluates_each_time() {
    let p = Property::callback(|t: SceneTime| t.0 * 2.0);
    assert_eq!(p.value(SceneTime(1.5)), 3.0);
    assert_eq!(p.value(SceneTime(4.0)), 8.0);
    assert!(!p.is_constant());
}

#[test]
fn test_property_equality() {
    assert_eq!(Property::constant(1), Property::from(1));
    assert_ne!(Property::constant(1), Property::constant(2));

    let cb: Property<i32> = Property::callback(|_| 1);
    assert_eq!(cb, cb.clone());
    assert_ne!(cb, Property::callback(|_| 1));
    assert_ne!(cb, Property::constant(1));
}

// ============================================================================
// PositionSource
// ============================================================================

#[test]
fn test_provider_behind_mutex() {
    let shared = Arc::new(Mutex::new(Linear));
    let source = PositionSource::Provider(shared);
    assert!(source.value(SceneTime(5.0)).is_some());
    assert!(source.value(SceneTime(11.0)).is_none());
}

#[test]
fn test_velocity_forward_and_backward_difference() {
    let source = PositionSource::Provider(Arc::new(Linear));
    let v = source.velocity(SceneTime(5.0)).unwrap();
    assert!((v - DVec3::new(0.0, 0.0, 2.0)).length() < 1e-6);

    // At the end of the domain only the backward difference exists
    let v_end = source.velocity(SceneTime(10.0)).unwrap();
    assert!((v_end - DVec3::new(0.0, 0.0, 2.0)).length() < 1e-6);
}

#[test]
fn test_constant_position_has_zero_velocity() {
    let source = PositionSource::Constant(DVec3::X);
    assert_eq!(source.velocity(SceneTime(0.0)), Some(DVec3::ZERO));
}

// ============================================================================
// OrientationSource
// ============================================================================

#[test]
fn test_velocity_orientation_points_along_motion() {
    let source = PositionSource::Provider(Arc::new(Linear));
    let orientation = OrientationSource::Velocity(source);
    let q = orientation.value(&WGS84, SceneTime(2.0)).unwrap();
    assert!((q * DVec3::X - DVec3::Z).length() < 1e-6);
}

#[test]
fn test_velocity_orientation_undefined_when_still() {
    let orientation = OrientationSource::Velocity(PositionSource::Constant(DVec3::X * 7.0e6));
    assert!(orientation.value(&WGS84, SceneTime(0.0)).is_none());
}
