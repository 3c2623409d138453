use glam::DVec3;
use crate::camera::Ray;
use super::*;

fn approx(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}

// ============================================================================
// CONVERSIONS
// ============================================================================

#[test]
fn test_equator_prime_meridian_is_on_x_axis() {
    let p = WGS84.from_degrees(0.0, 0.0, 0.0);
    assert!(approx(p.x, 6_378_137.0, 1e-6));
    assert!(approx(p.y, 0.0, 1e-6));
    assert!(approx(p.z, 0.0, 1e-6));
}

#[test]
fn test_north_pole_uses_polar_radius() {
    let p = WGS84.from_degrees(0.0, 90.0, 0.0);
    assert!(approx(p.z, 6_356_752.314_245_179_3, 1e-6));
}

#[test]
fn test_cartesian_cartographic_inverse() {
    let samples = [
        (116.39, 39.91, 0.0),
        (-73.98, 40.75, 1200.5),
        (151.2, -33.87, -35.0),
        (0.0, 89.5, 10.0),
    ];
    for (lon, lat, h) in samples {
        let p = WGS84.from_degrees(lon, lat, h);
        let c = WGS84.cartesian_to_cartographic(p).unwrap();
        assert!(approx(c.longitude_degrees(), lon, 1e-9), "lon {}", lon);
        assert!(approx(c.latitude_degrees(), lat, 1e-9), "lat {}", lat);
        assert!(approx(c.height, h, 1e-4), "height {} vs {}", c.height, h);
    }
}

#[test]
fn test_center_has_no_cartographic() {
    assert!(WGS84.cartesian_to_cartographic(DVec3::ZERO).is_none());
}

#[test]
fn test_scale_to_surface_lands_on_surface() {
    let p = WGS84.from_degrees(45.0, 45.0, 10_000.0);
    let s = WGS84.scale_to_geodetic_surface(p).unwrap();
    let r = WGS84.radii();
    let f = (s.x / r.x).powi(2) + (s.y / r.y).powi(2) + (s.z / r.z).powi(2);
    assert!(approx(f, 1.0, 1e-10));
    assert!(approx((p - s).length(), 10_000.0, 1e-4));
}

#[test]
fn test_surface_normal_is_unit() {
    let p = WGS84.from_degrees(30.0, 60.0, 0.0);
    let n = WGS84.geodetic_surface_normal(p).unwrap();
    assert!(approx(n.length(), 1.0, 1e-12));
    assert!(WGS84.geodetic_surface_normal(DVec3::ZERO).is_none());
}

#[test]
fn test_grown_ellipsoid_adds_height() {
    let grown = WGS84.grown(100.0);
    assert_eq!(grown.radii(), WGS84.radii() + DVec3::splat(100.0));
}

// ============================================================================
// RAY INTERSECTION
// ============================================================================

#[test]
fn test_ray_from_outside_hits_near_side() {
    let ray = Ray::new(DVec3::new(10_000_000.0, 0.0, 0.0), DVec3::NEG_X);
    let (start, stop) = WGS84.intersect_ray(&ray).unwrap();
    assert!(approx(start, 10_000_000.0 - 6_378_137.0, 1e-6));
    assert!(approx(stop, 10_000_000.0 + 6_378_137.0, 1e-6));

    let hit = WGS84.pick_ray(&ray).unwrap();
    assert!(approx(hit.x, 6_378_137.0, 1e-6));
}

#[test]
fn test_ray_pointing_away_misses() {
    let ray = Ray::new(DVec3::new(10_000_000.0, 0.0, 0.0), DVec3::X);
    assert!(WGS84.intersect_ray(&ray).is_none());
}

#[test]
fn test_ray_passing_beside_misses() {
    let ray = Ray::new(DVec3::new(10_000_000.0, 7_000_000.0, 0.0), DVec3::NEG_X);
    assert!(WGS84.pick_ray(&ray).is_none());
}

#[test]
fn test_ray_from_inside_starts_at_zero() {
    let ray = Ray::new(DVec3::ZERO, DVec3::Y);
    let (start, stop) = WGS84.intersect_ray(&ray).unwrap();
    assert_eq!(start, 0.0);
    assert!(approx(stop, 6_378_137.0, 1e-6));
}

// ============================================================================
// FRAMES
// ============================================================================

#[test]
fn test_east_north_up_at_equator() {
    let origin = WGS84.from_degrees(0.0, 0.0, 0.0);
    let enu = WGS84.east_north_up(origin);
    assert!((enu.x_axis - DVec3::Y).length() < 1e-12);
    assert!((enu.y_axis - DVec3::Z).length() < 1e-12);
    assert!((enu.z_axis - DVec3::X).length() < 1e-12);
}

#[test]
fn test_heading_pitch_roll_zero_points_east() {
    let origin = WGS84.from_degrees(0.0, 0.0, 0.0);
    let q = WGS84.heading_pitch_roll_quaternion(origin, &HeadingPitchRoll::default());
    let forward = q * DVec3::X;
    assert!((forward - DVec3::Y).length() < 1e-9);
}

#[test]
fn test_heading_ninety_turns_clockwise_to_south() {
    let origin = WGS84.from_degrees(0.0, 0.0, 0.0);
    let q = WGS84.heading_pitch_roll_quaternion(origin, &HeadingPitchRoll::from_degrees(90.0, 0.0, 0.0));
    let forward = q * DVec3::X;
    assert!((forward - DVec3::NEG_Z).length() < 1e-9);
}

#[test]
fn test_rotation_from_velocity_follows_velocity() {
    let origin = WGS84.from_degrees(0.0, 0.0, 0.0);
    let velocity = DVec3::new(0.0, 0.0, 3.0);
    let q = WGS84.rotation_from_position_velocity(origin, velocity).unwrap();
    assert!((q * DVec3::X - DVec3::Z).length() < 1e-9);
    assert!((q * DVec3::Z - DVec3::X).length() < 1e-9);
    assert!(WGS84.rotation_from_position_velocity(origin, DVec3::ZERO).is_none());
}
