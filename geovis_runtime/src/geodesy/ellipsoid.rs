/// Ellipsoid: conversions between ECEF positions and geodetic coordinates,
/// surface normals, local frames and ray intersection.

use glam::{DMat3, DQuat, DVec3};
use crate::camera::Ray;
use super::cartographic::{Cartographic, HeadingPitchRoll};

/// Points closer to the center than this (in scaled units) have no reliable
/// geodetic projection.
const CENTER_TOLERANCE_SQUARED: f64 = 0.1;
const SURFACE_EPSILON: f64 = 1e-12;
const MAX_NEWTON_ITERATIONS: usize = 64;

/// Triaxial ellipsoid centered at the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ellipsoid {
    radii: DVec3,
    radii_squared: DVec3,
    one_over_radii: DVec3,
    one_over_radii_squared: DVec3,
}

/// The WGS84 reference ellipsoid.
pub const WGS84: Ellipsoid = Ellipsoid::from_radii_const(6_378_137.0, 6_378_137.0, 6_356_752.314_245_179_3);

impl Ellipsoid {
    const fn from_radii_const(x: f64, y: f64, z: f64) -> Self {
        Self {
            radii: DVec3::new(x, y, z),
            radii_squared: DVec3::new(x * x, y * y, z * z),
            one_over_radii: DVec3::new(1.0 / x, 1.0 / y, 1.0 / z),
            one_over_radii_squared: DVec3::new(1.0 / (x * x), 1.0 / (y * y), 1.0 / (z * z)),
        }
    }

    /// Create an ellipsoid from its three radii.
    pub fn new(radii: DVec3) -> Self {
        Self::from_radii_const(radii.x, radii.y, radii.z)
    }

    /// Same shape grown by `height` meters along every axis.
    ///
    /// Used to approximate a flat terrain layer at constant elevation.
    pub fn grown(&self, height: f64) -> Self {
        Self::new(self.radii + DVec3::splat(height))
    }

    pub fn radii(&self) -> DVec3 {
        self.radii
    }

    pub fn maximum_radius(&self) -> f64 {
        self.radii.max_element()
    }

    /// Unit normal of the surface at `position`, perpendicular to the
    /// tangent plane (not the direction to the center).
    pub fn geodetic_surface_normal(&self, position: DVec3) -> Option<DVec3> {
        let n = position * self.one_over_radii_squared;
        n.try_normalize()
    }

    /// Surface normal from geodetic longitude/latitude.
    pub fn geodetic_surface_normal_cartographic(&self, carto: &Cartographic) -> DVec3 {
        let cos_lat = carto.latitude.cos();
        DVec3::new(
            cos_lat * carto.longitude.cos(),
            cos_lat * carto.longitude.sin(),
            carto.latitude.sin(),
        )
        .normalize()
    }

    /// Geodetic coordinates to ECEF.
    pub fn cartographic_to_cartesian(&self, carto: &Cartographic) -> DVec3 {
        let n = self.geodetic_surface_normal_cartographic(carto);
        let k = self.radii_squared * n;
        let gamma = n.dot(k).sqrt();
        k / gamma + n * carto.height
    }

    /// Convenience: degrees + meters to ECEF.
    pub fn from_degrees(&self, longitude: f64, latitude: f64, height: f64) -> DVec3 {
        self.cartographic_to_cartesian(&Cartographic::from_degrees(longitude, latitude, height))
    }

    /// ECEF to geodetic coordinates. `None` near the center of the ellipsoid.
    pub fn cartesian_to_cartographic(&self, position: DVec3) -> Option<Cartographic> {
        let surface = self.scale_to_geodetic_surface(position)?;
        let n = self.geodetic_surface_normal(surface)?;
        let h = position - surface;

        let longitude = n.y.atan2(n.x);
        let latitude = n.z.clamp(-1.0, 1.0).asin();
        let height = h.dot(position).signum() * h.length();

        Some(Cartographic::new(longitude, latitude, height))
    }

    /// Project `position` onto the surface along the geodetic normal.
    ///
    /// Newton iteration on the ellipsoid equation; `None` for positions at
    /// (or numerically at) the center.
    pub fn scale_to_geodetic_surface(&self, position: DVec3) -> Option<DVec3> {
        let inv2 = self.one_over_radii_squared;

        let x2 = position.x * position.x * inv2.x;
        let y2 = position.y * position.y * inv2.y;
        let z2 = position.z * position.z * inv2.z;

        let squared_norm = x2 + y2 + z2;
        let ratio = (1.0 / squared_norm).sqrt();
        let intersection = position * ratio;

        if squared_norm < CENTER_TOLERANCE_SQUARED {
            return if ratio.is_finite() { Some(intersection) } else { None };
        }

        let gradient = intersection * inv2 * 2.0;
        let mut lambda = (1.0 - ratio) * position.length() / (0.5 * gradient.length());
        let mut correction = 0.0;

        let mut multiplier = DVec3::ONE;
        for _ in 0..MAX_NEWTON_ITERATIONS {
            lambda -= correction;

            multiplier = DVec3::new(
                1.0 / (1.0 + lambda * inv2.x),
                1.0 / (1.0 + lambda * inv2.y),
                1.0 / (1.0 + lambda * inv2.z),
            );
            let m2 = multiplier * multiplier;
            let m3 = m2 * multiplier;

            let func = x2 * m2.x + y2 * m2.y + z2 * m2.z - 1.0;
            if func.abs() <= SURFACE_EPSILON {
                break;
            }

            let denominator = x2 * m3.x * inv2.x + y2 * m3.y * inv2.y + z2 * m3.z * inv2.z;
            let derivative = -2.0 * denominator;
            correction = func / derivative;
        }

        Some(position * multiplier)
    }

    /// Intersect a ray with the surface.
    ///
    /// Returns the (start, stop) ray parameters of the intersection interval.
    /// A ray starting inside the ellipsoid starts its interval at 0.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<(f64, f64)> {
        let q = self.one_over_radii * ray.origin;
        let w = self.one_over_radii * ray.direction;

        let q2 = q.length_squared();
        let qw = q.dot(w);
        let w2 = w.length_squared();

        if w2 == 0.0 {
            return None;
        }

        if q2 > 1.0 {
            // Outside: must point toward the ellipsoid
            if qw >= 0.0 {
                return None;
            }

            let difference = q2 - 1.0;
            let product = w2 * difference;
            let qw2 = qw * qw;

            if qw2 < product {
                None
            } else if qw2 > product {
                let discriminant = qw2 - product;
                let temp = -qw + discriminant.sqrt();
                let root0 = temp / w2;
                let root1 = difference / temp;
                Some((root0.min(root1), root0.max(root1)))
            } else {
                let root = (difference / w2).sqrt();
                Some((root, root))
            }
        } else if q2 < 1.0 {
            let difference = q2 - 1.0;
            let product = w2 * difference;
            let discriminant = qw * qw - product;
            let temp = -qw + discriminant.sqrt();
            Some((0.0, temp / w2))
        } else if qw < 0.0 {
            Some((0.0, -qw / w2))
        } else {
            None
        }
    }

    /// First surface point hit by the ray.
    pub fn pick_ray(&self, ray: &Ray) -> Option<DVec3> {
        self.intersect_ray(ray).map(|(start, _)| ray.point_at(start))
    }

    /// Local east-north-up frame at `origin` as matrix columns.
    pub fn east_north_up(&self, origin: DVec3) -> DMat3 {
        let up = self.geodetic_surface_normal(origin).unwrap_or(DVec3::Z);
        let east = DVec3::new(-origin.y, origin.x, 0.0)
            .try_normalize()
            .unwrap_or(DVec3::X);
        let north = up.cross(east);
        DMat3::from_cols(east, north, up)
    }

    /// World rotation for a heading/pitch/roll expressed in the local frame
    /// at `origin` (x forward = east at heading 0 rotated clockwise).
    pub fn heading_pitch_roll_quaternion(&self, origin: DVec3, hpr: &HeadingPitchRoll) -> DQuat {
        let frame = DQuat::from_mat3(&self.east_north_up(origin));
        let local = DQuat::from_rotation_z(-hpr.heading)
            * DQuat::from_rotation_y(-hpr.pitch)
            * DQuat::from_rotation_x(hpr.roll);
        frame * local
    }

    /// Rotation whose x axis follows `velocity` and whose z axis stays as
    /// close as possible to the local up at `position`.
    pub fn rotation_from_position_velocity(&self, position: DVec3, velocity: DVec3) -> Option<DQuat> {
        let x = velocity.try_normalize()?;
        let up = self.geodetic_surface_normal(position)?;
        let y = up.cross(x).try_normalize()?;
        let z = x.cross(y);
        Some(DQuat::from_mat3(&DMat3::from_cols(x, y, z)))
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        WGS84
    }
}

#[cfg(test)]
#[path = "ellipsoid_tests.rs"]
mod tests;
