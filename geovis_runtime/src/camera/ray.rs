/// Ray - origin plus unit direction, in ECEF meters.

use glam::DVec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    /// Unit length (zero only when built from a zero vector)
    pub direction: DVec3,
}

impl Ray {
    /// Create a ray; `direction` is normalized.
    pub fn new(origin: DVec3, direction: DVec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Ray from `origin` through `through`.
    pub fn between(origin: DVec3, through: DVec3) -> Self {
        Self::new(origin, through - origin)
    }

    /// Point at parameter `t` (meters along the ray).
    pub fn point_at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }
}
