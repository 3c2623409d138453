/// Perspective frustum description and its six clipping planes.
///
/// Each plane is a DVec4 (A, B, C, D) where:
/// - (A, B, C) is the inward-pointing unit normal
/// - D is the signed distance
/// - A point P is inside when dot(plane, P_homogeneous) >= 0 for all planes

use glam::{DMat4, DVec3, DVec4};

/// Frustum plane indices
pub const PLANE_LEFT: usize = 0;
pub const PLANE_RIGHT: usize = 1;
pub const PLANE_BOTTOM: usize = 2;
pub const PLANE_TOP: usize = 3;
pub const PLANE_NEAR: usize = 4;
pub const PLANE_FAR: usize = 5;

/// Symmetric perspective frustum.
///
/// `fov` is the vertical field of view in radians. Used both for the
/// host camera and for light cameras (viewshed, shadow maps).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveFrustum {
    pub fov: f64,
    pub aspect_ratio: f64,
    pub near: f64,
    pub far: f64,
}

impl Default for PerspectiveFrustum {
    fn default() -> Self {
        Self {
            fov: 60f64.to_radians(),
            aspect_ratio: 1.0,
            near: 1.0,
            far: 500_000_000.0,
        }
    }
}

impl PerspectiveFrustum {
    pub fn new(fov: f64, aspect_ratio: f64, near: f64, far: f64) -> Self {
        Self { fov, aspect_ratio, near, far }
    }

    /// Horizontal field of view derived from `fov` and the aspect ratio.
    pub fn horizontal_fov(&self) -> f64 {
        2.0 * ((self.fov * 0.5).tan() * self.aspect_ratio).atan()
    }

    /// OpenGL-style projection (clip z in [-w, w]), matching the plane
    /// extraction below.
    pub fn projection_matrix(&self) -> DMat4 {
        DMat4::perspective_rh_gl(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// The eight corners in world space for a camera at `position` looking
    /// along `direction`: near ring first (bl, br, tr, tl), then far ring.
    pub fn corners(&self, position: DVec3, direction: DVec3, up: DVec3) -> [DVec3; 8] {
        let right = direction.cross(up).normalize_or_zero();
        let up = right.cross(direction).normalize_or_zero();
        let tan_y = (self.fov * 0.5).tan();
        let tan_x = tan_y * self.aspect_ratio;

        let ring = |distance: f64| {
            let center = position + direction * distance;
            let dx = right * (distance * tan_x);
            let dy = up * (distance * tan_y);
            [center - dx - dy, center + dx - dy, center + dx + dy, center - dx + dy]
        };

        let near = ring(self.near);
        let far = ring(self.far);
        [near[0], near[1], near[2], near[3], far[0], far[1], far[2], far[3]]
    }
}

/// Six frustum planes for point and sphere tests.
#[derive(Debug, Clone, Copy)]
pub struct FrustumPlanes {
    /// Frustum planes: left, right, bottom, top, near, far
    pub planes: [DVec4; 6],
}

impl FrustumPlanes {
    /// Extract frustum planes from a view-projection matrix.
    ///
    /// Gribb & Hartmann method, for projections with clip z in [-w, w].
    pub fn from_view_projection(vp: &DMat4) -> Self {
        let row0 = vp.row(0);
        let row1 = vp.row(1);
        let row2 = vp.row(2);
        let row3 = vp.row(3);

        let mut planes = [
            row3 + row0, // left
            row3 - row0, // right
            row3 + row1, // bottom
            row3 - row1, // top
            row3 + row2, // near
            row3 - row2, // far
        ];

        for plane in &mut planes {
            let normal_len = plane.truncate().length();
            if normal_len > 0.0 {
                *plane /= normal_len;
            }
        }

        Self { planes }
    }

    /// Signed distance from `point` to one plane (positive inside).
    pub fn distance(&self, plane: usize, point: DVec3) -> f64 {
        self.planes[plane].truncate().dot(point) + self.planes[plane].w
    }

    pub fn contains_point(&self, point: DVec3) -> bool {
        (0..6).all(|i| self.distance(i, point) >= 0.0)
    }

    /// Conservative sphere test: false only if the sphere is fully outside
    /// one plane.
    pub fn intersects_sphere(&self, center: DVec3, radius: f64) -> bool {
        (0..6).all(|i| self.distance(i, center) >= -radius)
    }
}

#[cfg(test)]
#[path = "frustum_tests.rs"]
mod tests;
