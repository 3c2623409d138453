/// CameraState - snapshot of the host camera.
///
/// Position and axes are ECEF. The state computes rays and projections;
/// it never moves on its own. Hosts hand out copies and accept updates
/// through `SceneHost::set_camera`.

use std::f64::consts::{FRAC_PI_2, TAU};
use glam::{DMat3, DMat4, DVec2, DVec3};
use crate::geodesy::{Ellipsoid, HeadingPitchRoll, zero_to_two_pi};
use super::frustum::PerspectiveFrustum;
use super::ray::Ray;

const VERTICAL_EPSILON: f64 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraState {
    pub position: DVec3,
    pub direction: DVec3,
    pub up: DVec3,
    pub right: DVec3,
    pub frustum: PerspectiveFrustum,
}

impl CameraState {
    /// Build an orthonormal camera from a view direction and an up hint.
    pub fn new(position: DVec3, direction: DVec3, up_hint: DVec3, frustum: PerspectiveFrustum) -> Self {
        let direction = direction.normalize_or_zero();
        let right = direction.cross(up_hint).try_normalize()
            .unwrap_or_else(|| direction.any_orthonormal_vector());
        let up = right.cross(direction);
        Self { position, direction, up, right, frustum }
    }

    /// Camera at `eye` looking at `target`.
    pub fn look_at(eye: DVec3, target: DVec3, up_hint: DVec3, frustum: PerspectiveFrustum) -> Self {
        Self::new(eye, target - eye, up_hint, frustum)
    }

    /// Camera at `position` oriented by heading/pitch/roll in the local
    /// east-north-up frame. Heading 0 looks north, pitch -90° looks down.
    pub fn from_heading_pitch_roll(
        ellipsoid: &Ellipsoid,
        position: DVec3,
        hpr: &HeadingPitchRoll,
        frustum: PerspectiveFrustum,
    ) -> Self {
        Self::oriented_in_frame(&ellipsoid.east_north_up(position), position, hpr, frustum)
    }

    /// Same as `from_heading_pitch_roll` with an explicit local frame
    /// (columns east, north, up), e.g. the frame of a look-at target.
    pub fn oriented_in_frame(
        frame: &DMat3,
        position: DVec3,
        hpr: &HeadingPitchRoll,
        frustum: PerspectiveFrustum,
    ) -> Self {
        let (sin_h, cos_h) = hpr.heading.sin_cos();
        let (sin_p, cos_p) = hpr.pitch.sin_cos();

        let d_local = DVec3::new(sin_h * cos_p, cos_h * cos_p, sin_p);
        let u_local = DVec3::new(-sin_h * sin_p, -cos_h * sin_p, cos_p);
        let r_local = d_local.cross(u_local);

        let (sin_r, cos_r) = hpr.roll.sin_cos();
        let u_rolled = u_local * cos_r + r_local * sin_r;
        let r_rolled = r_local * cos_r - u_local * sin_r;

        Self {
            position,
            direction: *frame * d_local,
            up: *frame * u_rolled,
            right: *frame * r_rolled,
            frustum,
        }
    }

    /// Heading/pitch/roll relative to the east-north-up frame at the
    /// camera position.
    pub fn heading_pitch_roll(&self, ellipsoid: &Ellipsoid) -> HeadingPitchRoll {
        let to_local: DMat3 = ellipsoid.east_north_up(self.position).transpose();
        let d = to_local * self.direction;
        let u = to_local * self.up;
        let r = to_local * self.right;

        let looking_vertically = (d.z.abs() - 1.0).abs() < VERTICAL_EPSILON;

        let raw_heading = if looking_vertically {
            u.y.atan2(u.x) - FRAC_PI_2
        } else {
            d.y.atan2(d.x) - FRAC_PI_2
        };
        let heading = (TAU - zero_to_two_pi(raw_heading)) % TAU;

        let pitch = FRAC_PI_2 - d.z.clamp(-1.0, 1.0).acos();

        let roll = if looking_vertically {
            0.0
        } else {
            zero_to_two_pi((-r.z).atan2(u.z) + TAU) % TAU
        };

        HeadingPitchRoll::new(heading, pitch, roll)
    }

    /// View matrix (world to camera).
    pub fn view_matrix(&self) -> DMat4 {
        DMat4::look_to_rh(self.position, self.direction, self.up)
    }

    /// Projection * view.
    pub fn view_projection_matrix(&self) -> DMat4 {
        self.frustum.projection_matrix() * self.view_matrix()
    }

    /// Ray from the camera through a canvas pixel (origin top-left).
    pub fn pick_ray(&self, pixel: DVec2, canvas: DVec2) -> Ray {
        let ndc_x = 2.0 * pixel.x / canvas.x - 1.0;
        let ndc_y = 1.0 - 2.0 * pixel.y / canvas.y;

        let tan_y = (self.frustum.fov * 0.5).tan();
        let tan_x = tan_y * (canvas.x / canvas.y);

        let direction = self.direction + self.right * (ndc_x * tan_x) + self.up * (ndc_y * tan_y);
        Ray::new(self.position, direction)
    }

    /// Canvas pixel of a world position. `None` behind the camera.
    pub fn project(&self, position: DVec3, canvas: DVec2) -> Option<DVec2> {
        let offset = position - self.position;
        let depth = offset.dot(self.direction);
        if depth <= 0.0 {
            return None;
        }

        let tan_y = (self.frustum.fov * 0.5).tan();
        let tan_x = tan_y * (canvas.x / canvas.y);

        let ndc_x = offset.dot(self.right) / (depth * tan_x);
        let ndc_y = offset.dot(self.up) / (depth * tan_y);

        Some(DVec2::new(
            (ndc_x + 1.0) * 0.5 * canvas.x,
            (1.0 - ndc_y) * 0.5 * canvas.y,
        ))
    }

    /// Move along the view direction away from what the camera looks at.
    pub fn move_backward(&mut self, amount: f64) {
        self.position -= self.direction * amount;
    }
}

#[cfg(test)]
#[path = "camera_state_tests.rs"]
mod tests;
