//! Camera module - camera snapshots, rays and perspective frustums.
//!
//! The host owns the real camera. Engines read a `CameraState` copy,
//! compute rays or derived views from it, and push changes back through
//! the host.

mod camera_state;
mod frustum;
mod orbit;
mod ray;

pub use camera_state::CameraState;
pub use frustum::{
    PerspectiveFrustum, FrustumPlanes,
    PLANE_LEFT, PLANE_RIGHT, PLANE_BOTTOM, PLANE_TOP, PLANE_NEAR, PLANE_FAR,
};
pub use orbit::{OrbitController, OrbitOptions, SpinController};
pub use ray::Ray;
