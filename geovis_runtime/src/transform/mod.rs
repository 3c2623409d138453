//! Transform module - screen/world/geodetic conversions against a live host.
//!
//! All queries are best-effort: a miss is `None` (or a documented default),
//! never an error.

mod coordinates;
mod position_marker;

pub use coordinates::{
    camera_parameters, cartesian_to_cartographic, cartesian_to_geodetic, center_target,
    pick_world_position, scene_center, view_bounds, viewport_extent,
    CameraParameters, Extent, Geodetic, LonLat, SceneCenter, ViewBounds,
    DEFAULT_EXTENT, UNDERGROUND_TOLERANCE,
};
pub use position_marker::{MarkerReadout, PositionMarker, PositionMarkerOptions, ScreenAnchor};
