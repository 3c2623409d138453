/// Coordinate helpers: picking, viewport probing and rounded readouts.

use glam::{DVec2, DVec3};
use crate::geodesy::{round_to, Cartographic, Ellipsoid};
use crate::host::{EntityKey, PickedObject, SceneHost, SceneMode};

/// Lowest accepted depth-picked height on non-entity geometry (tiles
/// extending underground).
pub const UNDERGROUND_TOLERANCE: f64 = -500.0;

/// Returned for corners that never hit the ellipsoid.
pub const DEFAULT_EXTENT: Extent = Extent { xmin: 70.0, xmax: 140.0, ymin: 0.0, ymax: 55.0 };

/// Step of the inward corner search, in pixels
const EXTENT_SEARCH_STEP: f64 = 10.0;

const ANGLE_DECIMALS: i32 = 6;
const LINEAR_DECIMALS: i32 = 1;

/// Degrees and meters, rounded for display.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Geodetic {
    pub lon: f64,
    pub lat: f64,
    pub height: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCenter {
    pub lon: f64,
    pub lat: f64,
    pub height: f64,
    /// Meters from the camera to the center point
    pub camera_distance: f64,
}

/// Longitude/latitude box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LonLat {
    pub lng: f64,
    pub lat: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBounds {
    pub southwest: LonLat,
    pub northeast: LonLat,
}

/// Camera position (degrees, meters) and orientation (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CameraParameters {
    pub lon: f64,
    pub lat: f64,
    pub height: f64,
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

/// World position under a canvas pixel.
///
/// Depth picking wins when something other than `exclude` is rendered at
/// the pixel and the picked point is above ground (or above
/// `UNDERGROUND_TOLERANCE` on non-entity geometry). Otherwise the camera
/// ray is intersected with terrain in 3D mode, then with the ellipsoid.
pub fn pick_world_position(
    scene: &dyn SceneHost,
    pixel: DVec2,
    exclude: Option<EntityKey>,
) -> Option<DVec3> {
    if scene.supports_pick_position() {
        if let Some(picked) = scene.pick(pixel) {
            let excluded = matches!((picked, exclude), (PickedObject::Entity(a), Some(b)) if a == b);
            if !excluded {
                if let Some(position) = depth_picked(scene, pixel, picked) {
                    return Some(position);
                }
            }
        }
    }

    if scene.scene_mode() == SceneMode::Scene3D {
        let ray = scene.camera().pick_ray(pixel, scene.canvas_size());
        if let Some(position) = scene.globe_pick(&ray) {
            return Some(position);
        }
    }
    scene.pick_ellipsoid(pixel)
}

fn depth_picked(scene: &dyn SceneHost, pixel: DVec2, picked: PickedObject) -> Option<DVec3> {
    let position = scene.pick_position(pixel)?;
    let height = scene.ellipsoid().cartesian_to_cartographic(position)?.height;
    let is_entity = matches!(picked, PickedObject::Entity(_));

    if height >= 0.0 || (!is_entity && height >= UNDERGROUND_TOLERANCE) {
        Some(position)
    } else {
        None
    }
}

/// Point at the center of the view: terrain, then ellipsoid, then the
/// ground under the camera.
pub fn center_target(scene: &dyn SceneHost) -> Option<DVec3> {
    let center = scene.canvas_size() / 2.0;
    let ray = scene.camera().pick_ray(center, scene.canvas_size());
    if let Some(hit) = scene.globe_pick(&ray).or_else(|| scene.pick_ellipsoid(center)) {
        return Some(hit);
    }

    let ellipsoid = scene.ellipsoid();
    let below = ellipsoid.cartesian_to_cartographic(scene.camera().position)?;
    let height = scene.globe_height(&below).unwrap_or(0.0);
    Some(ellipsoid.cartographic_to_cartesian(&below.with_height(height)))
}

/// Rounded geodetic center of the view plus its distance to the camera.
pub fn scene_center(scene: &dyn SceneHost) -> Option<SceneCenter> {
    let target = center_target(scene)?;
    let geodetic = cartesian_to_geodetic(scene.ellipsoid(), target)?;

    Some(SceneCenter {
        lon: geodetic.lon,
        lat: geodetic.lat,
        height: geodetic.height,
        camera_distance: target.distance(scene.camera().position),
    })
}

/// Longitude/latitude box covered by the viewport.
///
/// Corners that miss the ellipsoid are searched inward along the diagonal.
pub fn viewport_extent(scene: &dyn SceneHost) -> Extent {
    let mut extent = DEFAULT_EXTENT;
    let canvas = scene.canvas_size();
    let half = canvas / 2.0;

    let probe = |pixel: DVec2| -> Option<Cartographic> {
        let hit = scene.pick_ellipsoid(pixel)?;
        scene.ellipsoid().cartesian_to_cartographic(hit)
    };

    // Top-left sets west/north
    let mut top_left = probe(DVec2::ZERO);
    let mut y = 0.0;
    while top_left.is_none() && y <= half.y {
        let x = if y <= half.x { y } else { half.x };
        top_left = probe(DVec2::new(x, y));
        y += EXTENT_SEARCH_STEP;
    }
    if let Some(carto) = top_left {
        extent.xmin = carto.longitude_degrees();
        extent.ymax = carto.latitude_degrees();
    }

    // Bottom-right sets east/south
    let mut bottom_right = probe(canvas);
    let mut y = canvas.y;
    while bottom_right.is_none() && y >= half.y {
        let x = if y >= half.x { y } else { half.x };
        bottom_right = probe(DVec2::new(x, y));
        y -= EXTENT_SEARCH_STEP;
    }
    if let Some(carto) = bottom_right {
        extent.xmax = carto.longitude_degrees();
        extent.ymin = carto.latitude_degrees();
    }

    if extent.xmax < extent.xmin {
        std::mem::swap(&mut extent.xmax, &mut extent.xmin);
    }
    if extent.ymax < extent.ymin {
        std::mem::swap(&mut extent.ymax, &mut extent.ymin);
    }
    extent
}

/// Host view rectangle in degrees.
pub fn view_bounds(scene: &dyn SceneHost) -> Option<ViewBounds> {
    let rect = scene.view_rectangle()?;
    Some(ViewBounds {
        southwest: LonLat { lng: rect.west.to_degrees(), lat: rect.south.to_degrees() },
        northeast: LonLat { lng: rect.east.to_degrees(), lat: rect.north.to_degrees() },
    })
}

/// Camera position and orientation, rounded.
pub fn camera_parameters(scene: &dyn SceneHost) -> CameraParameters {
    let camera = scene.camera();
    let ellipsoid = scene.ellipsoid();
    let position = ellipsoid
        .cartesian_to_cartographic(camera.position)
        .unwrap_or_default();
    let orientation = camera.heading_pitch_roll(ellipsoid);

    CameraParameters {
        lon: round_to(position.longitude_degrees(), ANGLE_DECIMALS),
        lat: round_to(position.latitude_degrees(), ANGLE_DECIMALS),
        height: round_to(position.height, LINEAR_DECIMALS),
        heading: round_to(orientation.heading.to_degrees(), ANGLE_DECIMALS),
        pitch: round_to(orientation.pitch.to_degrees(), ANGLE_DECIMALS),
        roll: round_to(orientation.roll.to_degrees(), ANGLE_DECIMALS),
    }
}

/// Rounded degrees/meters. `None` at the center of the ellipsoid.
pub fn cartesian_to_geodetic(ellipsoid: &Ellipsoid, position: DVec3) -> Option<Geodetic> {
    let carto = ellipsoid.cartesian_to_cartographic(position)?;
    Some(Geodetic {
        lon: round_to(carto.longitude_degrees(), ANGLE_DECIMALS),
        lat: round_to(carto.latitude_degrees(), ANGLE_DECIMALS),
        height: round_to(carto.height, LINEAR_DECIMALS),
    })
}

/// Unrounded radians/meters.
pub fn cartesian_to_cartographic(ellipsoid: &Ellipsoid, position: DVec3) -> Option<Cartographic> {
    ellipsoid.cartesian_to_cartographic(position)
}

#[cfg(test)]
#[path = "coordinates_tests.rs"]
mod tests;
