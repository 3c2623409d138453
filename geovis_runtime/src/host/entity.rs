/// Entity and primitive descriptors.
///
/// Engines describe what they want rendered; the host decides how.
/// Every visual is optional. Dynamic inputs use `Property` callbacks so the
/// host re-evaluates them each frame without storing samples.

use std::fmt;
use std::sync::{Arc, Mutex};
use glam::{DVec2, DVec3};
use crate::camera::PerspectiveFrustum;
use crate::material::{AnimatedMaterial, Color};
use super::clock::TimeInterval;
use super::property::{OrientationSource, PositionSource, PositionsSource, Property, ScalarSource};

/// Material applied to polylines, polygons, cylinders and paths.
#[derive(Clone)]
pub enum SurfaceMaterial {
    Color(Property<Color>),
    Animated(Arc<Mutex<AnimatedMaterial>>),
}

impl SurfaceMaterial {
    pub fn color(color: Color) -> Self {
        SurfaceMaterial::Color(Property::Constant(color))
    }

    /// Constant color, if this is a plain constant-color material.
    pub fn constant_color(&self) -> Option<Color> {
        match self {
            SurfaceMaterial::Color(Property::Constant(c)) => Some(*c),
            _ => None,
        }
    }
}

impl Default for SurfaceMaterial {
    fn default() -> Self {
        SurfaceMaterial::color(Color::WHITE)
    }
}

impl fmt::Debug for SurfaceMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceMaterial::Color(c) => f.debug_tuple("Color").field(c).finish(),
            SurfaceMaterial::Animated(_) => f.write_str("Animated(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PointGraphics {
    pub pixel_size: f64,
    pub color: Color,
    pub outline_color: Color,
    pub outline_width: f64,
}

impl Default for PointGraphics {
    fn default() -> Self {
        Self {
            pixel_size: 10.0,
            color: Color::YELLOW,
            outline_color: Color::BLACK,
            outline_width: 2.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BillboardGraphics {
    pub image: String,
    pub scale: f64,
}

#[derive(Debug, Clone)]
pub struct PolylineGraphics {
    pub positions: PositionsSource,
    pub width: f64,
    pub material: SurfaceMaterial,
    pub clamp_to_ground: bool,
}

#[derive(Debug, Clone)]
pub struct PolygonGraphics {
    pub hierarchy: Vec<DVec3>,
    /// Use each vertex height instead of draping on the surface
    pub per_position_height: bool,
    pub material: SurfaceMaterial,
}

#[derive(Debug, Clone)]
pub struct CylinderGraphics {
    pub length: ScalarSource,
    pub top_radius: f64,
    pub bottom_radius: f64,
    pub material: SurfaceMaterial,
}

#[derive(Debug, Clone)]
pub struct ModelGraphics {
    pub uri: String,
    pub scale: f64,
    pub minimum_pixel_size: f64,
}

#[derive(Debug, Clone)]
pub struct LabelGraphics {
    pub text: String,
    pub pixel_offset: DVec2,
}

/// Trail drawn behind a moving entity.
#[derive(Debug, Clone)]
pub struct PathGraphics {
    pub width: f64,
    pub lead_time: f64,
    pub trail_time: f64,
    pub material: SurfaceMaterial,
}

/// Scene object descriptor.
#[derive(Debug, Clone, Default)]
pub struct EntityDesc {
    pub name: Option<String>,
    pub position: Option<PositionSource>,
    pub orientation: Option<OrientationSource>,
    /// Entity only exists inside this interval
    pub availability: Option<TimeInterval>,
    pub point: Option<PointGraphics>,
    pub billboard: Option<BillboardGraphics>,
    pub polyline: Option<PolylineGraphics>,
    pub polygon: Option<PolygonGraphics>,
    pub cylinder: Option<CylinderGraphics>,
    pub model: Option<ModelGraphics>,
    pub label: Option<LabelGraphics>,
    pub path: Option<PathGraphics>,
}

impl EntityDesc {
    pub fn named(name: &str) -> Self {
        Self { name: Some(name.to_string()), ..Default::default() }
    }
}

/// Non-entity primitives.
#[derive(Debug, Clone)]
pub enum PrimitiveDesc {
    /// Wireframe of a perspective frustum placed at `origin`
    FrustumOutline {
        origin: DVec3,
        direction: DVec3,
        up: DVec3,
        frustum: PerspectiveFrustum,
        color: Color,
    },
}
