//! Material module: procedural animated surface materials.
//!
//! - `AnimatedMaterial`: one material type, behavior picked by `MaterialVariant`
//! - `MaterialRegistry`: shader programs keyed by type name, registered once
//! - `UniformSet`: per-frame values, packable into a uniform buffer
//! - `Event`: definition-changed notifications

mod animated_material;
mod color;
mod event;
mod registry;
mod shader_source;
mod uniform;

pub use animated_material::{
    AnimatedMaterial, CircleGradientOptions, CircleWaveOptions, DynamicWallOptions,
    EllipsoidFadeOptions, FixedWallClock, MaterialChange, MaterialDesc, MaterialVariant,
    PolylineTrailOptions, ScrollDirection, SystemWallClock, WallAxis, WallClock,
};
pub use color::Color;
pub use event::{Event, ListenerKey};
pub use registry::{MaterialRegistry, ShaderProgram};
pub use shader_source::{trail_ramp_rgba, DEFAULT_IMAGE, TRAIL_RAMP_IMAGE, TRAIL_RAMP_WIDTH};
pub use uniform::{UniformSet, UniformValue};
