//! Host module - the scene-host contract and its building blocks.
//!
//! - `SceneHost`: entities, picking, terrain, camera, hooks, clock, shadows
//! - `AnimationClock` / `SceneTime`: the shared virtual clock
//! - `Property` / `PositionSource`: time-varying inputs evaluated by the host
//! - `MockScene`: headless host for tests

mod clock;
mod entity;
mod mock_scene;
mod property;
mod scene_host;

pub use clock::{AnimationClock, ClockRange, ClockSettings, SceneTime, TimeInterval};
pub use entity::{
    BillboardGraphics, CylinderGraphics, EntityDesc, LabelGraphics, ModelGraphics,
    PathGraphics, PointGraphics, PolygonGraphics, PolylineGraphics, PrimitiveDesc,
    SurfaceMaterial,
};
pub use mock_scene::{MockObstacle, MockScene};
pub use property::{
    OrientationSource, PositionProvider, PositionSource, PositionsSource, Property,
    ScalarSource,
};
pub use scene_host::{
    lock_scene, EntityKey, FrameEvent, FrameHook, HookKey, PickedObject, PrimitiveKey,
    RayHit, SceneHandle, SceneHost, SceneMode, ShadowMapDesc, ShadowMapKey, Subscription,
    TerrainCallback, ViewRectangle,
};
