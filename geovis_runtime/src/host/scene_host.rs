/// SceneHost - the contract between engines and the 3D globe renderer.
///
/// Engines hold a `SceneHandle` and lock it for the duration of one
/// operation. Per-frame work runs inside hooks the host fires with
/// itself as argument, so a hook never locks the handle again.
///
/// Lock order is always host first, then engine state.

use std::sync::{Arc, Mutex, MutexGuard};
use glam::{DVec2, DVec3};
use slotmap::new_key_type;
use crate::camera::{CameraState, PerspectiveFrustum, Ray};
use crate::error::Result;
use crate::geodesy::{Cartographic, Ellipsoid, HeadingPitchRange, HeadingPitchRoll};
use super::clock::AnimationClock;
use super::entity::{EntityDesc, PrimitiveDesc};

new_key_type! {
    /// Handle to an entity owned by the host
    pub struct EntityKey;
    /// Handle to a primitive owned by the host
    pub struct PrimitiveKey;
    /// Handle to a subscribed frame hook
    pub struct HookKey;
    /// Handle to a shadow map owned by the host
    pub struct ShadowMapKey;
}

/// Shared host handle
pub type SceneHandle = Arc<Mutex<dyn SceneHost>>;

/// Per-frame callback
pub type FrameHook = Box<dyn FnMut(&mut dyn SceneHost) + Send>;

/// Completion of a terrain request: the input positions with heights
/// replaced by the sampled terrain height.
pub type TerrainCallback = Box<dyn FnOnce(&mut dyn SceneHost, Vec<Cartographic>) + Send>;

/// Frame phases hooks can subscribe to, in firing order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameEvent {
    /// After the clock advanced
    ClockTick,
    /// Before scene update, after async terrain completions
    PreUpdate,
    /// After the frame was drawn
    PostRender,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SceneMode {
    #[default]
    Scene3D,
    Columbus,
    Scene2D,
}

/// What a screen or ray pick landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickedObject {
    Entity(EntityKey),
    Primitive(PrimitiveKey),
    /// Streamed geometry that is not an entity (tiles, models)
    Tile,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub position: DVec3,
    pub object: PickedObject,
}

/// Geodetic rectangle in radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewRectangle {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

/// Shadow map allocation request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowMapDesc {
    pub light_position: DVec3,
    pub light_direction: DVec3,
    pub light_up: DVec3,
    pub frustum: PerspectiveFrustum,
    pub size: u32,
    pub soft_shadows: bool,
    pub is_point_light: bool,
    pub darkness: f64,
}

impl Default for ShadowMapDesc {
    fn default() -> Self {
        Self {
            light_position: DVec3::ZERO,
            light_direction: DVec3::NEG_Z,
            light_up: DVec3::Y,
            frustum: PerspectiveFrustum::default(),
            size: 2048,
            soft_shadows: true,
            is_point_light: true,
            darkness: 0.3,
        }
    }
}

/// Host 3D scene.
///
/// Queries return `Option` when nothing is found. Mutations return
/// `Err(Error::SceneDestroyed)` once the host has been torn down.
pub trait SceneHost: Send {
    fn is_destroyed(&self) -> bool;

    fn ellipsoid(&self) -> &Ellipsoid;

    // ===== ENTITIES =====

    fn add_entity(&mut self, desc: EntityDesc) -> Result<EntityKey>;

    /// `Ok(false)` when the key is unknown.
    fn remove_entity(&mut self, key: EntityKey) -> Result<bool>;

    fn entity(&self, key: EntityKey) -> Option<&EntityDesc>;

    fn entity_count(&self) -> usize;

    /// Entity position at the current clock time.
    fn entity_position(&self, key: EntityKey) -> Option<DVec3> {
        let entity = self.entity(key)?;
        let time = self.clock().current_time;
        if let Some(availability) = &entity.availability {
            if !availability.contains(time) {
                return None;
            }
        }
        entity.position.as_ref()?.value(time)
    }

    // ===== PRIMITIVES =====

    fn add_primitive(&mut self, desc: PrimitiveDesc) -> Result<PrimitiveKey>;

    fn remove_primitive(&mut self, key: PrimitiveKey) -> Result<bool>;

    fn primitive(&self, key: PrimitiveKey) -> Option<&PrimitiveDesc>;

    fn primitive_count(&self) -> usize;

    // ===== PICKING =====

    /// Object rendered at a canvas pixel.
    fn pick(&self, pixel: DVec2) -> Option<PickedObject>;

    /// Whether `pick_position` reads the depth buffer.
    fn supports_pick_position(&self) -> bool;

    /// Depth-buffer position at a canvas pixel.
    fn pick_position(&self, pixel: DVec2) -> Option<DVec3>;

    /// Nearest rendered geometry along a ray, terrain excluded.
    fn pick_from_ray(&self, ray: &Ray, exclude: &[EntityKey]) -> Option<RayHit>;

    /// Ray against the rendered terrain surface.
    fn globe_pick(&self, ray: &Ray) -> Option<DVec3>;

    /// Canvas pixel against the bare ellipsoid.
    fn pick_ellipsoid(&self, pixel: DVec2) -> Option<DVec3> {
        let ray = self.camera().pick_ray(pixel, self.canvas_size());
        self.ellipsoid().pick_ray(&ray)
    }

    fn cartesian_to_canvas(&self, position: DVec3) -> Option<DVec2> {
        self.camera().project(position, self.canvas_size())
    }

    fn canvas_size(&self) -> DVec2;

    fn scene_mode(&self) -> SceneMode;

    // ===== TERRAIN =====

    /// Height of the loaded terrain at a geodetic position.
    fn globe_height(&self, carto: &Cartographic) -> Option<f64>;

    /// Sample the most detailed terrain. `done` runs on a later frame.
    fn sample_terrain_most_detailed(&mut self, positions: Vec<Cartographic>, done: TerrainCallback);

    /// Clamp a position onto loaded detailed geometry along the local
    /// vertical, ignoring `exclude`.
    fn clamp_to_height(&self, position: DVec3, exclude: &[EntityKey]) -> Option<DVec3>;

    // ===== CAMERA =====

    fn camera(&self) -> CameraState;

    fn set_camera(&mut self, camera: CameraState) -> Result<()>;

    /// Place the camera at `destination` with the given orientation.
    fn set_view(&mut self, destination: DVec3, orientation: HeadingPitchRoll) -> Result<()> {
        let frustum = self.camera().frustum;
        let camera = CameraState::from_heading_pitch_roll(self.ellipsoid(), destination, &orientation, frustum);
        self.set_camera(camera)
    }

    /// Look at `target` from `offset`, expressed in the target's local frame.
    fn look_at(&mut self, target: DVec3, offset: HeadingPitchRange) -> Result<()>;

    fn move_backward(&mut self, amount: f64) -> Result<()> {
        let mut camera = self.camera();
        camera.move_backward(amount);
        self.set_camera(camera)
    }

    /// Frame the given entities. A zero range lets the host choose.
    fn fit_entities(&mut self, entities: &[EntityKey], offset: HeadingPitchRange) -> Result<()>;

    fn track_entity(&mut self, entity: Option<EntityKey>) -> Result<()>;

    fn tracked_entity(&self) -> Option<EntityKey>;

    /// Visible geodetic rectangle, `None` when the globe does not fill
    /// enough of the view.
    fn view_rectangle(&self) -> Option<ViewRectangle>;

    // ===== FRAME HOOKS =====

    fn subscribe(&mut self, event: FrameEvent, hook: FrameHook) -> Result<HookKey>;

    /// `false` when the key was not subscribed.
    fn unsubscribe(&mut self, key: HookKey) -> bool;

    // ===== CLOCK =====

    fn clock(&self) -> &AnimationClock;

    fn clock_mut(&mut self) -> &mut AnimationClock;

    // ===== SHADOWS =====

    fn create_shadow_map(&mut self, desc: ShadowMapDesc) -> Result<ShadowMapKey>;

    fn destroy_shadow_map(&mut self, key: ShadowMapKey) -> Result<()>;

    /// Shadow map used for occlusion testing.
    fn shadow_map_slot(&self) -> Option<ShadowMapKey>;

    fn set_shadow_map_slot(&mut self, slot: Option<ShadowMapKey>) -> Result<()>;
}

/// Lock the host, mapping poisoning to a host error.
pub fn lock_scene(scene: &SceneHandle) -> Result<MutexGuard<'_, dyn SceneHost + 'static>> {
    scene.lock().map_err(|_| crate::geovis_err!("geovis::Host", "Scene lock poisoned"))
}

/// Owned frame-hook subscription, released exactly once.
#[derive(Debug, Default)]
pub struct Subscription {
    key: Option<HookKey>,
}

impl Subscription {
    pub fn new(key: HookKey) -> Self {
        Self { key: Some(key) }
    }

    pub fn is_active(&self) -> bool {
        self.key.is_some()
    }

    /// Unsubscribe from `scene`. Later calls are no-ops.
    pub fn release(&mut self, scene: &mut dyn SceneHost) -> bool {
        match self.key.take() {
            Some(key) => scene.unsubscribe(key),
            None => false,
        }
    }

    /// Drop the handle without talking to the host (host already gone).
    pub fn forget(&mut self) {
        self.key = None;
    }
}
