/// Mock scene host (no renderer required)
///
/// A headless `SceneHost` over a flat-terrain WGS84 world. Terrain sits at
/// a constant height; 3D tiles are modeled as analytic spheres. Frames are
/// driven manually with `render_frame`, and async terrain requests resolve
/// on the frame after they were issued.

use std::sync::{Arc, Mutex};
use glam::{DVec2, DVec3};
use slotmap::SlotMap;
use crate::camera::{CameraState, PerspectiveFrustum, Ray};
use crate::error::{Error, Result};
use crate::geodesy::{Cartographic, Ellipsoid, HeadingPitchRange, HeadingPitchRoll, WGS84};
use super::clock::{AnimationClock, SceneTime};
use super::entity::{EntityDesc, PrimitiveDesc};
use super::scene_host::{
    EntityKey, FrameEvent, FrameHook, HookKey, PickedObject, PrimitiveKey, RayHit,
    SceneHost, SceneMode, ShadowMapDesc, ShadowMapKey, TerrainCallback, ViewRectangle,
};

/// Screen distance under which a point-like entity is picked
const ENTITY_PICK_RADIUS_PX: f64 = 8.0;

/// Height of the probe used by `clamp_to_height`
const CLAMP_PROBE_HEIGHT: f64 = 10_000.0;

/// Range used when `fit_entities` is asked to choose one
const MIN_FIT_RANGE: f64 = 100.0;

// ============================================================================
// Mock geometry
// ============================================================================

/// Sphere standing in for streamed 3D tile geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MockObstacle {
    pub center: DVec3,
    pub radius: f64,
}

impl MockObstacle {
    /// Nearest intersection distance along `ray`, origin inside excluded.
    fn intersect(&self, ray: &Ray) -> Option<f64> {
        let oc = ray.origin - self.center;
        let b = oc.dot(ray.direction);
        let c = oc.length_squared() - self.radius * self.radius;
        let discriminant = b * b - c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrt_d = discriminant.sqrt();
        let near = -b - sqrt_d;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + sqrt_d;
        if far >= 0.0 && c > 0.0 {
            return Some(far);
        }
        None
    }
}

struct HookSlot {
    event: FrameEvent,
    // Taken out while the hook runs
    hook: Option<FrameHook>,
}

struct TerrainRequest {
    positions: Vec<Cartographic>,
    done: TerrainCallback,
}

// ============================================================================
// MockScene
// ============================================================================

pub struct MockScene {
    destroyed: bool,
    ellipsoid: Ellipsoid,
    terrain_height: f64,
    depth_picking: bool,
    scene_mode: SceneMode,
    canvas: DVec2,
    camera: CameraState,
    tracked: Option<EntityKey>,
    clock: AnimationClock,
    obstacles: Vec<MockObstacle>,
    entities: SlotMap<EntityKey, EntityDesc>,
    primitives: SlotMap<PrimitiveKey, PrimitiveDesc>,
    hooks: SlotMap<HookKey, HookSlot>,
    shadow_maps: SlotMap<ShadowMapKey, ShadowMapDesc>,
    shadow_slot: Option<ShadowMapKey>,
    pending_terrain: Vec<TerrainRequest>,
    frame_count: u64,
}

impl MockScene {
    /// Flat terrain at height 0, 1280x720 canvas, camera 2 km above
    /// (116.39°, 39.9°) looking straight down.
    pub fn new() -> Self {
        let canvas = DVec2::new(1280.0, 720.0);
        let frustum = PerspectiveFrustum::new(60f64.to_radians(), canvas.x / canvas.y, 1.0, 5.0e8);
        let position = WGS84.from_degrees(116.39, 39.9, 2000.0);
        let camera = CameraState::from_heading_pitch_roll(
            &WGS84,
            position,
            &HeadingPitchRoll::from_degrees(0.0, -90.0, 0.0),
            frustum,
        );

        Self {
            destroyed: false,
            ellipsoid: WGS84,
            terrain_height: 0.0,
            depth_picking: true,
            scene_mode: SceneMode::Scene3D,
            canvas,
            camera,
            tracked: None,
            clock: AnimationClock::new(SceneTime(0.0)),
            obstacles: Vec::new(),
            entities: SlotMap::with_key(),
            primitives: SlotMap::with_key(),
            hooks: SlotMap::with_key(),
            shadow_maps: SlotMap::with_key(),
            shadow_slot: None,
            pending_terrain: Vec::new(),
            frame_count: 0,
        }
    }

    /// Wrap in the shared handle engines expect. Clone the `Arc` into a
    /// `SceneHandle` while keeping this one to drive frames.
    pub fn shared(self) -> Arc<Mutex<MockScene>> {
        Arc::new(Mutex::new(self))
    }

    // ===== CONFIGURATION =====

    pub fn set_terrain_height(&mut self, height: f64) {
        self.terrain_height = height;
    }

    pub fn terrain_height(&self) -> f64 {
        self.terrain_height
    }

    pub fn set_depth_picking(&mut self, enabled: bool) {
        self.depth_picking = enabled;
    }

    pub fn set_scene_mode(&mut self, mode: SceneMode) {
        self.scene_mode = mode;
    }

    pub fn set_canvas_size(&mut self, size: DVec2) {
        self.canvas = size;
        self.camera.frustum.aspect_ratio = size.x / size.y;
    }

    pub fn add_obstacle(&mut self, center: DVec3, radius: f64) {
        self.obstacles.push(MockObstacle { center, radius });
    }

    // ===== FRAME LOOP =====

    /// Advance one frame of `dt` wall seconds.
    ///
    /// Order: clock tick, `ClockTick` hooks, terrain completions,
    /// `PreUpdate` hooks, `PostRender` hooks.
    pub fn render_frame(&mut self, dt: f64) {
        if self.destroyed {
            return;
        }

        self.clock.tick(dt);
        self.fire(FrameEvent::ClockTick);

        for request in std::mem::take(&mut self.pending_terrain) {
            let height = self.terrain_height;
            let sampled: Vec<Cartographic> = request.positions
                .into_iter()
                .map(|c| c.with_height(height))
                .collect();
            (request.done)(&mut *self, sampled);
        }

        self.fire(FrameEvent::PreUpdate);
        self.fire(FrameEvent::PostRender);
        self.frame_count += 1;
    }

    fn fire(&mut self, event: FrameEvent) {
        let keys: Vec<HookKey> = self.hooks
            .iter()
            .filter(|(_, slot)| slot.event == event)
            .map(|(key, _)| key)
            .collect();

        for key in keys {
            let Some(mut hook) = self.hooks.get_mut(key).and_then(|slot| slot.hook.take()) else {
                continue;
            };
            hook(&mut *self);
            // The hook may have unsubscribed itself
            if let Some(slot) = self.hooks.get_mut(key) {
                slot.hook = Some(hook);
            }
        }
    }

    /// Tear the scene down. Every later mutation fails with
    /// `Error::SceneDestroyed`.
    pub fn destroy(&mut self) {
        self.destroyed = true;
        self.entities.clear();
        self.primitives.clear();
        self.hooks.clear();
        self.shadow_maps.clear();
        self.shadow_slot = None;
        self.pending_terrain.clear();
        self.tracked = None;
    }

    // ===== INSPECTION =====

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn hook_count(&self) -> usize {
        self.hooks.len()
    }

    pub fn pending_terrain_requests(&self) -> usize {
        self.pending_terrain.len()
    }

    pub fn shadow_map_count(&self) -> usize {
        self.shadow_maps.len()
    }

    pub fn shadow_map(&self, key: ShadowMapKey) -> Option<&ShadowMapDesc> {
        self.shadow_maps.get(key)
    }

    pub fn entity_keys(&self) -> Vec<EntityKey> {
        self.entities.keys().collect()
    }

    // ===== INTERNAL HELPERS =====

    fn check_alive(&self) -> Result<()> {
        if self.destroyed {
            Err(Error::SceneDestroyed)
        } else {
            Ok(())
        }
    }

    fn terrain_surface(&self) -> Ellipsoid {
        self.ellipsoid.grown(self.terrain_height)
    }

    fn nearest_obstacle_hit(&self, ray: &Ray) -> Option<f64> {
        self.obstacles
            .iter()
            .filter_map(|o| o.intersect(ray))
            .min_by(|a, b| a.total_cmp(b))
    }

    /// Point-like entities whose screen position is near `pixel`.
    fn entity_at_pixel(&self, pixel: DVec2) -> Option<EntityKey> {
        self.entities
            .iter()
            .filter(|(_, e)| e.point.is_some() || e.billboard.is_some() || e.model.is_some())
            .filter_map(|(key, _)| {
                let position = self.entity_position(key)?;
                let screen = self.cartesian_to_canvas(position)?;
                let distance = screen.distance(pixel);
                (distance <= ENTITY_PICK_RADIUS_PX).then_some((key, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, _)| key)
    }

    fn collect_positions(&self, key: EntityKey) -> Vec<DVec3> {
        let Some(entity) = self.entities.get(key) else {
            return Vec::new();
        };
        let time = self.clock.current_time;
        let mut positions = Vec::new();
        if let Some(p) = self.entity_position(key) {
            positions.push(p);
        }
        if let Some(polyline) = &entity.polyline {
            positions.extend(polyline.positions.value(time));
        }
        if let Some(polygon) = &entity.polygon {
            positions.extend(polygon.hierarchy.iter().copied());
        }
        positions
    }
}

impl Default for MockScene {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SceneHost implementation
// ============================================================================

impl SceneHost for MockScene {
    fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    // ===== ENTITIES =====

    fn add_entity(&mut self, desc: EntityDesc) -> Result<EntityKey> {
        self.check_alive()?;
        Ok(self.entities.insert(desc))
    }

    fn remove_entity(&mut self, key: EntityKey) -> Result<bool> {
        self.check_alive()?;
        if self.tracked == Some(key) {
            self.tracked = None;
        }
        Ok(self.entities.remove(key).is_some())
    }

    fn entity(&self, key: EntityKey) -> Option<&EntityDesc> {
        self.entities.get(key)
    }

    fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ===== PRIMITIVES =====

    fn add_primitive(&mut self, desc: PrimitiveDesc) -> Result<PrimitiveKey> {
        self.check_alive()?;
        Ok(self.primitives.insert(desc))
    }

    fn remove_primitive(&mut self, key: PrimitiveKey) -> Result<bool> {
        self.check_alive()?;
        Ok(self.primitives.remove(key).is_some())
    }

    fn primitive(&self, key: PrimitiveKey) -> Option<&PrimitiveDesc> {
        self.primitives.get(key)
    }

    fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    // ===== PICKING =====

    fn pick(&self, pixel: DVec2) -> Option<PickedObject> {
        if self.destroyed {
            return None;
        }
        if let Some(key) = self.entity_at_pixel(pixel) {
            return Some(PickedObject::Entity(key));
        }
        let ray = self.camera.pick_ray(pixel, self.canvas);
        self.nearest_obstacle_hit(&ray).map(|_| PickedObject::Tile)
    }

    fn supports_pick_position(&self) -> bool {
        self.depth_picking
    }

    fn pick_position(&self, pixel: DVec2) -> Option<DVec3> {
        if self.destroyed || !self.depth_picking {
            return None;
        }
        if let Some(key) = self.entity_at_pixel(pixel) {
            return self.entity_position(key);
        }

        let ray = self.camera.pick_ray(pixel, self.canvas);
        let obstacle = self.nearest_obstacle_hit(&ray);
        let globe = self.terrain_surface().intersect_ray(&ray).map(|(start, _)| start);

        let t = match (obstacle, globe) {
            (Some(a), Some(b)) => a.min(b),
            (a, b) => a.or(b)?,
        };
        Some(ray.point_at(t))
    }

    fn pick_from_ray(&self, ray: &Ray, _exclude: &[EntityKey]) -> Option<RayHit> {
        if self.destroyed {
            return None;
        }
        self.nearest_obstacle_hit(ray).map(|t| RayHit {
            position: ray.point_at(t),
            object: PickedObject::Tile,
        })
    }

    fn globe_pick(&self, ray: &Ray) -> Option<DVec3> {
        if self.destroyed {
            return None;
        }
        self.terrain_surface().pick_ray(ray)
    }

    fn canvas_size(&self) -> DVec2 {
        self.canvas
    }

    fn scene_mode(&self) -> SceneMode {
        self.scene_mode
    }

    // ===== TERRAIN =====

    fn globe_height(&self, _carto: &Cartographic) -> Option<f64> {
        if self.destroyed {
            None
        } else {
            Some(self.terrain_height)
        }
    }

    fn sample_terrain_most_detailed(&mut self, positions: Vec<Cartographic>, done: TerrainCallback) {
        if self.destroyed {
            return;
        }
        self.pending_terrain.push(TerrainRequest { positions, done });
    }

    fn clamp_to_height(&self, position: DVec3, _exclude: &[EntityKey]) -> Option<DVec3> {
        if self.destroyed {
            return None;
        }
        let up = self.ellipsoid.geodetic_surface_normal(position)?;
        let probe = Ray::new(position + up * CLAMP_PROBE_HEIGHT, -up);
        self.nearest_obstacle_hit(&probe).map(|t| probe.point_at(t))
    }

    // ===== CAMERA =====

    fn camera(&self) -> CameraState {
        self.camera
    }

    fn set_camera(&mut self, camera: CameraState) -> Result<()> {
        self.check_alive()?;
        self.camera = camera;
        Ok(())
    }

    fn look_at(&mut self, target: DVec3, offset: HeadingPitchRange) -> Result<()> {
        self.check_alive()?;
        let frame = self.ellipsoid.east_north_up(target);
        let orientation = HeadingPitchRoll::new(offset.heading, offset.pitch, 0.0);
        let mut camera = CameraState::oriented_in_frame(&frame, target, &orientation, self.camera.frustum);
        camera.move_backward(offset.range);
        self.camera = camera;
        Ok(())
    }

    fn fit_entities(&mut self, entities: &[EntityKey], offset: HeadingPitchRange) -> Result<()> {
        self.check_alive()?;

        let positions: Vec<DVec3> = entities
            .iter()
            .flat_map(|key| self.collect_positions(*key))
            .collect();
        if positions.is_empty() {
            crate::geovis_bail!("geovis::Mock", "No positioned entity among {} to fit", entities.len());
        }

        let center = positions.iter().copied().sum::<DVec3>() / positions.len() as f64;
        let radius = positions
            .iter()
            .map(|p| p.distance(center))
            .fold(0.0, f64::max);

        let range = if offset.range > 0.0 {
            offset.range
        } else {
            (radius * 2.5).max(MIN_FIT_RANGE)
        };

        self.look_at(center, HeadingPitchRange::new(offset.heading, offset.pitch, range))
    }

    fn track_entity(&mut self, entity: Option<EntityKey>) -> Result<()> {
        self.check_alive()?;
        self.tracked = entity;
        Ok(())
    }

    fn tracked_entity(&self) -> Option<EntityKey> {
        self.tracked
    }

    fn view_rectangle(&self) -> Option<ViewRectangle> {
        if self.destroyed {
            return None;
        }
        let corners = [
            DVec2::ZERO,
            DVec2::new(self.canvas.x, 0.0),
            DVec2::new(0.0, self.canvas.y),
            self.canvas,
        ];

        let mut rect = ViewRectangle {
            west: f64::INFINITY,
            south: f64::INFINITY,
            east: f64::NEG_INFINITY,
            north: f64::NEG_INFINITY,
        };
        for corner in corners {
            let hit = self.pick_ellipsoid(corner)?;
            let carto = self.ellipsoid.cartesian_to_cartographic(hit)?;
            rect.west = rect.west.min(carto.longitude);
            rect.east = rect.east.max(carto.longitude);
            rect.south = rect.south.min(carto.latitude);
            rect.north = rect.north.max(carto.latitude);
        }
        Some(rect)
    }

    // ===== FRAME HOOKS =====

    fn subscribe(&mut self, event: FrameEvent, hook: FrameHook) -> Result<HookKey> {
        self.check_alive()?;
        Ok(self.hooks.insert(HookSlot { event, hook: Some(hook) }))
    }

    fn unsubscribe(&mut self, key: HookKey) -> bool {
        self.hooks.remove(key).is_some()
    }

    // ===== CLOCK =====

    fn clock(&self) -> &AnimationClock {
        &self.clock
    }

    fn clock_mut(&mut self) -> &mut AnimationClock {
        &mut self.clock
    }

    // ===== SHADOWS =====

    fn create_shadow_map(&mut self, desc: ShadowMapDesc) -> Result<ShadowMapKey> {
        self.check_alive()?;
        Ok(self.shadow_maps.insert(desc))
    }

    fn destroy_shadow_map(&mut self, key: ShadowMapKey) -> Result<()> {
        self.check_alive()?;
        if self.shadow_slot == Some(key) {
            self.shadow_slot = None;
        }
        self.shadow_maps
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| Error::InvalidResource(format!("shadow map {:?}", key)))
    }

    fn shadow_map_slot(&self) -> Option<ShadowMapKey> {
        self.shadow_slot
    }

    fn set_shadow_map_slot(&mut self, slot: Option<ShadowMapKey>) -> Result<()> {
        self.check_alive()?;
        if let Some(key) = slot {
            if !self.shadow_maps.contains_key(key) {
                return Err(Error::InvalidResource(format!("shadow map {:?}", key)));
            }
        }
        self.shadow_slot = slot;
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_scene_tests.rs"]
mod tests;
