/// RoamingController - moves one object (camera or model) along a timed
/// path.
///
/// A session owns the moving entity, its optional trail and scan cone, the
/// sampled path and one pre-update hook. Hooks and terrain completions hold
/// a `Weak` to the session data plus its generation number; once the
/// session is stopped or restarted they find a newer generation and do
/// nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};
use glam::DVec3;
use crate::error::Result;
use crate::geodesy::{Cartographic, HeadingPitchRange};
use crate::host::{
    lock_scene, ClockRange, ClockSettings, CylinderGraphics, EntityDesc, EntityKey, FrameEvent,
    LabelGraphics, ModelGraphics, OrientationSource, PathGraphics, PolylineGraphics,
    PositionProvider, PositionSource, Property, SceneHandle, SceneHost, SceneTime, Subscription,
    SurfaceMaterial, TimeInterval,
};
use crate::material::Color;
use super::sampled_position::{Interpolation, SampledPosition, TimeSample};
use super::telemetry::{path_length, progress_fraction, RoamingTelemetry, TelemetryFields};

/// Camera-follow offset used by camera roaming
const FOLLOW_HEADING_DEG: f64 = 117.7;
const FOLLOW_PITCH_DEG: f64 = 0.0;
const FOLLOW_RANGE: f64 = 100.0;

const OBLIQUE_RANGE: f64 = 8000.0;

const CAMERA_INTERPOLATION: Interpolation = Interpolation::Hermite { degree: 2 };
const SMOOTH_MODEL_INTERPOLATION: Interpolation = Interpolation::Lagrange { degree: 5 };

// ============================================================================
// Configuration
// ============================================================================

/// Whether the host terrain carries real elevation data.
///
/// With `Unavailable` nothing is ground-clamped and telemetry reports a
/// terrain height of 0, so clearance equals the absolute height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TerrainElevation {
    #[default]
    Unavailable,
    Available,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoamingOptions {
    /// Clock rate
    pub multiplier: f64,
    /// Loop at the end instead of holding the last position
    pub looped: bool,
    /// Clamp path points (and the moving model each frame) onto loaded
    /// detailed geometry
    pub clamp_to_tileset: bool,
    pub terrain: TerrainElevation,
    /// Session start on the scene time line; wall-clock now when `None`
    pub start_time: Option<SceneTime>,
}

impl Default for RoamingOptions {
    fn default() -> Self {
        Self {
            multiplier: 1.0,
            looped: false,
            clamp_to_tileset: false,
            terrain: TerrainElevation::Unavailable,
            start_time: None,
        }
    }
}

/// Polyline growing behind the model.
#[derive(Debug, Clone)]
pub struct TrailOptions {
    pub width: f64,
    pub material: SurfaceMaterial,
}

impl Default for TrailOptions {
    fn default() -> Self {
        Self { width: 1.0, material: SurfaceMaterial::color(Color::RED) }
    }
}

/// Cone from the model down to the ground.
#[derive(Debug, Clone)]
pub struct ScanConeOptions {
    pub top_radius: f64,
    pub bottom_radius: f64,
    pub material: SurfaceMaterial,
}

impl Default for ScanConeOptions {
    fn default() -> Self {
        Self {
            top_radius: 0.0,
            bottom_radius: 100.0,
            material: SurfaceMaterial::color(Color::RED.with_alpha(0.3)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelRoamingOptions {
    pub model: ModelGraphics,
    pub label: Option<LabelGraphics>,
    pub path: Option<PathGraphics>,
    pub trail: Option<TrailOptions>,
    pub scan_cone: Option<ScanConeOptions>,
    /// Follow sampled terrain heights (needs `TerrainElevation::Available`)
    pub clamp_to_ground: bool,
    /// Smooth the path with a degree-5 polynomial when not ground-clamped
    pub interpolate: bool,
}

impl Default for ModelRoamingOptions {
    fn default() -> Self {
        Self {
            model: ModelGraphics {
                uri: String::new(),
                scale: 1.0,
                minimum_pixel_size: 64.0,
            },
            label: None,
            path: None,
            trail: None,
            scan_cone: None,
            clamp_to_ground: false,
            interpolate: false,
        }
    }
}

/// What moves along the path.
#[derive(Debug, Clone)]
pub enum RoamingTarget {
    /// Invisible entity the camera follows
    Camera,
    Model(ModelRoamingOptions),
}

/// Camera placement relative to the roaming entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewMode {
    /// Host tracks the moving entity
    Track,
    /// Fit from straight above
    Overhead,
    /// Fit from the side, 8 km away
    Oblique,
    /// Fit with heading/pitch in degrees and range in meters (0 = fit)
    Custom { heading: f64, pitch: f64, range: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoamingState {
    Idle,
    Configured,
    Running,
    Paused,
    Stopped,
}

// ============================================================================
// Telemetry fan-out
// ============================================================================

type TelemetryCallback = Box<dyn FnMut(&RoamingTelemetry) + Send>;

#[derive(Default)]
struct TelemetryHub {
    latest: Option<RoamingTelemetry>,
    callback: Option<TelemetryCallback>,
}

/// Store `telemetry` and hand it to the callback. The callback runs without
/// the hub lock held, but inside the caller's host lock.
fn publish(hub: &Mutex<TelemetryHub>, telemetry: RoamingTelemetry) {
    let callback = match hub.lock() {
        Ok(mut hub) => {
            hub.latest = Some(telemetry);
            hub.callback.take()
        }
        Err(_) => return,
    };

    if let Some(mut callback) = callback {
        callback(&telemetry);
        if let Ok(mut hub) = hub.lock() {
            // Keep a callback registered while this one ran
            if hub.callback.is_none() {
                hub.callback = Some(callback);
            }
        }
    }
}

// ============================================================================
// Session
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mover {
    Camera,
    Model,
}

/// Session state reachable from hooks and terrain completions.
struct SessionData {
    generation: u64,
    entity: EntityKey,
    mover: Mover,
    path: Arc<Mutex<SampledPosition>>,
    trail: Option<Arc<Mutex<Vec<DVec3>>>>,
    cone_length: Option<Arc<Mutex<f64>>>,
    clamp_to_ground: bool,
    clamp_to_tileset: bool,
    terrain: TerrainElevation,
    start: SceneTime,
    duration: f64,
    total_length: f64,
}

struct RoamingSession {
    data: Arc<SessionData>,
    /// Moving entity first
    owned: Vec<EntityKey>,
    trail_entity: Option<EntityKey>,
    cone_entity: Option<EntityKey>,
    subscription: Subscription,
    prior_clock: ClockSettings,
}

/// The session behind `weak`, if it is still the current one.
fn live_session(weak: &Weak<SessionData>, current: &AtomicU64) -> Option<Arc<SessionData>> {
    let data = weak.upgrade()?;
    (current.load(Ordering::SeqCst) == data.generation).then_some(data)
}

impl SessionData {
    fn position_at(&self, time: SceneTime) -> Option<DVec3> {
        self.path.lock().ok()?.value(time)
    }

    fn add_sample(&self, time: SceneTime, position: DVec3) {
        if let Ok(mut path) = self.path.lock() {
            path.add_sample(time, position);
        }
    }

    /// Pre-update work for one frame.
    fn on_frame(self: &Arc<Self>, host: &mut dyn SceneHost, current: &Arc<AtomicU64>, hub: &Arc<Mutex<TelemetryHub>>) {
        if !host.clock().should_animate {
            return;
        }
        let time = host.clock().current_time;
        let Some(center) = self.position_at(time) else {
            return;
        };

        match self.mover {
            Mover::Camera => {
                let offset = HeadingPitchRange::from_degrees(FOLLOW_HEADING_DEG, FOLLOW_PITCH_DEG, FOLLOW_RANGE);
                if let Err(e) = host.look_at(center, offset) {
                    crate::geovis_trace!("geovis::Roaming", "Camera follow skipped: {}", e);
                }
            }
            Mover::Model => {
                if let Some(trail) = &self.trail {
                    if let Ok(mut trail) = trail.lock() {
                        // A parked clock repeats the end point
                        if trail.last() != Some(&center) {
                            trail.push(center);
                        }
                    }
                }

                if self.clamp_to_ground && self.terrain == TerrainElevation::Available {
                    self.request_ground_clamp(host, center, current);
                }

                if self.clamp_to_tileset {
                    if let Some(clamped) = host.clamp_to_height(center, &[self.entity]) {
                        self.add_sample(time, clamped);
                    }
                }

                if let Some(cone_length) = &self.cone_length {
                    if let (Some(carto), Ok(mut length)) =
                        (host.ellipsoid().cartesian_to_cartographic(center), cone_length.lock())
                    {
                        *length = carto.height;
                    }
                }
            }
        }

        self.update_telemetry(host, center, current, hub);
    }

    /// Ask for the terrain height under `center`; the completion appends a
    /// corrected sample at the clock time it runs at.
    fn request_ground_clamp(self: &Arc<Self>, host: &mut dyn SceneHost, center: DVec3, current: &Arc<AtomicU64>) {
        let Some(carto) = host.ellipsoid().cartesian_to_cartographic(center) else {
            return;
        };
        let weak = Arc::downgrade(self);
        let current = Arc::clone(current);

        host.sample_terrain_most_detailed(
            vec![carto],
            Box::new(move |host: &mut dyn SceneHost, sampled: Vec<Cartographic>| {
                let Some(data) = live_session(&weak, &current) else {
                    crate::geovis_trace!("geovis::Roaming", "Dropped stale ground sample");
                    return;
                };
                if let Some(ground) = sampled.first() {
                    let position = host.ellipsoid().cartographic_to_cartesian(ground);
                    data.add_sample(host.clock().current_time, position);
                }
            }),
        );
    }

    fn update_telemetry(
        self: &Arc<Self>,
        host: &mut dyn SceneHost,
        center: DVec3,
        current: &Arc<AtomicU64>,
        hub: &Arc<Mutex<TelemetryHub>>,
    ) {
        let clock = host.clock();
        let elapsed = clock.current_time - self.start;
        let progress = progress_fraction(elapsed, self.duration);
        let carto = host.ellipsoid().cartesian_to_cartographic(center).unwrap_or_default();

        let mut telemetry = RoamingTelemetry {
            animating: clock.should_animate,
            total_time: self.duration,
            elapsed,
            remaining: (self.duration - elapsed).max(0.0),
            total_length: self.total_length,
            traveled_length: self.total_length * progress,
            progress,
            longitude: carto.longitude_degrees(),
            latitude: carto.latitude_degrees(),
            height: carto.height,
            terrain_height: 0.0,
            clearance: carto.height,
            fields: TelemetryFields::TIMING | TelemetryFields::PROGRESS | TelemetryFields::POSITION,
        };

        match self.terrain {
            TerrainElevation::Unavailable => {
                telemetry.fields |= TelemetryFields::TERRAIN;
                publish(hub, telemetry);
            }
            TerrainElevation::Available => {
                let weak = Arc::downgrade(self);
                let current = Arc::clone(current);
                let hub = Arc::clone(hub);
                host.sample_terrain_most_detailed(
                    vec![carto],
                    Box::new(move |_: &mut dyn SceneHost, sampled: Vec<Cartographic>| {
                        if live_session(&weak, &current).is_none() {
                            return;
                        }
                        let Some(ground) = sampled.first() else {
                            return;
                        };
                        telemetry.terrain_height = ground.height;
                        telemetry.clearance = telemetry.height - ground.height;
                        telemetry.fields |= TelemetryFields::TERRAIN;
                        publish(&hub, telemetry);
                    }),
                );
            }
        }
    }
}

// ============================================================================
// RoamingController
// ============================================================================

/// Path roaming over a host scene.
///
/// # Example
///
/// ```no_run
/// use geovis_runtime::geovis::roaming::{RoamingController, RoamingOptions, RoamingTarget};
/// # fn demo(scene: geovis_runtime::geovis::host::SceneHandle, path: Vec<glam::DVec3>) -> geovis_runtime::geovis::Result<()> {
/// let mut roaming = RoamingController::new(scene, RoamingOptions::default());
/// roaming.on_telemetry(|t| println!("{}", t));
/// roaming.start(&path, 360.0, RoamingTarget::Camera)?;
/// // ... frames ...
/// roaming.stop();
/// # Ok(())
/// # }
/// ```
pub struct RoamingController {
    scene: SceneHandle,
    options: RoamingOptions,
    state: RoamingState,
    generation: Arc<AtomicU64>,
    session: Option<RoamingSession>,
    telemetry: Arc<Mutex<TelemetryHub>>,
}

impl RoamingController {
    pub fn new(scene: SceneHandle, options: RoamingOptions) -> Self {
        Self {
            scene,
            options,
            state: RoamingState::Configured,
            generation: Arc::new(AtomicU64::new(0)),
            session: None,
            telemetry: Arc::new(Mutex::new(TelemetryHub::default())),
        }
    }

    /// Controller with default options, not yet configured.
    pub fn idle(scene: SceneHandle) -> Self {
        let mut controller = Self::new(scene, RoamingOptions::default());
        controller.state = RoamingState::Idle;
        controller
    }

    /// Replace the options used by the next `start`.
    pub fn configure(&mut self, options: RoamingOptions) {
        self.options = options;
        if self.state == RoamingState::Idle {
            self.state = RoamingState::Configured;
        }
    }

    pub fn options(&self) -> &RoamingOptions {
        &self.options
    }

    pub fn state(&self) -> RoamingState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Moving entity of the current session.
    pub fn entity(&self) -> Option<EntityKey> {
        self.session.as_ref().map(|s| s.data.entity)
    }

    pub fn trail_entity(&self) -> Option<EntityKey> {
        self.session.as_ref().and_then(|s| s.trail_entity)
    }

    pub fn scan_cone_entity(&self) -> Option<EntityKey> {
        self.session.as_ref().and_then(|s| s.cone_entity)
    }

    /// Every entity the current session added.
    pub fn owned_entities(&self) -> Vec<EntityKey> {
        self.session.as_ref().map(|s| s.owned.clone()).unwrap_or_default()
    }

    /// Snapshot of the sampled path.
    pub fn path_samples(&self) -> Vec<TimeSample> {
        self.session
            .as_ref()
            .and_then(|s| s.data.path.lock().ok().map(|p| p.samples().to_vec()))
            .unwrap_or_default()
    }

    pub fn interpolation(&self) -> Option<Interpolation> {
        let session = self.session.as_ref()?;
        let path = session.data.path.lock().ok()?;
        Some(path.interpolation())
    }

    /// Positions collected by the trail so far.
    pub fn trail_positions(&self) -> Vec<DVec3> {
        self.session
            .as_ref()
            .and_then(|s| s.data.trail.as_ref())
            .and_then(|trail| trail.lock().ok().map(|t| t.clone()))
            .unwrap_or_default()
    }

    pub fn scan_cone_length(&self) -> Option<f64> {
        let cone = self.session.as_ref()?.data.cone_length.as_ref()?;
        cone.lock().ok().map(|l| *l)
    }

    /// Total path length of the current session.
    pub fn total_length(&self) -> Option<f64> {
        self.session.as_ref().map(|s| s.data.total_length)
    }

    // ===== TELEMETRY =====

    /// Register the telemetry-changed callback, replacing any previous one.
    ///
    /// The callback runs from the scene's frame hooks while the host lock is
    /// held. It may read `telemetry()` or `state()`, but calling a method
    /// that locks the scene (`pause`, `set_speed`, `change_view`, `stop`,
    /// ...) from inside it deadlocks.
    pub fn on_telemetry<F>(&mut self, callback: F)
    where
        F: FnMut(&RoamingTelemetry) + Send + 'static,
    {
        if let Ok(mut hub) = self.telemetry.lock() {
            hub.callback = Some(Box::new(callback));
        }
    }

    /// Last published snapshot.
    pub fn telemetry(&self) -> Option<RoamingTelemetry> {
        self.telemetry.lock().ok().and_then(|hub| hub.latest)
    }

    // ===== LIFECYCLE =====

    /// Start roaming along `path` over `duration` seconds.
    ///
    /// Paths with fewer than two points and non-positive durations are
    /// ignored with a warning. A running session is stopped first.
    pub fn start(&mut self, path: &[DVec3], duration: f64, target: RoamingTarget) -> Result<()> {
        if path.len() < 2 {
            crate::geovis_warn!("geovis::Roaming", "Ignoring start: path has {} point(s)", path.len());
            return Ok(());
        }
        if duration.is_nan() || duration <= 0.0 {
            crate::geovis_warn!("geovis::Roaming", "Ignoring start: duration {} s", duration);
            return Ok(());
        }

        self.stop();

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut host = lock_scene(&self.scene)?;

        let start = self.options.start_time.unwrap_or_else(SceneTime::now);
        let stop = start + duration;

        let interpolation = match &target {
            RoamingTarget::Camera => CAMERA_INTERPOLATION,
            RoamingTarget::Model(model) if model.interpolate && !model.clamp_to_ground => {
                SMOOTH_MODEL_INTERPOLATION
            }
            RoamingTarget::Model(_) => Interpolation::Linear,
        };

        let mut sampled = SampledPosition::new(interpolation);
        let step = duration / path.len() as f64;
        for (i, point) in path.iter().enumerate() {
            let time = if i == path.len() - 1 { stop } else { start + i as f64 * step };
            let position = if self.options.clamp_to_tileset {
                host.clamp_to_height(*point, &[]).unwrap_or(*point)
            } else {
                *point
            };
            sampled.add_sample(time, position);
        }
        let path_property = Arc::new(Mutex::new(sampled));

        let prior_clock = host.clock().settings();
        {
            let clock = host.clock_mut();
            clock.start_time = start;
            clock.stop_time = stop;
            clock.current_time = start;
            clock.clock_range = if self.options.looped { ClockRange::LoopStop } else { ClockRange::Clamped };
            clock.multiplier = self.options.multiplier;
            clock.should_animate = true;
        }

        let total_length = path_length(host.ellipsoid(), path);

        let mut owned = Vec::new();
        let built = Self::add_entities(
            &mut *host,
            &target,
            &path_property,
            TimeInterval::new(start, stop),
            &mut owned,
        );
        let (entity, trail, cone_length, trail_entity, cone_entity) = match built {
            Ok(parts) => parts,
            Err(e) => {
                for key in owned {
                    let _ = host.remove_entity(key);
                }
                host.clock_mut().apply(&prior_clock);
                return Err(e);
            }
        };

        let (mover, clamp_to_ground) = match &target {
            RoamingTarget::Camera => (Mover::Camera, false),
            RoamingTarget::Model(model) => (Mover::Model, model.clamp_to_ground),
        };

        let data = Arc::new(SessionData {
            generation,
            entity,
            mover,
            path: path_property,
            trail,
            cone_length,
            clamp_to_ground,
            clamp_to_tileset: self.options.clamp_to_tileset,
            terrain: self.options.terrain,
            start,
            duration,
            total_length,
        });

        let weak = Arc::downgrade(&data);
        let current = Arc::clone(&self.generation);
        let hub = Arc::clone(&self.telemetry);
        let subscribed = host.subscribe(
            FrameEvent::PreUpdate,
            Box::new(move |host: &mut dyn SceneHost| {
                if let Some(data) = live_session(&weak, &current) {
                    data.on_frame(host, &current, &hub);
                }
            }),
        );
        let hook = match subscribed {
            Ok(hook) => hook,
            Err(e) => {
                for key in owned {
                    let _ = host.remove_entity(key);
                }
                host.clock_mut().apply(&prior_clock);
                return Err(e);
            }
        };

        let session = RoamingSession {
            data,
            owned,
            trail_entity,
            cone_entity,
            subscription: Subscription::new(hook),
            prior_clock,
        };

        match mover {
            Mover::Camera => {
                if let Err(e) = host.track_entity(Some(entity)) {
                    crate::geovis_warn!("geovis::Roaming", "Failed to track roaming entity: {}", e);
                }
            }
            Mover::Model => {
                if let Err(e) = Self::apply_view(&mut *host, &session, ViewMode::Overhead) {
                    crate::geovis_warn!("geovis::Roaming", "Failed to frame roaming entities: {}", e);
                }
            }
        }
        drop(host);

        crate::geovis_info!(
            "geovis::Roaming",
            "Roaming started: {} points over {} s ({:.3} m)",
            path.len(),
            duration,
            total_length
        );

        self.session = Some(session);
        self.state = RoamingState::Running;
        Ok(())
    }

    /// Add the moving entity and its companions.
    #[allow(clippy::type_complexity)]
    fn add_entities(
        host: &mut dyn SceneHost,
        target: &RoamingTarget,
        path: &Arc<Mutex<SampledPosition>>,
        availability: TimeInterval,
        owned: &mut Vec<EntityKey>,
    ) -> Result<(
        EntityKey,
        Option<Arc<Mutex<Vec<DVec3>>>>,
        Option<Arc<Mutex<f64>>>,
        Option<EntityKey>,
        Option<EntityKey>,
    )> {
        let provider: Arc<dyn PositionProvider> = path.clone();
        let position = PositionSource::Provider(Arc::clone(&provider));
        let orientation = OrientationSource::Velocity(PositionSource::Provider(Arc::clone(&provider)));

        let model = match target {
            RoamingTarget::Camera => {
                let mut desc = EntityDesc::named("RoamingCamera");
                desc.position = Some(position);
                desc.orientation = Some(orientation);
                desc.availability = Some(availability);
                let entity = host.add_entity(desc)?;
                owned.push(entity);
                return Ok((entity, None, None, None, None));
            }
            RoamingTarget::Model(model) => model,
        };

        let mut desc = EntityDesc::named("RoamingModel");
        desc.position = Some(position.clone());
        desc.orientation = Some(orientation.clone());
        desc.availability = Some(availability);
        desc.model = Some(model.model.clone());
        desc.label = model.label.clone();
        desc.path = model.path.clone();
        let entity = host.add_entity(desc)?;
        owned.push(entity);

        let (trail, trail_entity) = match &model.trail {
            Some(options) => {
                let buffer = Arc::new(Mutex::new(Vec::new()));
                let reader = Arc::clone(&buffer);
                let mut desc = EntityDesc::named("RoamingTrail");
                desc.polyline = Some(PolylineGraphics {
                    positions: Property::callback(move |_| {
                        reader.lock().map(|positions| positions.clone()).unwrap_or_default()
                    }),
                    width: options.width,
                    material: options.material.clone(),
                    clamp_to_ground: false,
                });
                let key = host.add_entity(desc)?;
                owned.push(key);
                (Some(buffer), Some(key))
            }
            None => (None, None),
        };

        let (cone_length, cone_entity) = match &model.scan_cone {
            Some(options) => {
                let length = Arc::new(Mutex::new(0.0));
                let reader = Arc::clone(&length);
                let mut desc = EntityDesc::named("RoamingScanCone");
                desc.position = Some(position);
                desc.orientation = Some(orientation);
                desc.cylinder = Some(CylinderGraphics {
                    length: Property::callback(move |_| reader.lock().map(|l| *l).unwrap_or(0.0)),
                    top_radius: options.top_radius,
                    bottom_radius: options.bottom_radius,
                    material: options.material.clone(),
                });
                let key = host.add_entity(desc)?;
                owned.push(key);
                (Some(length), Some(key))
            }
            None => (None, None),
        };

        Ok((entity, trail, cone_length, trail_entity, cone_entity))
    }

    fn apply_view(host: &mut dyn SceneHost, session: &RoamingSession, mode: ViewMode) -> Result<()> {
        host.track_entity(None)?;

        let offset = match mode {
            ViewMode::Track => return host.track_entity(Some(session.data.entity)),
            ViewMode::Overhead => HeadingPitchRange::from_degrees(0.0, -90.0, 0.0),
            ViewMode::Oblique => HeadingPitchRange::from_degrees(-90.0, -15.0, OBLIQUE_RANGE),
            ViewMode::Custom { heading, pitch, range } => HeadingPitchRange::from_degrees(heading, pitch, range),
        };
        host.fit_entities(&session.owned, offset)
    }

    /// Move the camera relative to the roaming entities.
    pub fn change_view(&mut self, mode: ViewMode) -> Result<()> {
        let Some(session) = &self.session else {
            crate::geovis_warn!("geovis::Roaming", "change_view without an active session");
            return Ok(());
        };
        let mut host = lock_scene(&self.scene)?;
        Self::apply_view(&mut *host, session, mode)
    }

    /// Pause or resume the shared clock.
    pub fn set_paused(&mut self, paused: bool) -> Result<()> {
        let mut host = lock_scene(&self.scene)?;
        host.clock_mut().should_animate = !paused;
        drop(host);

        if self.session.is_some() {
            self.state = if paused { RoamingState::Paused } else { RoamingState::Running };
        }
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.set_paused(true)
    }

    pub fn resume(&mut self) -> Result<()> {
        self.set_paused(false)
    }

    /// Set the clock rate.
    pub fn set_speed(&mut self, multiplier: f64) -> Result<()> {
        let mut host = lock_scene(&self.scene)?;
        host.clock_mut().multiplier = multiplier;
        self.options.multiplier = multiplier;
        Ok(())
    }

    /// End the session: unhook, hand back the clock settings captured at
    /// `start` (paused), remove every owned entity. Idempotent.
    pub fn stop(&mut self) {
        let Some(mut session) = self.session.take() else {
            return;
        };
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state = RoamingState::Stopped;

        let mut host = match lock_scene(&self.scene) {
            Ok(host) => host,
            Err(e) => {
                session.subscription.forget();
                crate::geovis_warn!("geovis::Roaming", "Roaming state reset without host: {}", e);
                return;
            }
        };
        if host.is_destroyed() {
            session.subscription.forget();
            crate::geovis_warn!("geovis::Roaming", "Scene already destroyed, roaming state reset");
            return;
        }

        session.subscription.release(&mut *host);
        host.clock_mut().apply(&ClockSettings {
            should_animate: false,
            ..session.prior_clock
        });
        for key in session.owned {
            if let Err(e) = host.remove_entity(key) {
                crate::geovis_warn!("geovis::Roaming", "Failed to remove roaming entity: {}", e);
            }
        }
        if let Err(e) = host.track_entity(None) {
            crate::geovis_warn!("geovis::Roaming", "Failed to clear tracking: {}", e);
        }

        crate::geovis_info!("geovis::Roaming", "Roaming stopped");
    }
}

impl Drop for RoamingController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "roaming_tests.rs"]
mod tests;
