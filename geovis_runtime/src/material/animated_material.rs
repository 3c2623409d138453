/// AnimatedMaterial - one procedural surface material parameterized by a
/// `MaterialVariant`.
///
/// Structural parameters (wall axis, scroll direction, repeat count) are
/// baked into the shader source and therefore into the type name. Everything
/// else is a uniform evaluated per frame. Time-varying variants derive their
/// phase from a wall clock so every instance created at the same instant
/// animates in lockstep.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use crate::error::{Error, Result};
use crate::host::{Property, SceneTime};
use super::color::Color;
use super::event::Event;
use super::registry::{MaterialRegistry, ShaderProgram};
use super::shader_source::{self, DEFAULT_IMAGE, TRAIL_RAMP_IMAGE};
use super::uniform::{UniformSet, UniformValue};

/// Trail period for a speed of 1, in milliseconds
const TRAIL_PERIOD_MS: f64 = 3000.0;

// ============================================================================
// Wall clocks
// ============================================================================

/// Source of wall time in milliseconds.
pub trait WallClock: Send + Sync {
    fn now_ms(&self) -> f64;
}

/// Reads the system clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemWallClock;

impl WallClock for SystemWallClock {
    fn now_ms(&self) -> f64 {
        chrono::Utc::now().timestamp_millis() as f64
    }
}

/// Manually driven clock for deterministic evaluation.
#[derive(Debug)]
pub struct FixedWallClock {
    bits: AtomicU64,
}

impl FixedWallClock {
    pub fn new(now_ms: f64) -> Self {
        Self { bits: AtomicU64::new(now_ms.to_bits()) }
    }

    pub fn set(&self, now_ms: f64) {
        self.bits.store(now_ms.to_bits(), Ordering::Relaxed);
    }

    pub fn advance(&self, delta_ms: f64) {
        self.set(self.now_ms() + delta_ms);
    }
}

impl WallClock for FixedWallClock {
    fn now_ms(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Relaxed))
    }
}

// ============================================================================
// Variant descriptors
// ============================================================================

/// Texture scroll axis of a dynamic wall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WallAxis {
    /// Scrolls along the wall height
    #[default]
    Vertical,
    /// Scrolls along the wall length
    Horizontal,
}

impl WallAxis {
    pub fn name(&self) -> &'static str {
        match self {
            WallAxis::Vertical => "vertical",
            WallAxis::Horizontal => "standard",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollDirection {
    Plus,
    #[default]
    Minus,
}

impl ScrollDirection {
    pub fn sign(&self) -> char {
        match self {
            ScrollDirection::Plus => '+',
            ScrollDirection::Minus => '-',
        }
    }
}

/// Per-variant inputs. Durations are milliseconds.
#[derive(Debug, Clone, PartialEq)]
pub enum MaterialVariant {
    /// Radial alpha falloff from the center, no animation
    CircleGradient,
    /// Concentric rings expanding from the center
    CircleWave {
        duration: Property<f64>,
        count: Property<f64>,
        gradient: Property<f64>,
    },
    /// Image scrolling along a wall
    DynamicWall {
        duration: Property<f64>,
        axis: WallAxis,
        direction: ScrollDirection,
        count: f64,
        image: String,
    },
    /// Disc growing then fading out
    EllipsoidFade {
        duration: Property<f64>,
    },
    /// Alpha ramp flowing along a polyline
    PolylineTrail {
        speed: Property<f64>,
        image: String,
    },
}

/// Full material description: variant inputs plus the shared color input.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDesc {
    pub variant: MaterialVariant,
    pub color: Property<Color>,
}

#[derive(Debug, Clone)]
pub struct CircleGradientOptions {
    pub color: Property<Color>,
}

impl Default for CircleGradientOptions {
    fn default() -> Self {
        Self { color: Color::new(1.0, 1.0, 1.0, 0.6).into() }
    }
}

impl From<CircleGradientOptions> for MaterialDesc {
    fn from(options: CircleGradientOptions) -> Self {
        Self { variant: MaterialVariant::CircleGradient, color: options.color }
    }
}

#[derive(Debug, Clone)]
pub struct CircleWaveOptions {
    pub color: Property<Color>,
    pub duration: Property<f64>,
    pub count: Property<f64>,
    /// Ring sharpness in [0, 1]
    pub gradient: Property<f64>,
}

impl Default for CircleWaveOptions {
    fn default() -> Self {
        Self {
            color: Color::RED.into(),
            duration: Property::Constant(1000.0),
            count: Property::Constant(2.0),
            gradient: Property::Constant(0.1),
        }
    }
}

impl From<CircleWaveOptions> for MaterialDesc {
    fn from(options: CircleWaveOptions) -> Self {
        Self {
            variant: MaterialVariant::CircleWave {
                duration: options.duration,
                count: options.count,
                gradient: options.gradient,
            },
            color: options.color,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DynamicWallOptions {
    pub color: Property<Color>,
    /// 0 freezes the texture
    pub duration: Property<f64>,
    pub axis: WallAxis,
    pub direction: ScrollDirection,
    /// Texture repeats along the scroll axis
    pub count: f64,
    pub image: String,
}

impl Default for DynamicWallOptions {
    fn default() -> Self {
        Self {
            color: Color::WHITE.into(),
            duration: Property::Constant(1000.0),
            axis: WallAxis::Vertical,
            direction: ScrollDirection::Minus,
            count: 1.0,
            image: DEFAULT_IMAGE.to_string(),
        }
    }
}

impl From<DynamicWallOptions> for MaterialDesc {
    fn from(options: DynamicWallOptions) -> Self {
        Self {
            variant: MaterialVariant::DynamicWall {
                duration: options.duration,
                axis: options.axis,
                direction: options.direction,
                count: options.count,
                image: options.image,
            },
            color: options.color,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EllipsoidFadeOptions {
    pub color: Property<Color>,
    pub duration: Property<f64>,
}

impl Default for EllipsoidFadeOptions {
    fn default() -> Self {
        Self { color: Color::RED.into(), duration: Property::Constant(1000.0) }
    }
}

impl From<EllipsoidFadeOptions> for MaterialDesc {
    fn from(options: EllipsoidFadeOptions) -> Self {
        Self {
            variant: MaterialVariant::EllipsoidFade { duration: options.duration },
            color: options.color,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PolylineTrailOptions {
    pub color: Property<Color>,
    /// Trail passes per 3 seconds
    pub speed: Property<f64>,
    pub image: String,
}

impl Default for PolylineTrailOptions {
    fn default() -> Self {
        Self {
            color: Color::RED.into(),
            speed: Property::Constant(1.0),
            image: TRAIL_RAMP_IMAGE.to_string(),
        }
    }
}

impl From<PolylineTrailOptions> for MaterialDesc {
    fn from(options: PolylineTrailOptions) -> Self {
        Self {
            variant: MaterialVariant::PolylineTrail { speed: options.speed, image: options.image },
            color: options.color,
        }
    }
}

impl MaterialDesc {
    /// Registry key. Encodes every parameter baked into the shader source.
    pub fn type_name(&self) -> String {
        match &self.variant {
            MaterialVariant::CircleGradient => "CircleGradient".to_string(),
            MaterialVariant::CircleWave { .. } => "CircleWave".to_string(),
            MaterialVariant::DynamicWall { axis, direction, count, .. } => {
                format!("DynamicWall_{}_{}_{}", axis.name(), direction.sign(), count)
            }
            MaterialVariant::EllipsoidFade { .. } => "EllipsoidFade".to_string(),
            MaterialVariant::PolylineTrail { .. } => "PolylineTrail".to_string(),
        }
    }

    fn build_program(&self, type_name: &str) -> ShaderProgram {
        let time = || UniformValue::Float(0.0);
        let (uniforms, source) = match &self.variant {
            MaterialVariant::CircleGradient => (
                UniformSet::new()
                    .with("color", UniformValue::Color(Color::new(1.0, 1.0, 1.0, 0.6))),
                shader_source::CIRCLE_GRADIENT.to_string(),
            ),
            MaterialVariant::CircleWave { .. } => (
                UniformSet::new()
                    .with("color", UniformValue::Color(Color::RED))
                    .with("time", time())
                    .with("count", UniformValue::Float(1.0))
                    .with("gradient", UniformValue::Float(0.1)),
                shader_source::CIRCLE_WAVE.to_string(),
            ),
            MaterialVariant::DynamicWall { axis, direction, count, .. } => (
                UniformSet::new()
                    .with("color", UniformValue::Color(Color::new(1.0, 0.0, 0.0, 0.5)))
                    .with("image", UniformValue::Image(DEFAULT_IMAGE.to_string()))
                    .with("time", time()),
                shader_source::dynamic_wall(*axis, *direction, *count),
            ),
            MaterialVariant::EllipsoidFade { .. } => (
                UniformSet::new()
                    .with("color", UniformValue::Color(Color::RED))
                    .with("time", time()),
                shader_source::ELLIPSOID_FADE.to_string(),
            ),
            MaterialVariant::PolylineTrail { .. } => (
                UniformSet::new()
                    .with("color", UniformValue::Color(Color::RED))
                    .with("time", time())
                    .with("image", UniformValue::Image(TRAIL_RAMP_IMAGE.to_string())),
                shader_source::POLYLINE_TRAIL.to_string(),
            ),
        };

        ShaderProgram {
            type_name: type_name.to_string(),
            uniforms,
            source,
            translucent: true,
        }
    }
}

fn missing_input(type_name: &str, input: &str) -> Error {
    Error::InvalidConfiguration(format!("{} has no '{}' input", type_name, input))
}

// ============================================================================
// AnimatedMaterial
// ============================================================================

/// Raised by `definition_changed` after an input was replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialChange {
    pub property: &'static str,
}

pub struct AnimatedMaterial {
    desc: MaterialDesc,
    type_name: String,
    program: Arc<ShaderProgram>,
    clock: Arc<dyn WallClock>,
    created_ms: f64,
    definition_changed: Event<MaterialChange>,
}

impl AnimatedMaterial {
    /// Build a material and register its program in `registry` if this
    /// type name was never seen.
    pub fn new(desc: impl Into<MaterialDesc>, registry: &mut MaterialRegistry) -> Self {
        Self::with_clock(desc, registry, Arc::new(SystemWallClock))
    }

    pub fn with_clock(
        desc: impl Into<MaterialDesc>,
        registry: &mut MaterialRegistry,
        clock: Arc<dyn WallClock>,
    ) -> Self {
        let desc = desc.into();
        let type_name = desc.type_name();
        let program = registry.ensure_registered(&type_name, || desc.build_program(&type_name));
        let created_ms = clock.now_ms();

        Self {
            desc,
            type_name,
            program,
            clock,
            created_ms,
            definition_changed: Event::new(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn desc(&self) -> &MaterialDesc {
        &self.desc
    }

    pub fn program(&self) -> &Arc<ShaderProgram> {
        &self.program
    }

    /// `false` only when every input is constant and nothing animates.
    pub fn is_time_varying(&self) -> bool {
        !matches!(self.desc.variant, MaterialVariant::CircleGradient)
    }

    pub fn definition_changed(&mut self) -> &mut Event<MaterialChange> {
        &mut self.definition_changed
    }

    // ===== INPUT SETTERS =====

    pub fn set_color(&mut self, color: impl Into<Property<Color>>) {
        let color = color.into();
        if self.desc.color != color {
            self.desc.color = color;
            self.notify("color");
        }
    }

    pub fn set_duration(&mut self, duration: impl Into<Property<f64>>) -> Result<()> {
        let duration = duration.into();
        let slot = match &mut self.desc.variant {
            MaterialVariant::CircleWave { duration, .. }
            | MaterialVariant::DynamicWall { duration, .. }
            | MaterialVariant::EllipsoidFade { duration } => duration,
            _ => return Err(missing_input(&self.type_name, "duration")),
        };
        if Self::replace(slot, duration) {
            self.notify("duration");
        }
        Ok(())
    }

    pub fn set_count(&mut self, count: impl Into<Property<f64>>) -> Result<()> {
        let count = count.into();
        let slot = match &mut self.desc.variant {
            MaterialVariant::CircleWave { count, .. } => count,
            _ => return Err(missing_input(&self.type_name, "count")),
        };
        if Self::replace(slot, count) {
            self.notify("count");
        }
        Ok(())
    }

    pub fn set_gradient(&mut self, gradient: impl Into<Property<f64>>) -> Result<()> {
        let gradient = gradient.into();
        let slot = match &mut self.desc.variant {
            MaterialVariant::CircleWave { gradient, .. } => gradient,
            _ => return Err(missing_input(&self.type_name, "gradient")),
        };
        if Self::replace(slot, gradient) {
            self.notify("gradient");
        }
        Ok(())
    }

    pub fn set_speed(&mut self, speed: impl Into<Property<f64>>) -> Result<()> {
        let speed = speed.into();
        let slot = match &mut self.desc.variant {
            MaterialVariant::PolylineTrail { speed, .. } => speed,
            _ => return Err(missing_input(&self.type_name, "speed")),
        };
        if Self::replace(slot, speed) {
            self.notify("speed");
        }
        Ok(())
    }

    pub fn set_image(&mut self, uri: &str) -> Result<()> {
        let slot = match &mut self.desc.variant {
            MaterialVariant::DynamicWall { image, .. }
            | MaterialVariant::PolylineTrail { image, .. } => image,
            _ => return Err(missing_input(&self.type_name, "image")),
        };
        if slot != uri {
            *slot = uri.to_string();
            self.notify("image");
        }
        Ok(())
    }

    fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
        if *slot == value {
            return false;
        }
        *slot = value;
        true
    }

    fn notify(&self, property: &'static str) {
        self.definition_changed.raise(&MaterialChange { property });
    }

    // ===== EVALUATION =====

    /// Repeating 0→1 ramp over `duration_ms` of wall time.
    fn phase(&self, duration_ms: f64) -> f64 {
        if duration_ms <= 0.0 || !duration_ms.is_finite() {
            return 0.0;
        }
        let elapsed = self.clock.now_ms() - self.created_ms;
        elapsed.rem_euclid(duration_ms) / duration_ms
    }

    /// Uniform values at `time`. Inputs are evaluated at scene time, the
    /// phase at the current wall time.
    pub fn evaluate(&self, time: SceneTime) -> UniformSet {
        let mut uniforms = UniformSet::new()
            .with("color", UniformValue::Color(self.desc.color.value(time)));

        match &self.desc.variant {
            MaterialVariant::CircleGradient => {}
            MaterialVariant::CircleWave { duration, count, gradient } => {
                let sharpness = 1.0 + 10.0 * (1.0 - gradient.value(time));
                uniforms.set("time", UniformValue::Float(self.phase(duration.value(time)) as f32));
                uniforms.set("count", UniformValue::Float(count.value(time) as f32));
                uniforms.set("gradient", UniformValue::Float(sharpness as f32));
            }
            MaterialVariant::DynamicWall { duration, image, .. } => {
                uniforms.set("image", UniformValue::Image(image.clone()));
                let duration = duration.value(time);
                if duration != 0.0 {
                    uniforms.set("time", UniformValue::Float(self.phase(duration) as f32));
                }
            }
            MaterialVariant::EllipsoidFade { duration } => {
                uniforms.set("time", UniformValue::Float(self.phase(duration.value(time)) as f32));
            }
            MaterialVariant::PolylineTrail { speed, image } => {
                let speed = speed.value(time);
                let duration = if speed > 0.0 { TRAIL_PERIOD_MS / speed } else { 0.0 };
                uniforms.set("time", UniformValue::Float(self.phase(duration) as f32));
                uniforms.set("image", UniformValue::Image(image.clone()));
            }
        }

        uniforms
    }
}

/// Same variant with equal inputs. Which inputs count depends on the
/// variant: waves and fades compare color only.
impl PartialEq for AnimatedMaterial {
    fn eq(&self, other: &Self) -> bool {
        if self.desc.color != other.desc.color {
            return false;
        }
        match (&self.desc.variant, &other.desc.variant) {
            (MaterialVariant::CircleGradient, MaterialVariant::CircleGradient)
            | (MaterialVariant::CircleWave { .. }, MaterialVariant::CircleWave { .. })
            | (MaterialVariant::EllipsoidFade { .. }, MaterialVariant::EllipsoidFade { .. }) => true,
            (
                MaterialVariant::DynamicWall { duration: d1, axis: a1, direction: r1, count: c1, .. },
                MaterialVariant::DynamicWall { duration: d2, axis: a2, direction: r2, count: c2, .. },
            ) => d1 == d2 && a1 == a2 && r1 == r2 && c1 == c2,
            (
                MaterialVariant::PolylineTrail { speed: s1, image: i1 },
                MaterialVariant::PolylineTrail { speed: s2, image: i2 },
            ) => s1 == s2 && i1 == i2,
            _ => false,
        }
    }
}

impl std::fmt::Debug for AnimatedMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimatedMaterial")
            .field("type_name", &self.type_name)
            .field("desc", &self.desc)
            .field("listeners", &self.definition_changed.listener_count())
            .finish()
    }
}

#[cfg(test)]
#[path = "animated_material_tests.rs"]
mod tests;
