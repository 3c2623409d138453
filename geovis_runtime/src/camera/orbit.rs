/// Clock-driven camera controllers.
///
/// - `OrbitController`: circles the camera around a point at a fixed range
/// - `SpinController`: turns the camera heading in place
///
/// Both advance by `360° / period` per second of clock time, so they follow
/// the clock multiplier and stand still while the clock is paused.

use std::f64::consts::TAU;
use glam::DVec3;
use crate::error::{Error, Result};
use crate::geodesy::HeadingPitchRoll;
use crate::host::{lock_scene, FrameEvent, SceneHandle, SceneHost, SceneTime, Subscription};

/// Seconds per revolution when none is given
const DEFAULT_PERIOD: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitOptions {
    /// Orbit center; the view center when `None`
    pub center: Option<DVec3>,
    /// Camera range; the current camera distance when `None`
    pub distance: Option<f64>,
    /// Seconds per revolution
    pub period: f64,
}

impl Default for OrbitOptions {
    fn default() -> Self {
        Self { center: None, distance: None, period: DEFAULT_PERIOD }
    }
}

/// Heading reached `elapsed` seconds after `start` at one turn per `period`.
fn heading_at(initial: f64, elapsed: f64, period: f64) -> f64 {
    initial + elapsed * TAU / period
}

fn valid_period(period: f64) -> f64 {
    if period > 0.0 && period.is_finite() { period } else { DEFAULT_PERIOD }
}

/// Release `subscription` against `scene`, or drop it if the host is gone.
fn release(scene: &SceneHandle, subscription: &mut Subscription) {
    if !subscription.is_active() {
        return;
    }
    match lock_scene(scene) {
        Ok(mut host) if !host.is_destroyed() => {
            subscription.release(&mut *host);
        }
        _ => subscription.forget(),
    }
}

// ============================================================================
// OrbitController
// ============================================================================

pub struct OrbitController {
    scene: SceneHandle,
    subscription: Subscription,
}

impl OrbitController {
    pub fn new(scene: SceneHandle) -> Self {
        Self { scene, subscription: Subscription::default() }
    }

    pub fn is_running(&self) -> bool {
        self.subscription.is_active()
    }

    /// Start orbiting. A running orbit is stopped first.
    pub fn start(&mut self, options: OrbitOptions) -> Result<()> {
        self.stop();

        let mut host = lock_scene(&self.scene)?;
        let center = match options.center {
            Some(center) => center,
            None => crate::transform::center_target(&*host).ok_or_else(|| {
                Error::InvalidConfiguration("no orbit center under the view".to_string())
            })?,
        };

        let camera = host.camera();
        let distance = options.distance.unwrap_or_else(|| center.distance(camera.position));
        let period = valid_period(options.period);
        let initial = camera.heading_pitch_roll(host.ellipsoid());
        let start_time = host.clock().current_time;

        let key = host.subscribe(
            FrameEvent::ClockTick,
            Box::new(move |host: &mut dyn SceneHost| {
                let elapsed = host.clock().current_time - start_time;
                let orientation = HeadingPitchRoll::new(
                    heading_at(initial.heading, elapsed, period),
                    initial.pitch,
                    0.0,
                );
                let moved = host
                    .set_view(center, orientation)
                    .and_then(|_| host.move_backward(distance));
                if let Err(e) = moved {
                    crate::geovis_trace!("geovis::Orbit", "Orbit step skipped: {}", e);
                }
            }),
        )?;
        drop(host);

        self.subscription = Subscription::new(key);
        crate::geovis_debug!("geovis::Orbit", "Orbit started (range {:.1} m, period {} s)", distance, period);
        Ok(())
    }

    /// Stop orbiting. Idempotent.
    pub fn stop(&mut self) {
        release(&self.scene, &mut self.subscription);
    }
}

impl Drop for OrbitController {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// SpinController
// ============================================================================

pub struct SpinController {
    scene: SceneHandle,
    subscription: Subscription,
}

impl SpinController {
    pub fn new(scene: SceneHandle) -> Self {
        Self { scene, subscription: Subscription::default() }
    }

    pub fn is_running(&self) -> bool {
        self.subscription.is_active()
    }

    /// Turn in place, one revolution per `period` seconds.
    pub fn start(&mut self, period: f64) -> Result<()> {
        self.stop();

        let mut host = lock_scene(&self.scene)?;
        let period = valid_period(period);
        let initial = host.camera().heading_pitch_roll(host.ellipsoid());
        let start_time: SceneTime = host.clock().current_time;

        let key = host.subscribe(
            FrameEvent::ClockTick,
            Box::new(move |host: &mut dyn SceneHost| {
                let elapsed = host.clock().current_time - start_time;
                let position = host.camera().position;
                let orientation = HeadingPitchRoll::new(
                    heading_at(initial.heading, elapsed, period),
                    initial.pitch,
                    0.0,
                );
                if let Err(e) = host.set_view(position, orientation) {
                    crate::geovis_trace!("geovis::Orbit", "Spin step skipped: {}", e);
                }
            }),
        )?;
        drop(host);

        self.subscription = Subscription::new(key);
        Ok(())
    }

    pub fn stop(&mut self) {
        release(&self.scene, &mut self.subscription);
    }
}

impl Drop for SpinController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
#[path = "orbit_tests.rs"]
mod tests;
