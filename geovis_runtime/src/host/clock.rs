/// Animation clock and scene time.
///
/// The clock is owned by the host. Engines that reconfigure it take a
/// `ClockSettings` snapshot first and hand it back on teardown.

use std::ops::{Add, Sub};
use chrono::Utc;

/// Instant on the scene time line, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct SceneTime(pub f64);

impl SceneTime {
    /// Current wall-clock time (seconds since the Unix epoch).
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis() as f64 / 1000.0)
    }

    pub fn seconds(&self) -> f64 {
        self.0
    }
}

impl Add<f64> for SceneTime {
    type Output = SceneTime;

    fn add(self, seconds: f64) -> SceneTime {
        SceneTime(self.0 + seconds)
    }
}

impl Sub<f64> for SceneTime {
    type Output = SceneTime;

    fn sub(self, seconds: f64) -> SceneTime {
        SceneTime(self.0 - seconds)
    }
}

impl Sub for SceneTime {
    type Output = f64;

    fn sub(self, other: SceneTime) -> f64 {
        self.0 - other.0
    }
}

/// Closed time interval [start, stop].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeInterval {
    pub start: SceneTime,
    pub stop: SceneTime,
}

impl TimeInterval {
    pub fn new(start: SceneTime, stop: SceneTime) -> Self {
        Self { start, stop }
    }

    pub fn contains(&self, time: SceneTime) -> bool {
        time >= self.start && time <= self.stop
    }

    pub fn duration(&self) -> f64 {
        self.stop - self.start
    }
}

/// What the clock does when it runs past `stop_time`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClockRange {
    /// Keep running
    #[default]
    Unbounded,
    /// Hold at the stop time
    Clamped,
    /// Wrap back to the start time
    LoopStop,
}

/// Snapshot of every configurable clock field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClockSettings {
    pub start_time: SceneTime,
    pub stop_time: SceneTime,
    pub current_time: SceneTime,
    pub clock_range: ClockRange,
    pub multiplier: f64,
    pub should_animate: bool,
}

#[derive(Debug, Clone)]
pub struct AnimationClock {
    pub start_time: SceneTime,
    pub stop_time: SceneTime,
    pub current_time: SceneTime,
    pub clock_range: ClockRange,
    pub multiplier: f64,
    pub should_animate: bool,
}

impl AnimationClock {
    /// Paused clock spanning one day from `start`, rate 1.
    pub fn new(start: SceneTime) -> Self {
        Self {
            start_time: start,
            stop_time: start + 86_400.0,
            current_time: start,
            clock_range: ClockRange::Unbounded,
            multiplier: 1.0,
            should_animate: false,
        }
    }

    pub fn settings(&self) -> ClockSettings {
        ClockSettings {
            start_time: self.start_time,
            stop_time: self.stop_time,
            current_time: self.current_time,
            clock_range: self.clock_range,
            multiplier: self.multiplier,
            should_animate: self.should_animate,
        }
    }

    pub fn apply(&mut self, settings: &ClockSettings) {
        self.start_time = settings.start_time;
        self.stop_time = settings.stop_time;
        self.current_time = settings.current_time;
        self.clock_range = settings.clock_range;
        self.multiplier = settings.multiplier;
        self.should_animate = settings.should_animate;
    }

    /// Advance by `dt` wall seconds scaled by the multiplier, then apply
    /// the range policy. A paused clock does not move.
    pub fn tick(&mut self, dt: f64) -> SceneTime {
        if !self.should_animate {
            return self.current_time;
        }

        let mut next = self.current_time + dt * self.multiplier;

        match self.clock_range {
            ClockRange::Unbounded => {}
            ClockRange::Clamped => {
                if next > self.stop_time {
                    next = self.stop_time;
                } else if next < self.start_time {
                    next = self.start_time;
                }
            }
            ClockRange::LoopStop => {
                if next < self.start_time {
                    next = self.start_time;
                }
                if next > self.stop_time {
                    next = self.start_time;
                }
            }
        }

        self.current_time = next;
        next
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new(SceneTime::now())
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
