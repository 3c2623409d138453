/// Roaming telemetry: progress, timing and position of the moving object.

use std::fmt;
use bitflags::bitflags;
use glam::DVec3;
use crate::geodesy::{Ellipsoid, EllipsoidGeodesic};

bitflags! {
    /// Which parts of a telemetry snapshot the last update refreshed.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TelemetryFields: u32 {
        const TIMING = 1 << 0;
        const PROGRESS = 1 << 1;
        const POSITION = 1 << 2;
        const TERRAIN = 1 << 3;
    }
}

/// Snapshot of a running roaming session. Times are seconds, lengths and
/// heights meters, angles degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RoamingTelemetry {
    pub animating: bool,
    pub total_time: f64,
    pub elapsed: f64,
    pub remaining: f64,
    pub total_length: f64,
    pub traveled_length: f64,
    /// In [0, 1]
    pub progress: f64,
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
    pub terrain_height: f64,
    /// Height above terrain
    pub clearance: f64,
    pub fields: TelemetryFields,
}

impl RoamingTelemetry {
    pub fn total_time_text(&self) -> String {
        format_duration(self.total_time)
    }

    pub fn elapsed_text(&self) -> String {
        format_duration(self.elapsed)
    }

    pub fn remaining_text(&self) -> String {
        format_duration(self.remaining)
    }

    /// Whole percent, e.g. "42%".
    pub fn progress_text(&self) -> String {
        format!("{:.0}%", self.progress * 100.0)
    }
}

impl fmt::Display for RoamingTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} ({}), {:.3}/{:.3} m, at {:.6}, {:.6}, {:.2} m ({:.2} m above terrain)",
            self.elapsed_text(),
            self.total_time_text(),
            self.progress_text(),
            self.traveled_length,
            self.total_length,
            self.longitude,
            self.latitude,
            self.height,
            self.clearance,
        )
    }
}

/// Hours, minutes and seconds with zero components omitted
/// ("1 h 1 min 1 s", "45 s"). Zero or negative durations give "0 s".
pub fn format_duration(seconds: f64) -> String {
    if seconds.is_nan() || seconds <= 0.0 {
        return "0 s".to_string();
    }

    let h = (seconds / 3600.0).floor() as u64;
    let m = ((seconds % 3600.0) / 60.0).floor() as u64;
    let s = (seconds % 60.0).floor() as u64;

    let mut parts = Vec::new();
    if h > 0 {
        parts.push(format!("{} h", h));
    }
    if m > 0 {
        parts.push(format!("{} min", m));
    }
    if s > 0 {
        parts.push(format!("{} s", s));
    }

    if parts.is_empty() {
        "0 s".to_string()
    } else {
        parts.join(" ")
    }
}

/// Elapsed share of `duration`, clamped to [0, 1].
pub fn progress_fraction(elapsed: f64, duration: f64) -> f64 {
    if duration <= 0.0 {
        return 0.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

/// Sum over segments of `sqrt(surface² + Δheight²)`.
pub fn path_length(ellipsoid: &Ellipsoid, positions: &[DVec3]) -> f64 {
    positions
        .windows(2)
        .filter_map(|pair| {
            let a = ellipsoid.cartesian_to_cartographic(pair[0])?;
            let b = ellipsoid.cartesian_to_cartographic(pair[1])?;
            let surface = EllipsoidGeodesic::new(ellipsoid, a, b).surface_distance();
            Some(surface.hypot(b.height - a.height))
        })
        .sum()
}

#[cfg(test)]
#[path = "telemetry_tests.rs"]
mod tests;
