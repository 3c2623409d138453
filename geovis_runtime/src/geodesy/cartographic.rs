/// Geodetic coordinates and orientation triples.

use std::f64::consts::TAU;

/// Geodetic position: longitude/latitude in radians, height in meters above
/// the ellipsoid.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Cartographic {
    pub longitude: f64,
    pub latitude: f64,
    pub height: f64,
}

impl Cartographic {
    pub fn new(longitude: f64, latitude: f64, height: f64) -> Self {
        Self { longitude, latitude, height }
    }

    /// Build from degrees (longitude, latitude) and meters.
    pub fn from_degrees(longitude: f64, latitude: f64, height: f64) -> Self {
        Self {
            longitude: longitude.to_radians(),
            latitude: latitude.to_radians(),
            height,
        }
    }

    pub fn longitude_degrees(&self) -> f64 {
        self.longitude.to_degrees()
    }

    pub fn latitude_degrees(&self) -> f64 {
        self.latitude.to_degrees()
    }

    /// Same horizontal position, different height.
    pub fn with_height(&self, height: f64) -> Self {
        Self { height, ..*self }
    }
}

/// Orientation relative to the local east-north-up frame (radians).
///
/// Heading is clockwise from north, pitch is positive above the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadingPitchRoll {
    pub heading: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl HeadingPitchRoll {
    pub fn new(heading: f64, pitch: f64, roll: f64) -> Self {
        Self { heading, pitch, roll }
    }

    pub fn from_degrees(heading: f64, pitch: f64, roll: f64) -> Self {
        Self::new(heading.to_radians(), pitch.to_radians(), roll.to_radians())
    }
}

/// Camera offset relative to a target: heading/pitch in radians, range in meters.
///
/// A range of 0 lets the host pick a distance that fits the target bounds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct HeadingPitchRange {
    pub heading: f64,
    pub pitch: f64,
    pub range: f64,
}

impl HeadingPitchRange {
    pub fn new(heading: f64, pitch: f64, range: f64) -> Self {
        Self { heading, pitch, range }
    }

    pub fn from_degrees(heading: f64, pitch: f64, range: f64) -> Self {
        Self::new(heading.to_radians(), pitch.to_radians(), range)
    }
}

/// Round to a fixed number of decimals.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Wrap an angle into [0, 2π].
pub fn zero_to_two_pi(angle: f64) -> f64 {
    if (0.0..=TAU).contains(&angle) {
        return angle;
    }
    let wrapped = angle.rem_euclid(TAU);
    if wrapped == 0.0 && angle != 0.0 {
        TAU
    } else {
        wrapped
    }
}

#[cfg(test)]
#[path = "cartographic_tests.rs"]
mod tests;
