/// SampledPosition - positions sampled over time, interpolated between
/// samples.
///
/// Samples stay sorted by time. Adding a sample at an existing time
/// replaces it. Evaluation outside the sampled interval yields `None`.

use glam::DVec3;
use crate::host::{PositionProvider, SceneTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Interpolation {
    #[default]
    Linear,
    /// Polynomial through `degree + 1` neighboring samples, built from
    /// divided differences (no derivative samples)
    Hermite { degree: usize },
    /// Polynomial through `degree + 1` neighboring samples, Lagrange form
    Lagrange { degree: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeSample {
    pub time: SceneTime,
    pub position: DVec3,
}

#[derive(Debug, Clone, Default)]
pub struct SampledPosition {
    samples: Vec<TimeSample>,
    interpolation: Interpolation,
}

impl SampledPosition {
    pub fn new(interpolation: Interpolation) -> Self {
        Self { samples: Vec::new(), interpolation }
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    /// Insert keeping time order.
    pub fn add_sample(&mut self, time: SceneTime, position: DVec3) {
        let index = self.samples.partition_point(|s| s.time < time);
        match self.samples.get_mut(index) {
            Some(existing) if existing.time == time => existing.position = position,
            _ => self.samples.insert(index, TimeSample { time, position }),
        }
    }

    pub fn samples(&self) -> &[TimeSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn start_time(&self) -> Option<SceneTime> {
        self.samples.first().map(|s| s.time)
    }

    pub fn stop_time(&self) -> Option<SceneTime> {
        self.samples.last().map(|s| s.time)
    }

    /// Interpolated position at `time`.
    pub fn value(&self, time: SceneTime) -> Option<DVec3> {
        let first = self.samples.first()?;
        let last = self.samples.last()?;
        if time < first.time || time > last.time {
            return None;
        }

        // Index of the first sample at or after `time`
        let upper = self.samples.partition_point(|s| s.time < time);
        let sample = &self.samples[upper];
        if sample.time == time || upper == 0 {
            return Some(sample.position);
        }

        match self.interpolation {
            Interpolation::Linear => {
                let a = &self.samples[upper - 1];
                let t = (time - a.time) / (sample.time - a.time);
                Some(a.position.lerp(sample.position, t))
            }
            Interpolation::Hermite { degree } => {
                let window = self.window(upper, degree);
                Some(newton_polynomial(window, time))
            }
            Interpolation::Lagrange { degree } => {
                let window = self.window(upper, degree);
                Some(lagrange_polynomial(window, time))
            }
        }
    }

    /// `degree + 1` samples around the interval ending at `upper`, shifted
    /// to stay inside the sample range.
    fn window(&self, upper: usize, degree: usize) -> &[TimeSample] {
        let count = (degree + 1).min(self.samples.len());
        let last_start = self.samples.len() - count;
        let start = upper.saturating_sub(count / 2).min(last_start);
        &self.samples[start..start + count]
    }
}

impl PositionProvider for SampledPosition {
    fn position_at(&self, time: SceneTime) -> Option<DVec3> {
        self.value(time)
    }
}

/// Lagrange basis evaluation. Times are taken relative to the first
/// sample of the window.
fn lagrange_polynomial(window: &[TimeSample], time: SceneTime) -> DVec3 {
    let origin = window[0].time;
    let x = time - origin;
    let xs: Vec<f64> = window.iter().map(|s| s.time - origin).collect();

    let mut result = DVec3::ZERO;
    for (i, sample) in window.iter().enumerate() {
        let mut basis = 1.0;
        for (j, xj) in xs.iter().enumerate() {
            if i != j {
                basis *= (x - xj) / (xs[i] - xj);
            }
        }
        result += sample.position * basis;
    }
    result
}

/// Newton divided differences, evaluated with Horner's scheme.
fn newton_polynomial(window: &[TimeSample], time: SceneTime) -> DVec3 {
    let origin = window[0].time;
    let x = time - origin;
    let xs: Vec<f64> = window.iter().map(|s| s.time - origin).collect();
    let mut coefficients: Vec<DVec3> = window.iter().map(|s| s.position).collect();

    let n = coefficients.len();
    for level in 1..n {
        for i in (level..n).rev() {
            coefficients[i] = (coefficients[i] - coefficients[i - 1]) / (xs[i] - xs[i - level]);
        }
    }

    let mut result = coefficients[n - 1];
    for i in (0..n - 1).rev() {
        result = result * (x - xs[i]) + coefficients[i];
    }
    result
}

#[cfg(test)]
#[path = "sampled_position_tests.rs"]
mod tests;
