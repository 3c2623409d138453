/// Time-varying property sources.
///
/// A `Property<T>` is either a constant or a callback evaluated every time
/// the host asks for it. Positions get their own source type so providers
/// with internal state (sampled paths) can be shared with the host.

use std::fmt;
use std::sync::{Arc, Mutex};
use glam::{DQuat, DVec3};
use crate::geodesy::Ellipsoid;
use super::clock::SceneTime;

/// Step used to estimate velocity from a position source.
const VELOCITY_STEP: f64 = 1.0 / 60.0;

/// Constant or callback-evaluated value.
pub enum Property<T> {
    Constant(T),
    Callback(Arc<dyn Fn(SceneTime) -> T + Send + Sync>),
}

impl<T: Clone> Property<T> {
    pub fn constant(value: T) -> Self {
        Property::Constant(value)
    }

    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(SceneTime) -> T + Send + Sync + 'static,
    {
        Property::Callback(Arc::new(f))
    }

    /// Evaluate at `time`.
    pub fn value(&self, time: SceneTime) -> T {
        match self {
            Property::Constant(v) => v.clone(),
            Property::Callback(f) => f(time),
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Property::Constant(_))
    }
}

impl<T: Clone> Clone for Property<T> {
    fn clone(&self) -> Self {
        match self {
            Property::Constant(v) => Property::Constant(v.clone()),
            Property::Callback(f) => Property::Callback(Arc::clone(f)),
        }
    }
}

/// Constants compare by value, callbacks by identity.
impl<T: PartialEq> PartialEq for Property<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Property::Constant(a), Property::Constant(b)) => a == b,
            (Property::Callback(a), Property::Callback(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Property::Constant(v) => f.debug_tuple("Constant").field(v).finish(),
            Property::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

impl<T> From<T> for Property<T> {
    fn from(value: T) -> Self {
        Property::Constant(value)
    }
}

/// Scalar input (lengths, widths)
pub type ScalarSource = Property<f64>;

/// Vertex list input (polyline positions)
pub type PositionsSource = Property<Vec<DVec3>>;

/// Evaluates a position as a function of time.
pub trait PositionProvider: Send + Sync {
    /// `None` outside the provider's domain.
    fn position_at(&self, time: SceneTime) -> Option<DVec3>;
}

impl<P: PositionProvider> PositionProvider for Mutex<P> {
    fn position_at(&self, time: SceneTime) -> Option<DVec3> {
        self.lock().ok()?.position_at(time)
    }
}

/// Where an entity's position comes from.
#[derive(Clone)]
pub enum PositionSource {
    Constant(DVec3),
    Provider(Arc<dyn PositionProvider>),
    Callback(Arc<dyn Fn(SceneTime) -> Option<DVec3> + Send + Sync>),
}

impl PositionSource {
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn(SceneTime) -> Option<DVec3> + Send + Sync + 'static,
    {
        PositionSource::Callback(Arc::new(f))
    }

    pub fn value(&self, time: SceneTime) -> Option<DVec3> {
        match self {
            PositionSource::Constant(p) => Some(*p),
            PositionSource::Provider(provider) => provider.position_at(time),
            PositionSource::Callback(f) => f(time),
        }
    }

    /// Finite-difference velocity (meters per second).
    pub fn velocity(&self, time: SceneTime) -> Option<DVec3> {
        let here = self.value(time)?;
        match self.value(time + VELOCITY_STEP) {
            Some(ahead) => Some((ahead - here) / VELOCITY_STEP),
            // Past the end of the domain: look backward instead
            None => {
                let behind = self.value(time - VELOCITY_STEP)?;
                Some((here - behind) / VELOCITY_STEP)
            }
        }
    }
}

impl fmt::Debug for PositionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionSource::Constant(p) => f.debug_tuple("Constant").field(p).finish(),
            PositionSource::Provider(_) => f.write_str("Provider(..)"),
            PositionSource::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// Where an entity's orientation comes from.
#[derive(Debug, Clone)]
pub enum OrientationSource {
    Constant(DQuat),
    /// x axis along the velocity of the source, z toward local up
    Velocity(PositionSource),
}

impl OrientationSource {
    pub fn value(&self, ellipsoid: &Ellipsoid, time: SceneTime) -> Option<DQuat> {
        match self {
            OrientationSource::Constant(q) => Some(*q),
            OrientationSource::Velocity(source) => {
                let position = source.value(time)?;
                let velocity = source.velocity(time)?;
                ellipsoid.rotation_from_position_velocity(position, velocity)
            }
        }
    }
}

#[cfg(test)]
#[path = "property_tests.rs"]
mod tests;
