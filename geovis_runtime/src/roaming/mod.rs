//! Roaming module - path animation of the camera or a model.
//!
//! - `RoamingController`: session lifecycle, view modes, clock control
//! - `SampledPosition`: time-sampled positions with interpolation
//! - `RoamingTelemetry`: progress and position snapshots

mod roaming;
mod sampled_position;
mod telemetry;

pub use roaming::{
    ModelRoamingOptions, RoamingController, RoamingOptions, RoamingState, RoamingTarget,
    ScanConeOptions, TerrainElevation, TrailOptions, ViewMode,
};
pub use sampled_position::{Interpolation, SampledPosition, TimeSample};
pub use telemetry::{format_duration, path_length, progress_fraction, RoamingTelemetry, TelemetryFields};
