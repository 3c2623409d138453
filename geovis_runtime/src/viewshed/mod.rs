//! Viewshed module - line-of-sight analysis from an observer point.

mod viewshed;

pub use viewshed::{
    compute_visibility, light_camera, surface_point, ViewshedAnalysis, VisibilitySamples,
    SAMPLE_SEGMENTS,
};
