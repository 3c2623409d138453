/*!
# Geovis Runtime

Scene-analysis and animation engines for a host 3D globe.

The crate drives a host scene through the `SceneHost` trait: it never
renders, it adds entities and primitives, subscribes frame hooks and reads
the shared animation clock. `MockScene` implements the trait over a flat
WGS84 world for headless use.

## Architecture

- **transform**: screen/world picking, view extent, camera parameters,
  draggable position markers
- **material**: time-animated surface materials and their shader registry
- **roaming**: camera or model animation along a timed path, with telemetry
- **viewshed**: line-of-sight fan from an observer, shadow occlusion
- **camera**: camera state, frusta, rays, orbit and spin controllers
- **geodesy**: WGS84 ellipsoid math
*/

// Internal modules
mod error;
mod runtime;
pub mod camera;
pub mod geodesy;
pub mod host;
pub mod log;
pub mod material;
pub mod roaming;
pub mod transform;
pub mod viewshed;

// Main geovis namespace module
pub mod geovis {
    // Error types
    pub use crate::error::{Error, Result};

    // Runtime singleton
    pub use crate::runtime::Runtime;

    // Logging sub-module (types only, macros live at the crate root)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
    }

    pub mod camera {
        pub use crate::camera::*;
    }

    pub mod geodesy {
        pub use crate::geodesy::*;
    }

    pub mod host {
        pub use crate::host::*;
    }

    pub mod material {
        pub use crate::material::*;
    }

    pub mod roaming {
        pub use crate::roaming::*;
    }

    pub mod transform {
        pub use crate::transform::*;
    }

    pub mod viewshed {
        pub use crate::viewshed::*;
    }
}

// Re-export math library at crate root
pub use glam;
