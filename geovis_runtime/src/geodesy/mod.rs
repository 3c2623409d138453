//! Geodesy module: WGS84 ellipsoid math.
//!
//! Pure functions only. Positions are Earth-centered, Earth-fixed (ECEF)
//! meters in `DVec3`; geodetic coordinates are radians + meters in
//! `Cartographic`.

mod cartographic;
mod ellipsoid;
mod geodesic;

pub use cartographic::{
    Cartographic, HeadingPitchRoll, HeadingPitchRange,
    round_to, zero_to_two_pi,
};
pub use ellipsoid::{Ellipsoid, WGS84};
pub use geodesic::EllipsoidGeodesic;
