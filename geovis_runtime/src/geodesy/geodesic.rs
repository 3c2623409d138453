/// Geodesic between two points on an ellipsoid (Vincenty inverse solution).

use std::f64::consts::PI;
use super::cartographic::Cartographic;
use super::ellipsoid::Ellipsoid;

const CONVERGENCE: f64 = 1e-12;
const MAX_ITERATIONS: usize = 200;

/// Shortest path between two cartographic points, heights ignored.
#[derive(Debug, Clone, Copy)]
pub struct EllipsoidGeodesic {
    start: Cartographic,
    end: Cartographic,
    distance: f64,
    start_heading: f64,
}

impl EllipsoidGeodesic {
    /// Solve the inverse problem on `ellipsoid`.
    ///
    /// Coincident points yield a distance of 0. Nearly antipodal points
    /// that fail to converge keep the last iterate.
    pub fn new(ellipsoid: &Ellipsoid, start: Cartographic, end: Cartographic) -> Self {
        let radii = ellipsoid.radii();
        let a = radii.x;
        let b = radii.z;
        let f = (a - b) / a;

        let l = end.longitude - start.longitude;
        let u1 = ((1.0 - f) * start.latitude.tan()).atan();
        let u2 = ((1.0 - f) * end.latitude.tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = l;
        let mut sin_sigma = 0.0;
        let mut cos_sigma = 1.0;
        let mut sigma = 0.0;
        let mut cos_sq_alpha = 1.0;
        let mut cos_2sigma_m = 0.0;

        for _ in 0..MAX_ITERATIONS {
            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let t1 = cos_u2 * sin_lambda;
            let t2 = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
            sin_sigma = (t1 * t1 + t2 * t2).sqrt();
            if sin_sigma == 0.0 {
                return Self { start, end, distance: 0.0, start_heading: 0.0 };
            }
            cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            sigma = sin_sigma.atan2(cos_sigma);

            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
            // Equatorial line
            cos_2sigma_m = if cos_sq_alpha != 0.0 {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            } else {
                0.0
            };

            let c = f / 16.0 * cos_sq_alpha * (4.0 + f * (4.0 - 3.0 * cos_sq_alpha));
            let previous = lambda;
            lambda = l + (1.0 - c) * f * sin_alpha
                * (sigma + c * sin_sigma
                    * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

            if (lambda - previous).abs() <= CONVERGENCE {
                break;
            }
        }

        let u_sq = cos_sq_alpha * (a * a - b * b) / (b * b);
        let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
        let delta_sigma = big_b * sin_sigma
            * (cos_2sigma_m + big_b / 4.0
                * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                    - big_b / 6.0 * cos_2sigma_m
                        * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                        * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

        let distance = b * big_a * (sigma - delta_sigma);

        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let start_heading = (cos_u2 * sin_lambda)
            .atan2(cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda)
            .rem_euclid(2.0 * PI);

        Self { start, end, distance, start_heading }
    }

    /// Surface distance in meters.
    pub fn surface_distance(&self) -> f64 {
        self.distance
    }

    /// Initial heading (radians clockwise from north).
    pub fn start_heading(&self) -> f64 {
        self.start_heading
    }

    pub fn start(&self) -> &Cartographic {
        &self.start
    }

    pub fn end(&self) -> &Cartographic {
        &self.end
    }
}

#[cfg(test)]
#[path = "geodesic_tests.rs"]
mod tests;
