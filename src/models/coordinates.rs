use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Meters per degree of latitude, used by the planar approximation
pub const EARTH_METERS_PER_DEGREE: f64 = 111_320.0;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

// WGS-84
const WGS84_A: f64 = 6_378_137.0;
const WGS84_F: f64 = 1.0 / 298.257_223_563;
const VINCENTY_MAX_ITERATIONS: usize = 200;
const VINCENTY_TOLERANCE: f64 = 1e-12;

/// A pair of degree values: `x` is longitude, `y` is latitude
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub x: f64,
    pub y: f64,
}

/// Distance formula used by [`Coordinates::distance`]
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum DistanceFormula {
    /// Sum of the latitude and longitude offsets in meters. Only meaningful
    /// for short distances inside a city.
    Planar,
    /// Haversine on a spherical earth
    #[default]
    GreatCircle,
    /// Vincenty inverse on the WGS-84 ellipsoid, falling back to
    /// [`DistanceFormula::GreatCircle`] when it does not converge
    Ellipsoidal,
}

impl DistanceFormula {
    /// Resolve a formula by name. Unknown names resolve to the default formula.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "planar" | "manhattan" => Self::Planar,
            "great-circle" | "great_circle" | "haversine" => Self::GreatCircle,
            "ellipsoidal" | "vincenty" => Self::Ellipsoidal,
            _ => Self::default(),
        }
    }
}

impl From<i32> for DistanceFormula {
    fn from(value: i32) -> Self {
        match value {
            0 => Self::Planar,
            1 => Self::GreatCircle,
            2 => Self::Ellipsoidal,
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum VincentyError {
    #[error("Vincenty formula did not converge after {0} iterations")]
    NoConvergence(usize),
    #[error("Vincenty formula produced a non-finite result")]
    NonFinite,
}

impl Coordinates {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Distance in meters under the given formula. Never fails: the
    /// ellipsoidal formula silently falls back to the great-circle result.
    pub fn distance(&self, other: &Coordinates, formula: DistanceFormula) -> f64 {
        match formula {
            DistanceFormula::Planar => self.planar_distance(other),
            DistanceFormula::GreatCircle => self.haversine_distance(other),
            DistanceFormula::Ellipsoidal => match self.vincenty_distance(other) {
                Ok(meters) => meters,
                Err(err) => {
                    debug!(error = %err, "Falling back to great-circle distance");
                    self.haversine_distance(other)
                }
            },
        }
    }

    /// Latitude and longitude offsets in meters, summed. The longitude scale
    /// uses the cosine of this point's latitude.
    pub fn planar_distance(&self, other: &Coordinates) -> f64 {
        let lat = (self.y - other.y).abs() * EARTH_METERS_PER_DEGREE;
        let lon =
            (self.x - other.x).abs() * EARTH_METERS_PER_DEGREE * self.y.to_radians().cos();
        lat + lon
    }

    pub fn haversine_distance(&self, other: &Coordinates) -> f64 {
        let d_lat = (other.y - self.y).to_radians();
        let d_lon = (other.x - self.x).to_radians();
        let lat1 = self.y.to_radians();
        let lat2 = other.y.to_radians();

        let a =
            (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();
        EARTH_RADIUS_M * c
    }

    /// Vincenty inverse formula. Fails for nearly antipodal points where the
    /// iteration does not settle.
    pub fn vincenty_distance(&self, other: &Coordinates) -> Result<f64, VincentyError> {
        let b = (1.0 - WGS84_F) * WGS84_A;
        let l = (other.x - self.x).to_radians();
        let u1 = ((1.0 - WGS84_F) * self.y.to_radians().tan()).atan();
        let u2 = ((1.0 - WGS84_F) * other.y.to_radians().tan()).atan();
        let (sin_u1, cos_u1) = u1.sin_cos();
        let (sin_u2, cos_u2) = u2.sin_cos();

        let mut lambda = l;
        let mut iterations = 0;
        let (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m) = loop {
            if iterations >= VINCENTY_MAX_ITERATIONS {
                return Err(VincentyError::NoConvergence(iterations));
            }
            iterations += 1;

            let (sin_lambda, cos_lambda) = lambda.sin_cos();
            let sin_sigma = ((cos_u2 * sin_lambda).powi(2)
                + (cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda).powi(2))
            .sqrt();
            if sin_sigma == 0.0 {
                // coincident points
                return Ok(0.0);
            }
            let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
            let sigma = sin_sigma.atan2(cos_sigma);
            let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
            let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;
            // equatorial line
            let cos_2sigma_m = if cos_sq_alpha == 0.0 {
                0.0
            } else {
                cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha
            };
            let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
            let previous = lambda;
            lambda = l
                + (1.0 - c)
                    * WGS84_F
                    * sin_alpha
                    * (sigma
                        + c * sin_sigma
                            * (cos_2sigma_m
                                + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

            if (lambda - previous).abs() < VINCENTY_TOLERANCE {
                break (sin_sigma, cos_sigma, sigma, cos_sq_alpha, cos_2sigma_m);
            }
        };

        let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - b * b) / (b * b);
        let big_a =
            1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
        let delta_sigma = big_b
            * sin_sigma
            * (cos_2sigma_m
                + big_b / 4.0
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                        - big_b / 6.0
                            * cos_2sigma_m
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

        let meters = b * big_a * (sigma - delta_sigma);
        if meters.is_finite() {
            Ok(meters)
        } else {
            Err(VincentyError::NonFinite)
        }
    }
}
