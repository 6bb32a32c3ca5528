//! Geographic positions on the Earth ellipsoid
//!
//! Converts an Earth-fixed vector into geodetic latitude and longitude on an
//! ellipsoid, and wraps the whole chain from a geocentric celestial vector to
//! the point on the ground directly beneath it.
//!
//! ```text
//! GCRS xyz -> rotate by C -> ITRS xyz -> geodetic (lat, lon)
//! ```

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{RAD2DEG, WGS84_INVERSE_FLATTENING, WGS84_RADIUS_M};
use crate::earthlib::EarthOrientation;
use crate::time::Time;

/// Latitude iterations; converges to well below a microdegree
const LATITUDE_ITERATIONS: usize = 4;

/// An Earth ellipsoid model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geoid {
    /// Name of the geoid model
    pub name: &'static str,
    /// Equatorial radius in meters
    pub radius: f64,
    /// Inverse flattening (a / (a - b))
    pub inverse_flattening: f64,
    /// First eccentricity squared, 2f - f^2
    e2: f64,
}

/// WGS84 ellipsoid (GPS standard, EPSG:4326 datum)
pub const WGS84: Geoid = Geoid::new("WGS84", WGS84_RADIUS_M, WGS84_INVERSE_FLATTENING);

impl Geoid {
    /// Create a new geoid model
    pub const fn new(name: &'static str, radius: f64, inverse_flattening: f64) -> Self {
        let f = 1.0 / inverse_flattening;
        Geoid {
            name,
            radius,
            inverse_flattening,
            e2: 2.0 * f - f * f,
        }
    }

    /// Geodetic sub-point of an Earth-fixed vector
    ///
    /// `itrs` is a position in meters. Longitude is normalized to
    /// (-180, 180].
    pub fn subpoint(&self, itrs: &Vector3<f64>) -> SubPoint {
        let (x, y, z) = (itrs.x, itrs.y, itrs.z);
        let r = x.hypot(y);

        let mut longitude = y.atan2(x) * RAD2DEG;
        if longitude <= -180.0 {
            longitude += 360.0;
        }

        let mut lat = z.atan2(r);
        for _ in 0..LATITUDE_ITERATIONS {
            let sin_lat = lat.sin();
            let e2_sin_lat = self.e2 * sin_lat;
            let c = 1.0 / (1.0 - e2_sin_lat * sin_lat).sqrt();
            lat = (z + self.radius * c * e2_sin_lat).atan2(r);
        }

        SubPoint {
            longitude,
            latitude: lat * RAD2DEG,
        }
    }
}

/// The point on the ellipsoid beneath a body: longitude and latitude in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubPoint {
    /// Degrees east, in (-180, 180]
    pub longitude: f64,
    /// Degrees north, in [-90, 90]
    pub latitude: f64,
}

/// Geographic position beneath a geocentric GCRS vector (meters) at a given time
pub fn geographic_position_of(geoid: &Geoid, time: &Time, gcrs: &Vector3<f64>) -> SubPoint {
    let itrs = EarthOrientation::at(time).itrs(gcrs);
    geoid.subpoint(&itrs)
}
