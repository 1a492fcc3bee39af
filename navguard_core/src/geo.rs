// navguard_core/src/geo.rs

//! WGS-84 locations and the flat-earth offsets used to move between the
//! filter's local NED frame and latitude/longitude.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// Mean earth radius used for local tangent-plane conversions.
pub const EARTH_RADIUS_M: f64 = 6_378_100.0;

/// Metres travelled per degree of latitude.
const METRES_PER_DEGREE: f64 = EARTH_RADIUS_M * std::f64::consts::PI / 180.0;

/// A geographic location. Altitude is absolute, relative to the WGS-84 reference.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Location {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl Location {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    /// Shrinks east-west distances towards the poles.
    fn longitude_scale(&self) -> f64 {
        self.latitude_deg.to_radians().cos().max(0.01)
    }

    /// Returns this location moved by `north`/`east` metres. Altitude is unchanged.
    pub fn offset(&self, north_m: f32, east_m: f32) -> Self {
        let d_lat = f64::from(north_m) / METRES_PER_DEGREE;
        let d_lon = f64::from(east_m) / (METRES_PER_DEGREE * self.longitude_scale());
        Self {
            latitude_deg: self.latitude_deg + d_lat,
            longitude_deg: self.longitude_deg + d_lon,
            altitude_m: self.altitude_m,
        }
    }

    /// North/east distance in metres from `self` to `other`.
    pub fn distance_ne(&self, other: &Location) -> Vector2<f32> {
        let north = (other.latitude_deg - self.latitude_deg) * METRES_PER_DEGREE;
        let east = (other.longitude_deg - self.longitude_deg)
            * METRES_PER_DEGREE
            * self.longitude_scale();
        Vector2::new(north as f32, east as f32)
    }
}
