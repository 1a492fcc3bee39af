// navguard_core/src/sensors/mod.rs

//! Read-only views of the sensor drivers. This layer never talks to hardware;
//! it only asks these providers for status the estimator snapshot does not carry.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::types::TimeMs;

mod gps;

pub use gps::{GpsFix, GpsProvider};

/// Mounting direction of a range finder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum RangeOrientation {
    Forward,
    Backward,
    Up,
    /// Pointing straight down (pitch 270 degrees).
    Down,
}

pub trait RangeFinderProvider: Send + Sync {
    /// Maximum range of the sensor facing `orientation`, in metres.
    /// Returns `None` if no sensor faces that direction.
    fn max_range_m(&self, orientation: RangeOrientation) -> Option<f32>;

    /// Distance reported by the downward sensor while the vehicle sits on the ground.
    fn ground_clearance_m(&self) -> f32;
}

pub trait CompassProvider: Send + Sync {
    fn healthy(&self, index: u8) -> bool;

    /// Hard-iron offsets currently applied by the driver, in milligauss.
    fn offsets(&self, index: u8) -> Vector3<f32>;
}

pub trait AirspeedProvider: Send + Sync {
    fn sensor_count(&self) -> u8;
}

/// Everything a lane can see of the outside world during one cycle.
///
/// Missing providers are `None` and every query falls back accordingly.
#[derive(Default, Clone, Copy)]
pub struct SensorContext<'a> {
    pub gps: Option<&'a dyn GpsProvider>,
    pub rangefinder: Option<&'a dyn RangeFinderProvider>,
    pub compass: Option<&'a dyn CompassProvider>,
    pub airspeed: Option<&'a dyn AirspeedProvider>,
    /// Wall-clock time of the query, used for staleness checks.
    pub now_ms: TimeMs,
}

impl<'a> SensorContext<'a> {
    pub fn at(now_ms: TimeMs) -> Self {
        Self {
            now_ms,
            ..Default::default()
        }
    }

    pub fn with_gps(mut self, gps: &'a dyn GpsProvider) -> Self {
        self.gps = Some(gps);
        self
    }

    pub fn with_rangefinder(mut self, rangefinder: &'a dyn RangeFinderProvider) -> Self {
        self.rangefinder = Some(rangefinder);
        self
    }

    pub fn with_compass(mut self, compass: &'a dyn CompassProvider) -> Self {
        self.compass = Some(compass);
        self
    }

    pub fn with_airspeed(mut self, airspeed: &'a dyn AirspeedProvider) -> Self {
        self.airspeed = Some(airspeed);
        self
    }

    /// Number of airspeed sensors fitted, 0 without a provider.
    pub fn airspeed_sensor_count(&self) -> u8 {
        self.airspeed.map_or(0, |a| a.sensor_count())
    }
}
