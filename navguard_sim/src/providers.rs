// navguard_sim/src/providers.rs

//! Sensor providers driven by the scenario script instead of hardware.

use nalgebra::Vector3;
use navguard_core::prelude::{
    AirspeedProvider, CompassProvider, GpsFix, GpsProvider, Location, RangeFinderProvider,
    RangeOrientation, SensorContext, TimeMs,
};

use crate::scenario::{
    AirspeedScript, CompassScript, GpsScript, RangeFinderScript, SensorsConfig,
};

/// The GPS receiver as seen at one instant of the replay.
#[derive(Debug, Clone, Copy)]
pub struct GpsSample {
    pub fix: GpsFix,
    pub location: Location,
    pub num_satellites: u8,
    pub last_update_ms: TimeMs,
}

impl GpsScript {
    /// Receiver state at `now_ms`. During an outage the fix drops and the
    /// last update time freezes at the start of the outage.
    pub fn sample(&self, now_ms: TimeMs) -> GpsSample {
        match self.outages.iter().find(|outage| outage.contains(now_ms)) {
            Some(outage) => GpsSample {
                fix: GpsFix::NoFix,
                location: self.location,
                num_satellites: 0,
                last_update_ms: outage.start_ms,
            },
            None => GpsSample {
                fix: self.fix,
                location: self.location,
                num_satellites: self.num_satellites,
                last_update_ms: now_ms,
            },
        }
    }
}

impl GpsProvider for GpsSample {
    fn fix(&self, _instance: u8) -> GpsFix {
        self.fix
    }

    fn location(&self, _instance: u8) -> Location {
        self.location
    }

    fn num_satellites(&self, _instance: u8) -> u8 {
        self.num_satellites
    }

    fn last_update_ms(&self, _instance: u8) -> TimeMs {
        self.last_update_ms
    }
}

impl RangeFinderProvider for RangeFinderScript {
    fn max_range_m(&self, orientation: RangeOrientation) -> Option<f32> {
        (orientation == self.orientation).then_some(self.max_range_m)
    }

    fn ground_clearance_m(&self) -> f32 {
        self.ground_clearance_m
    }
}

impl CompassProvider for CompassScript {
    fn healthy(&self, index: u8) -> bool {
        self.healthy && usize::from(index) < self.offsets.len()
    }

    fn offsets(&self, index: u8) -> Vector3<f32> {
        self.offsets
            .get(usize::from(index))
            .copied()
            .unwrap_or_else(Vector3::zeros)
    }
}

impl AirspeedProvider for AirspeedScript {
    fn sensor_count(&self) -> u8 {
        self.sensor_count
    }
}

/// All scripted providers for one replay cycle.
pub struct SensorFrame<'a> {
    gps: Option<GpsSample>,
    sensors: &'a SensorsConfig,
    now_ms: TimeMs,
}

impl<'a> SensorFrame<'a> {
    pub fn at(sensors: &'a SensorsConfig, now_ms: TimeMs) -> Self {
        Self {
            gps: sensors.gps.as_ref().map(|gps| gps.sample(now_ms)),
            sensors,
            now_ms,
        }
    }

    /// The context handed to every lane query this cycle.
    pub fn context(&self) -> SensorContext<'_> {
        let mut context = SensorContext::at(self.now_ms);
        if let Some(gps) = &self.gps {
            context = context.with_gps(gps);
        }
        if let Some(rangefinder) = &self.sensors.rangefinder {
            context = context.with_rangefinder(rangefinder);
        }
        if let Some(compass) = &self.sensors.compass {
            context = context.with_compass(compass);
        }
        if let Some(airspeed) = &self.sensors.airspeed {
            context = context.with_airspeed(airspeed);
        }
        context
    }
}
