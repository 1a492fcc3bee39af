// navguard_core/src/position.rs

//! Best-effort position, height and location for flight control.
//!
//! Each query answers with the best value it can find and says whether that
//! value may be used for control. When aiding lapses the answers degrade
//! through fixed fallback tiers; nothing here ever fails outright.

use nalgebra::Vector2;
use tracing::trace;

use crate::config::{LaneConfig, OriginHeightMode};
use crate::geo::Location;
use crate::health::healthy;
use crate::sensors::{GpsFix, SensorContext};
use crate::snapshot::EstimatorSnapshot;
use crate::types::{AidingMode, Estimate};

pub struct PositionResolver<'a> {
    snapshot: &'a EstimatorSnapshot,
    config: &'a LaneConfig,
    sensors: SensorContext<'a>,
}

impl<'a> PositionResolver<'a> {
    pub fn new(
        snapshot: &'a EstimatorSnapshot,
        config: &'a LaneConfig,
        sensors: SensorContext<'a>,
    ) -> Self {
        Self {
            snapshot,
            config,
            sensors,
        }
    }

    fn gps_fix(&self) -> GpsFix {
        self.sensors
            .gps
            .map_or(GpsFix::NoGps, |gps| gps.fix(self.snapshot.selected_gps))
    }

    /// North/east position of the body frame origin relative to the filter origin.
    ///
    /// Only valid while the filter has position aiding. Without aiding the
    /// filter's own position states are parked, so the best available
    /// substitute is reported instead, always marked invalid.
    pub fn pos_ne(&self) -> Estimate<Vector2<f32>> {
        let snapshot = self.snapshot;
        if snapshot.aiding_mode != AidingMode::None {
            let pos = snapshot.output.position + snapshot.pos_offset_ned;
            return Estimate::valid(pos.xy());
        }

        if !snapshot.origin.valid {
            return Estimate::invalid(Vector2::zeros());
        }

        if self.gps_fix() >= GpsFix::Fix2D {
            if let Some(gps) = self.sensors.gps {
                trace!("pos_ne: no aiding, using raw GPS relative to origin");
                let gps_location = gps.location(snapshot.selected_gps);
                return Estimate::invalid(snapshot.origin.location.distance_ne(&gps_location));
            }
        }

        if snapshot.range_beacon_alignment_started {
            trace!("pos_ne: no aiding, using range beacon receiver position");
            return Estimate::invalid(snapshot.beacon_receiver_position.xy());
        }

        trace!("pos_ne: no aiding, using dead-reckoned position");
        Estimate::invalid(snapshot.output.position.xy())
    }

    /// Down position of the body frame origin relative to the origin.
    ///
    /// With `CorrectLocal` the height drift correction is folded in here so
    /// that `origin_llh().altitude - pos_d()` stays the absolute altitude in
    /// both modes.
    pub fn pos_d(&self) -> Estimate<f32> {
        let snapshot = self.snapshot;
        let local = snapshot.output.position.z + snapshot.pos_offset_ned.z;
        let value = match self.config.origin_height_mode {
            OriginHeightMode::CorrectOrigin => local,
            OriginHeightMode::CorrectLocal => {
                let drift = snapshot.origin.location.altitude_m - snapshot.gps_ref_height;
                (f64::from(local) + drift) as f32
            }
        };
        Estimate {
            value,
            valid: snapshot.filter_status.vert_pos,
        }
    }

    /// Height of the body frame origin above the terrain.
    pub fn hagl(&self) -> Estimate<f32> {
        let snapshot = self.snapshot;
        let value =
            snapshot.terrain_state - snapshot.output.position.z - snapshot.pos_offset_ned.z;
        let valid = !snapshot.height_timed_out && snapshot.ground_offset_valid && healthy(snapshot);
        Estimate { value, valid }
    }

    /// The filter origin. With `CorrectOrigin` the altitude is the internally
    /// tracked GPS reference height rather than the altitude stored at alignment.
    pub fn origin_llh(&self) -> Estimate<Location> {
        let origin = &self.snapshot.origin;
        let mut location = origin.location;
        if self.config.origin_height_mode == OriginHeightMode::CorrectOrigin {
            location.altitude_m = self.snapshot.gps_ref_height;
        }
        Estimate {
            value: location,
            valid: origin.valid,
        }
    }

    /// Raw receiver location, only with a 3D fix.
    pub fn gps_llh(&self) -> Option<Location> {
        let gps = self.sensors.gps?;
        (self.gps_fix() >= GpsFix::Fix3D).then(|| gps.location(self.snapshot.selected_gps))
    }

    /// Latitude, longitude and absolute altitude of the body frame origin.
    ///
    /// Falls back to raw GPS whenever the filter cannot vouch for its own
    /// horizontal solution. Consumers flying on this must also check the
    /// filter status flags.
    pub fn llh(&self) -> Estimate<Location> {
        let snapshot = self.snapshot;
        let origin = self.origin_llh();
        if !origin.valid {
            return match self.gps_llh() {
                Some(location) => Estimate::valid(location),
                None => Estimate::invalid(Location::default()),
            };
        }

        let pos_d = self.pos_d();
        let altitude_m = origin.value.altitude_m - f64::from(pos_d.value);
        let from_origin = |ne: Vector2<f32>| {
            let mut location = snapshot.origin.location.offset(ne.x, ne.y);
            location.altitude_m = altitude_m;
            location
        };

        if !pos_d.valid || snapshot.aiding_mode == AidingMode::None {
            if let Some(location) = self.gps_llh() {
                return Estimate::valid(location);
            }
            trace!("llh: no aiding and no 3D fix, using last known position");
            return Estimate::invalid(from_origin(snapshot.last_known_position_ne));
        }

        let dead_reckoned = from_origin(snapshot.output.position.xy());
        let status = &snapshot.filter_status;
        if status.horiz_pos_abs || status.horiz_pos_rel {
            return Estimate::valid(dead_reckoned);
        }

        // Inertial dead reckoning for too long; prefer raw GPS if there is one.
        match self.gps_llh() {
            Some(location) => Estimate::valid(location),
            None => {
                trace!("llh: horizontal position lapsed and no 3D fix");
                Estimate::invalid(dead_reckoned)
            }
        }
    }
}
