// navguard_core/src/diagnostics.rs

//! Read-only queries consumed by ground station reporting and pre-arm checks.

use nalgebra::{Vector2, Vector3};

use crate::sensors::SensorContext;
use crate::snapshot::EstimatorSnapshot;
use crate::types::{Estimate, ResetEvent};

/// Body field states must have converged below this variance before the
/// learned offsets are reported as usable (gauss^2).
const MAG_OFFSET_VARIANCE_LIMIT: f32 = 5e-6;
/// Body field states are in gauss, driver offsets in milligauss.
const GAUSS_TO_MILLIGAUSS: f32 = 1000.0;

pub struct Diagnostics<'a> {
    snapshot: &'a EstimatorSnapshot,
    sensors: SensorContext<'a>,
}

impl<'a> Diagnostics<'a> {
    pub fn new(snapshot: &'a EstimatorSnapshot, sensors: SensorContext<'a>) -> Self {
        Self { snapshot, sensors }
    }

    /// Yaw change of the most recent reset (rad).
    pub fn last_yaw_reset(&self) -> ResetEvent<f32> {
        self.snapshot.resets.yaw
    }

    pub fn last_pos_ne_reset(&self) -> ResetEvent<Vector2<f32>> {
        self.snapshot.resets.pos_ne
    }

    pub fn last_pos_d_reset(&self) -> ResetEvent<f32> {
        self.snapshot.resets.pos_d
    }

    pub fn last_vel_ne_reset(&self) -> ResetEvent<Vector2<f32>> {
        self.snapshot.resets.vel_ne
    }

    /// Compass offsets corrected by the learned body field, in milligauss.
    ///
    /// Falls back to the raw offsets of the compass in use, marked invalid,
    /// unless `index` is that compass and its field states have converged.
    pub fn mag_offsets(&self, index: u8) -> Option<Estimate<Vector3<f32>>> {
        let compass = self.sensors.compass?;
        let snapshot = self.snapshot;
        let raw = compass.offsets(snapshot.mag_select_index);

        let converged = snapshot
            .mag_state_variances
            .iter()
            .all(|&var| var < MAG_OFFSET_VARIANCE_LIMIT);
        let learned = index == snapshot.mag_select_index
            && snapshot.final_inflight_mag_init
            && !snapshot.inhibit_mag_states
            && compass.healthy(index)
            && converged;

        Some(if learned {
            Estimate::valid(raw - snapshot.states.body_mag_field * GAUSS_TO_MILLIGAUSS)
        } else {
            Estimate::invalid(raw)
        })
    }

    /// Why the filter will not align, `None` once GPS is good enough.
    pub fn prearm_failure_reason(&self) -> Option<&'a str> {
        if self.snapshot.gps_good_to_align {
            return None;
        }
        self.snapshot.prearm_failure.as_deref()
    }

    /// IMU frames since the last covariance prediction.
    pub fn frames_since_predict(&self) -> u8 {
        self.snapshot.timing.frames_since_predict
    }

    /// Index of the airspeed sensor being fused.
    pub fn active_airspeed(&self) -> u8 {
        self.snapshot.selected_airspeed
    }
}
