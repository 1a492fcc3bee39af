// navguard_core/src/reporting/faults.rs

//! Packs fault, GPS-check and capability flags into the fixed bit layouts that
//! ground stations and loggers expect. Internal logic only ever sees the
//! named-boolean structs; bits exist only at this boundary.

use bitflags::bitflags;

use crate::reporting::innovations::InnovationReporter;
use crate::snapshot::{EstimatorSnapshot, FilterStatusFlags, GpsCheckStatus};
use crate::types::{AidingMode, HeightSource};

bitflags! {
    /// Filter fault bitmask.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FaultBits: u16 {
        const NAN_QUATERNION = 1 << 0;
        const NAN_VELOCITY = 1 << 1;
        const BAD_MAG_X = 1 << 2;
        const BAD_MAG_Y = 1 << 3;
        const BAD_MAG_Z = 1 << 4;
        const BAD_AIRSPEED = 1 << 5;
        const BAD_SIDESLIP = 1 << 6;
        const UNINITIALISED = 1 << 7;
    }
}

bitflags! {
    /// GPS pre-use check bitmask. A set bit is a failing check.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GpsCheckBits: u16 {
        const BAD_SPEED_ACCURACY = 1 << 0;
        const BAD_HORIZ_ACCURACY = 1 << 1;
        const BAD_VERT_ACCURACY = 1 << 2;
        const BAD_YAW = 1 << 3;
        const BAD_SATS = 1 << 4;
        const BAD_HORIZ_DRIFT = 1 << 5;
        const BAD_HDOP = 1 << 6;
        const BAD_VERT_VEL = 1 << 7;
        const BAD_FIX = 1 << 8;
        const BAD_HORIZ_VEL = 1 << 9;
    }
}

bitflags! {
    /// Capability bitmask of the external status report.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StatusBits: u16 {
        const ATTITUDE = 1 << 0;
        const VELOCITY_HORIZ = 1 << 1;
        const VELOCITY_VERT = 1 << 2;
        const POS_HORIZ_REL = 1 << 3;
        const POS_HORIZ_ABS = 1 << 4;
        const POS_VERT_ABS = 1 << 5;
        const POS_VERT_AGL = 1 << 6;
        const CONST_POS_MODE = 1 << 7;
        const PRED_POS_HORIZ_REL = 1 << 8;
        const PRED_POS_HORIZ_ABS = 1 << 9;
        const UNINITIALIZED = 1 << 10;
        const GPS_GLITCHING = 1 << 15;
    }
}

/// Every fault condition the filter can be in, one named flag each.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FilterFaults {
    pub nan_quaternion: bool,
    pub nan_velocity: bool,
    pub bad_mag_x: bool,
    pub bad_mag_y: bool,
    pub bad_mag_z: bool,
    pub bad_airspeed: bool,
    pub bad_sideslip: bool,
    pub uninitialised: bool,
}

impl FilterFaults {
    pub fn any(&self) -> bool {
        !self.to_bits().is_empty()
    }

    pub fn to_bits(&self) -> FaultBits {
        let mut bits = FaultBits::empty();
        bits.set(FaultBits::NAN_QUATERNION, self.nan_quaternion);
        bits.set(FaultBits::NAN_VELOCITY, self.nan_velocity);
        bits.set(FaultBits::BAD_MAG_X, self.bad_mag_x);
        bits.set(FaultBits::BAD_MAG_Y, self.bad_mag_y);
        bits.set(FaultBits::BAD_MAG_Z, self.bad_mag_z);
        bits.set(FaultBits::BAD_AIRSPEED, self.bad_airspeed);
        bits.set(FaultBits::BAD_SIDESLIP, self.bad_sideslip);
        bits.set(FaultBits::UNINITIALISED, self.uninitialised);
        bits
    }
}

impl GpsCheckStatus {
    pub fn to_bits(&self) -> GpsCheckBits {
        let mut bits = GpsCheckBits::empty();
        bits.set(GpsCheckBits::BAD_SPEED_ACCURACY, self.bad_speed_accuracy);
        bits.set(GpsCheckBits::BAD_HORIZ_ACCURACY, self.bad_horiz_accuracy);
        bits.set(GpsCheckBits::BAD_VERT_ACCURACY, self.bad_vert_accuracy);
        bits.set(GpsCheckBits::BAD_YAW, self.bad_yaw);
        bits.set(GpsCheckBits::BAD_SATS, self.bad_sats);
        bits.set(GpsCheckBits::BAD_HORIZ_DRIFT, self.bad_horiz_drift);
        bits.set(GpsCheckBits::BAD_HDOP, self.bad_hdop);
        bits.set(GpsCheckBits::BAD_VERT_VEL, self.bad_vert_vel);
        bits.set(GpsCheckBits::BAD_FIX, self.bad_fix);
        bits.set(GpsCheckBits::BAD_HORIZ_VEL, self.bad_horiz_vel);
        bits
    }
}

impl FilterStatusFlags {
    pub fn to_bits(&self) -> StatusBits {
        let mut bits = StatusBits::empty();
        bits.set(StatusBits::ATTITUDE, self.attitude);
        bits.set(StatusBits::VELOCITY_HORIZ, self.horiz_vel);
        bits.set(StatusBits::VELOCITY_VERT, self.vert_vel);
        bits.set(StatusBits::POS_HORIZ_REL, self.horiz_pos_rel);
        bits.set(StatusBits::POS_HORIZ_ABS, self.horiz_pos_abs);
        bits.set(StatusBits::POS_VERT_ABS, self.vert_pos);
        bits.set(StatusBits::POS_VERT_AGL, self.terrain_alt);
        bits.set(StatusBits::CONST_POS_MODE, self.const_pos_mode);
        bits.set(StatusBits::PRED_POS_HORIZ_REL, self.pred_horiz_pos_rel);
        bits.set(StatusBits::PRED_POS_HORIZ_ABS, self.pred_horiz_pos_abs);
        bits.set(StatusBits::UNINITIALIZED, !self.initialised);
        bits.set(StatusBits::GPS_GLITCHING, self.gps_glitching);
        bits
    }
}

/// The telemetry status report. Variance fields are square roots of the test
/// ratios, not the raw ratios.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatusReport {
    pub flags: StatusBits,
    pub vel_var: f32,
    pub pos_var: f32,
    pub hgt_var: f32,
    pub mag_var_max: f32,
    pub rng_var: f32,
    pub tas_var: f32,
}

pub struct FaultStatusAggregator<'a> {
    snapshot: &'a EstimatorSnapshot,
}

impl<'a> FaultStatusAggregator<'a> {
    pub fn new(snapshot: &'a EstimatorSnapshot) -> Self {
        Self { snapshot }
    }

    /// Evaluates every fault condition against the snapshot.
    pub fn filter_faults(&self) -> FilterFaults {
        filter_faults(self.snapshot)
    }

    pub fn gps_status(&self) -> GpsCheckBits {
        self.snapshot.gps_checks.to_bits()
    }

    pub fn status_report(&self) -> StatusReport {
        let snapshot = self.snapshot;
        let variances = InnovationReporter::new(snapshot).variances();

        // Only report range finder consistency if the filter depends on it for
        // height or optical flow navigation.
        let rng_in_use = snapshot.active_height_source == HeightSource::RangeFinder
            || (snapshot.aiding_mode == AidingMode::Relative && snapshot.flow_data_valid);
        let rng_var = if rng_in_use {
            snapshot.test_ratios.aux_rangefinder.sqrt()
        } else {
            0.0
        };

        StatusReport {
            flags: snapshot.filter_status.to_bits(),
            vel_var: variances.velocity,
            pos_var: variances.position,
            hgt_var: variances.height,
            mag_var_max: variances.magnetometer.max(),
            rng_var,
            tas_var: variances.airspeed,
        }
    }
}

/// Fault evaluation without an aggregator, for callers that only hold a snapshot.
pub fn filter_faults(snapshot: &EstimatorSnapshot) -> FilterFaults {
    let faults = &snapshot.faults;
    FilterFaults {
        nan_quaternion: snapshot.states.attitude.coords.iter().any(|c| c.is_nan()),
        nan_velocity: snapshot.states.velocity.iter().any(|c| c.is_nan()),
        bad_mag_x: faults.bad_mag_x,
        bad_mag_y: faults.bad_mag_y,
        bad_mag_z: faults.bad_mag_z,
        bad_airspeed: faults.bad_airspeed,
        bad_sideslip: faults.bad_sideslip,
        uninitialised: !snapshot.states_initialised,
    }
}
