// navguard_core/src/snapshot.rs

//! The per-cycle state published by the estimator core.
//!
//! A snapshot is produced once per estimator cycle and never mutated
//! afterwards. Everything in this crate reads it; nothing writes it.

use nalgebra::{Quaternion, Vector2, Vector3};
use serde::{Deserialize, Serialize};

use crate::geo::Location;
use crate::types::{AidingMode, HeightSource, ResetEvent, TimeMs, VelocitySource};

/// The contract for whatever publishes snapshots (the estimator core, a log
/// replayer, a test fixture).
pub trait SnapshotSource {
    /// The most recently published snapshot.
    fn snapshot(&self) -> &EstimatorSnapshot;
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorSnapshot {
    /// State at the current time horizon, what the autopilot flies on.
    pub output: OutputState,
    /// Core filter states at the delayed fusion time horizon.
    pub states: FilterStates,
    pub innovations: InnovationSet,
    pub test_ratios: TestRatios,
    pub resets: ResetRecords,
    pub faults: FaultStatus,
    pub filter_status: FilterStatusFlags,
    pub gps_checks: GpsCheckStatus,
    pub timing: CycleTiming,
    pub origin: OriginReference,
    /// Height of the GPS reference relative to WGS-84, tracked by the filter (m).
    pub gps_ref_height: f64,

    /// Lever arm from the IMU to the body frame origin, NED (m).
    pub pos_offset_ned: Vector3<f32>,
    /// Velocity of the body frame origin relative to the IMU, NED (m/s).
    pub vel_offset_ned: Vector3<f32>,
    /// Terrain height below the origin, in the down axis (m).
    pub terrain_state: f32,
    pub last_known_position_ne: Vector2<f32>,
    /// Receiver position estimated during range beacon alignment.
    pub beacon_receiver_position: Vector3<f32>,
    pub active_height_source: HeightSource,
    pub source_innovations: SourceInnovations,
    pub body_odom: BodyOdomInnovations,

    /// Diagonal covariance entries of the body magnetic field states.
    pub mag_state_variances: Vector3<f32>,
    pub mag_select_index: u8,
    pub selected_airspeed: u8,
    pub selected_gps: u8,
    /// Why the filter refuses to align, if it does.
    pub prearm_failure: Option<String>,

    pub aiding_mode: AidingMode,
    pub tilt_aligned: bool,
    pub yaw_aligned: bool,
    pub states_initialised: bool,
    pub on_ground: bool,
    pub ground_offset_valid: bool,
    pub height_timed_out: bool,
    pub range_beacon_alignment_started: bool,
    pub flow_data_valid: bool,
    pub inhibit_wind_states: bool,
    pub inhibit_mag_states: bool,
    pub final_inflight_mag_init: bool,
    pub gps_good_to_align: bool,
}

impl EstimatorSnapshot {
    pub fn is_aligned(&self) -> bool {
        self.tilt_aligned && self.yaw_aligned
    }

    /// Time since the filter started, on the IMU clock.
    pub fn elapsed_since_start_ms(&self) -> TimeMs {
        self.timing
            .imu_sample_ms
            .wrapping_sub(self.timing.filter_start_ms)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputState {
    /// NED position relative to the origin, at the IMU (m).
    pub position: Vector3<f32>,
    pub velocity: Vector3<f32>,
    pub attitude: Quaternion<f32>,
}

impl Default for OutputState {
    fn default() -> Self {
        Self {
            position: Vector3::zeros(),
            velocity: Vector3::zeros(),
            attitude: Quaternion::identity(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterStates {
    pub attitude: Quaternion<f32>,
    pub velocity: Vector3<f32>,
    pub position: Vector3<f32>,
    /// Delta-angle bias per filter step (rad).
    pub gyro_bias: Vector3<f32>,
    /// Delta-velocity bias per filter step (m/s).
    pub accel_bias: Vector3<f32>,
    pub wind_velocity: Vector2<f32>,
    /// Earth magnetic field, NED (gauss).
    pub earth_mag_field: Vector3<f32>,
    /// Body magnetic field, XYZ (gauss).
    pub body_mag_field: Vector3<f32>,
}

impl Default for FilterStates {
    fn default() -> Self {
        Self {
            attitude: Quaternion::identity(),
            velocity: Vector3::zeros(),
            position: Vector3::zeros(),
            gyro_bias: Vector3::zeros(),
            accel_bias: Vector3::zeros(),
            wind_velocity: Vector2::zeros(),
            earth_mag_field: Vector3::zeros(),
            body_mag_field: Vector3::zeros(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InnovationSet {
    /// North, east, down velocity followed by north, east, down position.
    pub vel_pos: [f32; 6],
    /// Magnetometer innovations in gauss.
    pub mag: Vector3<f32>,
    pub airspeed: f32,
    pub yaw: f32,
    pub drag: Vector2<f32>,
    pub sideslip: f32,
    /// Low-pass filtered height innovation (m).
    pub filtered_height: f32,
}

impl Default for InnovationSet {
    fn default() -> Self {
        Self {
            vel_pos: [0.0; 6],
            mag: Vector3::zeros(),
            airspeed: 0.0,
            yaw: 0.0,
            drag: Vector2::zeros(),
            sideslip: 0.0,
            filtered_height: 0.0,
        }
    }
}

impl InnovationSet {
    pub fn velocity(&self) -> Vector3<f32> {
        Vector3::new(self.vel_pos[0], self.vel_pos[1], self.vel_pos[2])
    }

    pub fn position(&self) -> Vector3<f32> {
        Vector3::new(self.vel_pos[3], self.vel_pos[4], self.vel_pos[5])
    }
}

/// Normalised innovation consistency ratios. Values above 1 mean the
/// measurement disagrees with the estimate beyond its expected uncertainty.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TestRatios {
    pub velocity: f32,
    pub position: f32,
    pub height: f32,
    pub airspeed: f32,
    pub mag: Vector3<f32>,
    pub yaw: f32,
    pub aux_rangefinder: f32,
}

impl Default for TestRatios {
    fn default() -> Self {
        Self {
            velocity: 0.0,
            position: 0.0,
            height: 0.0,
            airspeed: 0.0,
            mag: Vector3::zeros(),
            yaw: 0.0,
            aux_rangefinder: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetRecords {
    pub yaw: ResetEvent<f32>,
    pub pos_ne: ResetEvent<Vector2<f32>>,
    pub pos_d: ResetEvent<f32>,
    pub vel_ne: ResetEvent<Vector2<f32>>,
}

impl Default for ResetRecords {
    fn default() -> Self {
        Self {
            yaw: ResetEvent::default(),
            pos_ne: ResetEvent {
                magnitude: Vector2::zeros(),
                time_ms: 0,
            },
            pos_d: ResetEvent::default(),
            vel_ne: ResetEvent {
                magnitude: Vector2::zeros(),
                time_ms: 0,
            },
        }
    }
}

/// Numerical conditioning faults flagged by the fusion routines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FaultStatus {
    pub bad_mag_x: bool,
    pub bad_mag_y: bool,
    pub bad_mag_z: bool,
    pub bad_airspeed: bool,
    pub bad_sideslip: bool,
}

/// What the filter currently claims it can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterStatusFlags {
    pub attitude: bool,
    pub horiz_vel: bool,
    pub vert_vel: bool,
    pub horiz_pos_rel: bool,
    pub horiz_pos_abs: bool,
    pub vert_pos: bool,
    pub terrain_alt: bool,
    pub const_pos_mode: bool,
    pub pred_horiz_pos_rel: bool,
    pub pred_horiz_pos_abs: bool,
    pub initialised: bool,
    pub gps_glitching: bool,
}

/// GPS pre-use quality checks. Each flag is true when that check fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GpsCheckStatus {
    pub bad_speed_accuracy: bool,
    pub bad_horiz_accuracy: bool,
    pub bad_vert_accuracy: bool,
    pub bad_yaw: bool,
    pub bad_sats: bool,
    pub bad_horiz_drift: bool,
    pub bad_hdop: bool,
    pub bad_vert_vel: bool,
    pub bad_fix: bool,
    pub bad_horiz_vel: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CycleTiming {
    pub imu_sample_ms: TimeMs,
    pub filter_start_ms: TimeMs,
    pub prev_body_vel_fuse_ms: TimeMs,
    pub flow_valid_meas_ms: TimeMs,
    pub frames_since_predict: u8,
}

/// The geographic point all local NED positions are relative to.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OriginReference {
    pub location: Location,
    pub valid: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelInnovationRecord {
    pub innovation: Vector3<f32>,
    pub variance: Vector3<f32>,
    pub time_ms: TimeMs,
}

/// Velocity innovations kept per aiding source.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceInnovations {
    pub gps: Option<VelInnovationRecord>,
    pub ext_nav: Option<VelInnovationRecord>,
}

impl SourceInnovations {
    /// The record for `source`, or `None` if that source does not publish variances.
    pub fn record(&self, source: VelocitySource) -> Option<&VelInnovationRecord> {
        match source {
            VelocitySource::Gps => self.gps.as_ref(),
            VelocitySource::ExtNav => self.ext_nav.as_ref(),
            VelocitySource::None
            | VelocitySource::Beacon
            | VelocitySource::OpticalFlow
            | VelocitySource::WheelEncoder => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyOdomInnovations {
    pub innovation: Vector3<f32>,
    pub variance: Vector3<f32>,
    pub body_odm_time_ms: TimeMs,
    pub wheel_odm_time_ms: TimeMs,
}

impl Default for BodyOdomInnovations {
    fn default() -> Self {
        Self {
            innovation: Vector3::zeros(),
            variance: Vector3::zeros(),
            body_odm_time_ms: 0,
            wheel_odm_time_ms: 0,
        }
    }
}
