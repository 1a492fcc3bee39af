// navguard_core/src/guidance.rs

//! Limits the control loops must respect so the filter stays within what
//! its sensors can observe, mostly when navigating on optical flow.

use nalgebra::Vector3;

use crate::config::LaneConfig;
use crate::sensors::{RangeOrientation, SensorContext};
use crate::snapshot::EstimatorSnapshot;
use crate::types::{AidingMode, HeightSource, TimeMs, VelocitySource};

/// Body-frame velocity fusion newer than this means flow is not the only aid.
pub const BODY_VEL_FUSION_RECENCY_MS: TimeMs = 1_000;
/// Flow data seen within this window means the filter may be relying on it.
pub const FLOW_RELIANCE_WINDOW_MS: TimeMs = 10_000;

/// Ground speed limit when flow is not constraining the vehicle (m/s).
const UNLIMITED_GROUND_SPEED: f32 = 400.0;
/// Height up to which the standard navigation gains apply (m).
const FULL_GAIN_HEIGHT_M: f32 = 4.0;
/// Minimum range finder reading assumed while on the ground (m).
const MIN_RANGE_ON_GROUND_M: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlLimits {
    /// Horizontal speed limit (m/s).
    pub ground_speed_limit: f32,
    /// Scale to apply to the navigation velocity gains.
    pub nav_gain_scaler: f32,
}

pub struct GuidanceLimits<'a> {
    snapshot: &'a EstimatorSnapshot,
    config: &'a LaneConfig,
    sensors: SensorContext<'a>,
}

impl<'a> GuidanceLimits<'a> {
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

    fn relying_on_flow(&self) -> bool {
        let timing = &self.snapshot.timing;
        let now = timing.imu_sample_ms;
        now.wrapping_sub(timing.prev_body_vel_fuse_ms) > BODY_VEL_FUSION_RECENCY_MS
            && now.wrapping_sub(timing.flow_valid_meas_ms) <= FLOW_RELIANCE_WINDOW_MS
    }

    /// Maximum height above the origin the vehicle may climb to, so that the
    /// range finder keeps the ground in view during optical flow navigation.
    /// `None` when no limit is required.
    pub fn height_control_limit(&self) -> Option<f32> {
        let snapshot = self.snapshot;
        let flow_nav = self.config.sources.velocity_xy == VelocitySource::OpticalFlow
            && snapshot.aiding_mode == AidingMode::Relative
            && snapshot.flow_data_valid;
        if !flow_nav {
            return None;
        }

        // Allow for tilt and control errors.
        let max_range = self.sensors.rangefinder?.max_range_m(RangeOrientation::Down)?;
        let mut height = (0.7 * max_range - 1.0).max(1.0);
        // Without the range finder as height reference, compensate for terrain
        // relative to the origin.
        if self.config.sources.position_z != HeightSource::RangeFinder {
            height -= snapshot.terrain_state;
        }
        Some(height)
    }

    pub fn control_limits(&self) -> ControlLimits {
        let snapshot = self.snapshot;
        if snapshot.aiding_mode != AidingMode::Relative || !self.relying_on_flow() {
            return ControlLimits {
                ground_speed_limit: UNLIMITED_GROUND_SPEED,
                nav_gain_scaler: 1.0,
            };
        }

        let rng_on_ground = self
            .sensors
            .rangefinder
            .map_or(MIN_RANGE_ON_GROUND_M, |r| {
                r.ground_clearance_m().max(MIN_RANGE_ON_GROUND_M)
            });
        let height_agl = snapshot.terrain_state - snapshot.states.position.z;
        // Keep 1 rad/s of the flow sensor's range for angular motion.
        let flow_margin = (self.config.max_flow_rate - 1.0).max(0.0);
        ControlLimits {
            ground_speed_limit: flow_margin * height_agl.max(rng_on_ground),
            nav_gain_scaler: FULL_GAIN_HEIGHT_M / height_agl.max(FULL_GAIN_HEIGHT_M),
        }
    }

    /// True airspeed vector in body axes, `None` while wind is not estimated
    /// or the filter has no aiding.
    pub fn airspeed_vector(&self) -> Option<Vector3<f32>> {
        let snapshot = self.snapshot;
        if snapshot.inhibit_wind_states || snapshot.aiding_mode == AidingMode::None {
            return None;
        }
        let wind = &snapshot.states.wind_velocity;
        let mut air_ned = snapshot.output.velocity + snapshot.vel_offset_ned;
        air_ned.x -= wind.x;
        air_ned.y -= wind.y;
        let body_to_ned = nalgebra::UnitQuaternion::from_quaternion(snapshot.output.attitude);
        Some(body_to_ned.inverse_transform_vector(&air_ned))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensors::RangeFinderProvider;
    use approx::assert_abs_diff_eq;
    use nalgebra::{UnitQuaternion, Vector2};

    struct Lidar {
        max_range: f32,
        clearance: f32,
    }

    impl RangeFinderProvider for Lidar {
        fn max_range_m(&self, orientation: RangeOrientation) -> Option<f32> {
            (orientation == RangeOrientation::Down).then_some(self.max_range)
        }
        fn ground_clearance_m(&self) -> f32 {
            self.clearance
        }
    }

    fn flow_config() -> LaneConfig {
        let mut config = LaneConfig::default();
        config.sources.velocity_xy = VelocitySource::OpticalFlow;
        config.max_flow_rate = 4.0;
        config
    }

    fn flow_snapshot() -> EstimatorSnapshot {
        let mut snapshot = EstimatorSnapshot {
            aiding_mode: AidingMode::Relative,
            flow_data_valid: true,
            terrain_state: 1.0,
            ..Default::default()
        };
        snapshot.timing.imu_sample_ms = 20_000;
        snapshot.timing.prev_body_vel_fuse_ms = 5_000;
        snapshot.timing.flow_valid_meas_ms = 19_900;
        snapshot.states.position.z = -9.0;
        snapshot
    }

    #[test]
    fn height_limit_tracks_rangefinder_range() {
        let snapshot = flow_snapshot();
        let config = flow_config();
        let lidar = Lidar {
            max_range: 20.0,
            clearance: 0.1,
        };
        let sensors = SensorContext::default().with_rangefinder(&lidar);
        let limit = GuidanceLimits::new(&snapshot, &config, sensors).height_control_limit();
        // 0.7 * 20 - 1 = 13, minus 1 m of terrain below the origin.
        assert_abs_diff_eq!(limit.unwrap(), 12.0, epsilon = 1e-5);

        let mut rng_height = flow_config();
        rng_height.sources.position_z = HeightSource::RangeFinder;
        let limit = GuidanceLimits::new(&snapshot, &rng_height, sensors).height_control_limit();
        assert_abs_diff_eq!(limit.unwrap(), 13.0, epsilon = 1e-5);
    }

    #[test]
    fn height_limit_needs_flow_navigation_and_a_rangefinder() {
        let snapshot = flow_snapshot();
        let lidar = Lidar {
            max_range: 2.0,
            clearance: 0.1,
        };
        let sensors = SensorContext::default().with_rangefinder(&lidar);

        let gps_config = LaneConfig::default();
        assert!(GuidanceLimits::new(&snapshot, &gps_config, sensors)
            .height_control_limit()
            .is_none());

        let config = flow_config();
        assert!(GuidanceLimits::new(&snapshot, &config, SensorContext::default())
            .height_control_limit()
            .is_none());

        // Short range sensors still get a 1 m floor before terrain compensation.
        let limit = GuidanceLimits::new(&snapshot, &config, sensors).height_control_limit();
        assert_abs_diff_eq!(limit.unwrap(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn flow_limits_scale_with_height() {
        let snapshot = flow_snapshot();
        let config = flow_config();
        let limits = GuidanceLimits::new(&snapshot, &config, SensorContext::default()).control_limits();
        // 10 m above terrain, 3 rad/s of usable flow rate.
        assert_abs_diff_eq!(limits.ground_speed_limit, 30.0, epsilon = 1e-4);
        assert_abs_diff_eq!(limits.nav_gain_scaler, 0.4, epsilon = 1e-6);
    }

    #[test]
    fn limits_relax_when_not_relying_on_flow() {
        let mut snapshot = flow_snapshot();
        let config = flow_config();

        snapshot.timing.prev_body_vel_fuse_ms = 19_500;
        let limits = GuidanceLimits::new(&snapshot, &config, SensorContext::default()).control_limits();
        assert_eq!(limits.ground_speed_limit, 400.0);
        assert_eq!(limits.nav_gain_scaler, 1.0);

        snapshot.timing.prev_body_vel_fuse_ms = 5_000;
        snapshot.timing.flow_valid_meas_ms = 9_000;
        let limits = GuidanceLimits::new(&snapshot, &config, SensorContext::default()).control_limits();
        assert_eq!(limits.ground_speed_limit, 400.0);
    }

    #[test]
    fn on_ground_speed_limit_uses_rangefinder_clearance() {
        let mut snapshot = flow_snapshot();
        snapshot.states.position.z = 1.0;
        let config = flow_config();
        let lidar = Lidar {
            max_range: 20.0,
            clearance: 0.2,
        };
        let sensors = SensorContext::default().with_rangefinder(&lidar);
        let limits = GuidanceLimits::new(&snapshot, &config, sensors).control_limits();
        assert_abs_diff_eq!(limits.ground_speed_limit, 0.6, epsilon = 1e-6);
        assert_eq!(limits.nav_gain_scaler, 1.0);
    }

    #[test]
    fn airspeed_vector_removes_wind_and_rotates_to_body() {
        let mut snapshot = flow_snapshot();
        snapshot.aiding_mode = AidingMode::Absolute;
        snapshot.output.velocity = Vector3::new(15.0, 0.0, 0.0);
        snapshot.states.wind_velocity = Vector2::new(-5.0, 0.0);
        // Heading east.
        snapshot.output.attitude =
            UnitQuaternion::from_euler_angles(0.0, 0.0, std::f32::consts::FRAC_PI_2).into_inner();
        let config = LaneConfig::default();

        let air = GuidanceLimits::new(&snapshot, &config, SensorContext::default())
            .airspeed_vector()
            .unwrap();
        // 20 m/s of northward airflow seen from an east-facing body is along -Y.
        assert_abs_diff_eq!(air.x, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(air.y, -20.0, epsilon = 1e-4);

        snapshot.inhibit_wind_states = true;
        assert!(GuidanceLimits::new(&snapshot, &config, SensorContext::default())
            .airspeed_vector()
            .is_none());
    }
}
