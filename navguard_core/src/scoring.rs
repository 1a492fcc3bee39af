// navguard_core/src/scoring.rs

//! A single comparable error figure per lane, used by an external arbiter to
//! pick the primary among redundant estimator instances.

use crate::config::LaneConfig;
use crate::health::healthy;
use crate::sensors::SensorContext;
use crate::snapshot::EstimatorSnapshot;

/// Damps airspeed and magnetometer contributions so that gusts and local
/// magnetic disturbances do not trigger lane switches on their own.
const SECONDARY_CHANNEL_WEIGHT: f32 = 0.3;

/// Airspeed only counts when there is another sensor a lane could switch to.
const MIN_AIRSPEED_SENSORS: u8 = 2;

/// Consolidated error score, higher is worse.
///
/// Returns 0 for a lane that has not completed tilt and yaw alignment. That
/// reads as "best" to a naive minimum search, so callers must gate on
/// alignment before comparing scores.
pub fn error_score(
    snapshot: &EstimatorSnapshot,
    config: &LaneConfig,
    sensors: &SensorContext,
) -> f32 {
    if !snapshot.is_aligned() {
        return 0.0;
    }

    let ratios = &snapshot.test_ratios;
    let mut score = (0.5 * (ratios.velocity + ratios.position)).max(ratios.height);

    if config.vehicle.assume_zero_sideslip()
        && config.affinity.airspeed
        && sensors.airspeed_sensor_count() >= MIN_AIRSPEED_SENSORS
    {
        score = score.max(SECONDARY_CHANNEL_WEIGHT * ratios.airspeed);
    }

    if config.affinity.magnetometer {
        score = score.max(SECONDARY_CHANNEL_WEIGHT * ratios.mag.sum());
    }

    score
}

/// What the arbiter needs to know about one lane for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneSummary {
    pub healthy: bool,
    pub aligned: bool,
    pub error_score: f32,
}

impl LaneSummary {
    pub fn evaluate(
        snapshot: &EstimatorSnapshot,
        config: &LaneConfig,
        sensors: &SensorContext,
    ) -> Self {
        Self {
            healthy: healthy(snapshot),
            aligned: snapshot.is_aligned(),
            error_score: error_score(snapshot, config, sensors),
        }
    }

    /// Healthy and aligned, so its score means something.
    pub fn is_candidate(&self) -> bool {
        self.healthy && self.aligned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AffinityFlags, VehicleClass, VehicleProfile};
    use crate::sensors::AirspeedProvider;
    use approx::assert_abs_diff_eq;
    use nalgebra::Vector3;

    struct Pitots(u8);

    impl AirspeedProvider for Pitots {
        fn sensor_count(&self) -> u8 {
            self.0
        }
    }

    fn aligned() -> EstimatorSnapshot {
        EstimatorSnapshot {
            tilt_aligned: true,
            yaw_aligned: true,
            ..Default::default()
        }
    }

    fn plane(affinity: AffinityFlags) -> LaneConfig {
        LaneConfig {
            affinity,
            vehicle: VehicleProfile {
                class: VehicleClass::FixedWing,
                fly_forward: true,
            },
            ..Default::default()
        }
    }

    #[test]
    fn unaligned_lane_scores_zero() {
        let mut snapshot = aligned();
        snapshot.yaw_aligned = false;
        snapshot.test_ratios.height = 5.0;
        let config = LaneConfig::default();
        assert_eq!(error_score(&snapshot, &config, &SensorContext::default()), 0.0);
    }

    #[test]
    fn score_is_max_of_position_and_height_channels() {
        let mut snapshot = aligned();
        snapshot.test_ratios.velocity = 0.4;
        snapshot.test_ratios.position = 0.8;
        snapshot.test_ratios.height = 0.5;
        let config = LaneConfig::default();
        let score = error_score(&snapshot, &config, &SensorContext::default());
        assert_abs_diff_eq!(score, 0.6, epsilon = 1e-6);

        snapshot.test_ratios.height = 0.9;
        let score = error_score(&snapshot, &config, &SensorContext::default());
        assert_abs_diff_eq!(score, 0.9, epsilon = 1e-6);
    }

    #[test]
    fn airspeed_needs_affinity_two_sensors_and_zero_sideslip() {
        let mut snapshot = aligned();
        snapshot.test_ratios.airspeed = 2.0;
        let two = Pitots(2);
        let one = Pitots(1);

        let config = plane(AffinityFlags {
            airspeed: true,
            magnetometer: false,
        });
        let sensors = SensorContext::default().with_airspeed(&two);
        assert_abs_diff_eq!(error_score(&snapshot, &config, &sensors), 0.6, epsilon = 1e-6);

        let sensors = SensorContext::default().with_airspeed(&one);
        assert_eq!(error_score(&snapshot, &config, &sensors), 0.0);

        let no_affinity = plane(AffinityFlags::default());
        let sensors = SensorContext::default().with_airspeed(&two);
        assert_eq!(error_score(&snapshot, &no_affinity, &sensors), 0.0);

        let mut copter = config.clone();
        copter.vehicle = VehicleProfile::default();
        assert_eq!(error_score(&snapshot, &copter, &sensors), 0.0);
    }

    #[test]
    fn magnetometer_channel_sums_axes() {
        let mut snapshot = aligned();
        snapshot.test_ratios.mag = Vector3::new(1.0, 1.0, 2.0);
        let config = LaneConfig {
            affinity: AffinityFlags {
                magnetometer: true,
                airspeed: false,
            },
            ..Default::default()
        };
        let score = error_score(&snapshot, &config, &SensorContext::default());
        assert_abs_diff_eq!(score, 1.2, epsilon = 1e-6);

        let without = LaneConfig::default();
        assert_eq!(error_score(&snapshot, &without, &SensorContext::default()), 0.0);
    }

    #[test]
    fn summary_gates_candidates_on_alignment() {
        let mut snapshot = aligned();
        snapshot.states_initialised = true;
        snapshot.timing.imu_sample_ms = 5_000;
        let config = LaneConfig::default();

        let summary = LaneSummary::evaluate(&snapshot, &config, &SensorContext::default());
        assert!(summary.is_candidate());

        snapshot.tilt_aligned = false;
        let summary = LaneSummary::evaluate(&snapshot, &config, &SensorContext::default());
        assert!(summary.healthy);
        assert!(!summary.is_candidate());
        assert_eq!(summary.error_score, 0.0);
    }
}
