// navguard_core/src/reporting/innovations.rs

use nalgebra::{Vector2, Vector3};

use crate::snapshot::EstimatorSnapshot;
use crate::types::{TimeMs, VelocitySource};

/// Per-source innovations older than this are considered stale.
pub const SOURCE_INNOVATION_TIMEOUT_MS: TimeMs = 500;

/// Magnetometer innovations are stored in gauss; sensors report milligauss.
const MAG_SENSOR_UNITS: f32 = 1000.0;

/// Raw innovations, magnetometer rescaled to sensor units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InnovationReport {
    pub velocity: Vector3<f32>,
    pub position: Vector3<f32>,
    pub magnetometer: Vector3<f32>,
    pub airspeed: f32,
    pub yaw: f32,
}

/// Consistency expressed as square roots of the test ratios.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarianceReport {
    pub velocity: f32,
    pub position: f32,
    pub height: f32,
    pub magnetometer: Vector3<f32>,
    pub airspeed: f32,
    /// NE position change applied by the most recent position reset.
    pub pos_reset_offset: Vector2<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SourceInnovation {
    pub innovation: Vector3<f32>,
    pub variance: Vector3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthAirDataInnovations {
    pub drag: Vector2<f32>,
    pub sideslip: f32,
}

#[cfg(feature = "body-odom")]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyOdomDebug {
    pub innovation: Vector3<f32>,
    pub variance: Vector3<f32>,
    /// Latest of the body and wheel odometry sample times.
    pub time_ms: TimeMs,
}

pub struct InnovationReporter<'a> {
    snapshot: &'a EstimatorSnapshot,
}

impl<'a> InnovationReporter<'a> {
    pub fn new(snapshot: &'a EstimatorSnapshot) -> Self {
        Self { snapshot }
    }

    pub fn innovations(&self) -> InnovationReport {
        let innov = &self.snapshot.innovations;
        InnovationReport {
            velocity: innov.velocity(),
            position: innov.position(),
            magnetometer: innov.mag * MAG_SENSOR_UNITS,
            airspeed: innov.airspeed,
            yaw: innov.yaw,
        }
    }

    pub fn variances(&self) -> VarianceReport {
        let ratios = &self.snapshot.test_ratios;
        // With yaw-only compass fusion the yaw ratio stands in for every axis.
        let magnetometer = ratios.mag.map(|axis| axis.max(ratios.yaw).sqrt());
        VarianceReport {
            velocity: ratios.velocity.sqrt(),
            position: ratios.position.sqrt(),
            height: ratios.height.sqrt(),
            magnetometer,
            airspeed: ratios.airspeed.sqrt(),
            pos_reset_offset: self.snapshot.resets.pos_ne.magnitude,
        }
    }

    /// Velocity innovations published by `source`, if that source publishes
    /// variances and its last update is no older than 500 ms at `now_ms`.
    pub fn vel_innovations_for_source(
        &self,
        source: VelocitySource,
        now_ms: TimeMs,
    ) -> Option<SourceInnovation> {
        let record = self.snapshot.source_innovations.record(source)?;
        if now_ms.wrapping_sub(record.time_ms) > SOURCE_INNOVATION_TIMEOUT_MS {
            return None;
        }
        Some(SourceInnovation {
            innovation: record.innovation,
            variance: record.variance,
        })
    }

    /// Synthetic drag and sideslip innovations. Zero when drag fusion is not built in.
    pub fn synth_air_data_innovations(&self) -> SynthAirDataInnovations {
        #[cfg(feature = "drag-fusion")]
        {
            SynthAirDataInnovations {
                drag: self.snapshot.innovations.drag,
                sideslip: self.snapshot.innovations.sideslip,
            }
        }
        #[cfg(not(feature = "drag-fusion"))]
        {
            SynthAirDataInnovations {
                drag: Vector2::zeros(),
                sideslip: 0.0,
            }
        }
    }

    #[cfg(feature = "body-odom")]
    pub fn body_odom_debug(&self) -> BodyOdomDebug {
        let odom = &self.snapshot.body_odom;
        BodyOdomDebug {
            innovation: odom.innovation,
            variance: odom.variance,
            time_ms: odom.body_odm_time_ms.max(odom.wheel_odm_time_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::VelInnovationRecord;
    use approx::assert_abs_diff_eq;

    fn with_gps_record(time_ms: TimeMs) -> EstimatorSnapshot {
        let mut snapshot = EstimatorSnapshot::default();
        snapshot.source_innovations.gps = Some(VelInnovationRecord {
            innovation: Vector3::new(0.1, -0.2, 0.05),
            variance: Vector3::new(0.3, 0.3, 0.6),
            time_ms,
        });
        snapshot
    }

    #[test]
    fn magnetometer_innovations_are_rescaled() {
        let mut snapshot = EstimatorSnapshot::default();
        snapshot.innovations.vel_pos = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        snapshot.innovations.mag = Vector3::new(0.001, -0.002, 0.0005);
        snapshot.innovations.airspeed = 1.5;
        snapshot.innovations.yaw = -0.1;

        let report = InnovationReporter::new(&snapshot).innovations();
        assert_eq!(report.velocity, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(report.position, Vector3::new(4.0, 5.0, 6.0));
        assert_abs_diff_eq!(report.magnetometer.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(report.magnetometer.y, -2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(report.magnetometer.z, 0.5, epsilon = 1e-5);
        assert_eq!(report.airspeed, 1.5);
        assert_eq!(report.yaw, -0.1);
    }

    #[test]
    fn yaw_ratio_substitutes_for_weaker_mag_axes() {
        let mut snapshot = EstimatorSnapshot::default();
        snapshot.test_ratios.mag = Vector3::new(0.01, 0.49, 0.0);
        snapshot.test_ratios.yaw = 0.25;
        snapshot.resets.pos_ne.magnitude = Vector2::new(3.0, -1.0);

        let variances = InnovationReporter::new(&snapshot).variances();
        assert_abs_diff_eq!(variances.magnetometer.x, 0.5, epsilon = 1e-6);
        assert_abs_diff_eq!(variances.magnetometer.y, 0.7, epsilon = 1e-6);
        assert_abs_diff_eq!(variances.magnetometer.z, 0.5, epsilon = 1e-6);
        assert_eq!(variances.pos_reset_offset, Vector2::new(3.0, -1.0));
    }

    #[test]
    fn gps_source_goes_stale_after_500_ms() {
        let snapshot = with_gps_record(10_000);
        let reporter = InnovationReporter::new(&snapshot);

        let fresh = reporter
            .vel_innovations_for_source(VelocitySource::Gps, 10_500)
            .expect("record is exactly at the timeout");
        assert_eq!(fresh.innovation, Vector3::new(0.1, -0.2, 0.05));
        assert_eq!(fresh.variance, Vector3::new(0.3, 0.3, 0.6));

        assert!(reporter
            .vel_innovations_for_source(VelocitySource::Gps, 10_501)
            .is_none());
    }

    #[test]
    fn sources_without_variances_always_fail() {
        let snapshot = with_gps_record(1_000);
        let reporter = InnovationReporter::new(&snapshot);
        for source in [
            VelocitySource::None,
            VelocitySource::Beacon,
            VelocitySource::OpticalFlow,
            VelocitySource::WheelEncoder,
        ] {
            assert!(reporter.vel_innovations_for_source(source, 1_000).is_none());
        }
        // External navigation publishes variances but has no record yet.
        assert!(reporter
            .vel_innovations_for_source(VelocitySource::ExtNav, 1_000)
            .is_none());
    }

    #[cfg(feature = "drag-fusion")]
    #[test]
    fn synthetic_air_data_passes_through() {
        let mut snapshot = EstimatorSnapshot::default();
        snapshot.innovations.drag = Vector2::new(0.2, -0.3);
        snapshot.innovations.sideslip = 0.04;
        let synth = InnovationReporter::new(&snapshot).synth_air_data_innovations();
        assert_eq!(synth.drag, Vector2::new(0.2, -0.3));
        assert_eq!(synth.sideslip, 0.04);
    }

    #[cfg(feature = "body-odom")]
    #[test]
    fn body_odom_reports_latest_sample_time() {
        let mut snapshot = EstimatorSnapshot::default();
        snapshot.body_odom.body_odm_time_ms = 1200;
        snapshot.body_odom.wheel_odm_time_ms = 1350;
        let debug = InnovationReporter::new(&snapshot).body_odom_debug();
        assert_eq!(debug.time_ms, 1350);
    }
}
