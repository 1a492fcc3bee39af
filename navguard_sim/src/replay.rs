// navguard_sim/src/replay.rs

//! Runs every lane of a scenario through the monitoring layer, one cycle at
//! a time, and lets the arbiter pick the primary.

use navguard_core::prelude::*;
use navguard_core::reporting::StatusReport;
use tracing::{debug, info, warn};

use crate::arbiter::{LaneArbiter, LaneSwitch};
use crate::providers::SensorFrame;
use crate::scenario::{ResolvedLane, Scenario};

/// One lane's snapshot stream, advanced to the replay clock.
pub struct LaneReplay<'a> {
    lane: &'a ResolvedLane,
    cursor: usize,
    snapshot: EstimatorSnapshot,
}

impl<'a> LaneReplay<'a> {
    pub fn new(lane: &'a ResolvedLane) -> Self {
        let snapshot = lane
            .keyframes
            .first()
            .map(|(_, snapshot)| snapshot.clone())
            .unwrap_or_default();
        Self {
            lane,
            cursor: 0,
            snapshot,
        }
    }

    pub fn name(&self) -> &str {
        &self.lane.name
    }

    pub fn config(&self) -> &LaneConfig {
        &self.lane.config
    }

    /// Moves to the latest keyframe at or before `now_ms` and stamps the IMU time.
    pub fn advance(&mut self, now_ms: TimeMs) {
        let keyframes = &self.lane.keyframes;
        while let Some((at_ms, snapshot)) = keyframes.get(self.cursor + 1) {
            if *at_ms > now_ms {
                break;
            }
            self.cursor += 1;
            self.snapshot = snapshot.clone();
        }
        self.snapshot.timing.imu_sample_ms = now_ms;
    }
}

impl SnapshotSource for LaneReplay<'_> {
    fn snapshot(&self) -> &EstimatorSnapshot {
        &self.snapshot
    }
}

/// What the primary lane reported in one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimaryOutput {
    pub status: StatusReport,
    pub llh: Estimate<Location>,
    pub hagl: Estimate<f32>,
    pub limits: ControlLimits,
    pub height_limit: Option<f32>,
}

/// A lane crossing between healthy and unhealthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthChange {
    pub at_ms: TimeMs,
    pub lane: usize,
    pub healthy: bool,
}

#[derive(Debug, Clone)]
pub struct CycleRecord {
    pub now_ms: TimeMs,
    pub primary: Option<usize>,
    pub summaries: Vec<LaneSummary>,
    pub output: Option<PrimaryOutput>,
}

#[derive(Debug, Clone, Default)]
pub struct ReplayReport {
    pub name: String,
    pub lane_names: Vec<String>,
    pub cycles: Vec<CycleRecord>,
    pub switches: Vec<LaneSwitch>,
    pub health_changes: Vec<HealthChange>,
}

impl ReplayReport {
    /// The primary lane in effect at `now_ms`, from the last cycle not after it.
    pub fn primary_at(&self, now_ms: TimeMs) -> Option<usize> {
        self.cycles
            .iter()
            .take_while(|cycle| cycle.now_ms <= now_ms)
            .last()
            .and_then(|cycle| cycle.primary)
    }

    pub fn final_primary(&self) -> Option<usize> {
        self.cycles.last().and_then(|cycle| cycle.primary)
    }
}

pub fn run(scenario: &Scenario) -> ReplayReport {
    let replay = &scenario.replay;
    info!(
        name = %replay.name,
        lanes = scenario.lanes.len(),
        duration_ms = replay.duration_ms,
        "starting replay"
    );

    let mut lanes: Vec<LaneReplay> = scenario.lanes.iter().map(LaneReplay::new).collect();
    // Lanes start out unhealthy until they settle, so the first transition
    // logged for a lane is it becoming usable.
    let mut was_healthy = vec![false; lanes.len()];
    let mut arbiter = LaneArbiter::new(replay.switch_margin);
    let mut report = ReplayReport {
        name: replay.name.clone(),
        lane_names: lanes.iter().map(|lane| lane.name().to_string()).collect(),
        ..Default::default()
    };

    for now_ms in (0..=replay.duration_ms).step_by(replay.cycle_ms as usize) {
        let frame = SensorFrame::at(&scenario.sensors, now_ms);
        let sensors = frame.context();

        let mut summaries = Vec::with_capacity(lanes.len());
        for (index, lane) in lanes.iter_mut().enumerate() {
            lane.advance(now_ms);
            let snapshot = lane.snapshot();
            let summary = LaneSummary::evaluate(snapshot, lane.config(), &sensors);

            match check_health(snapshot) {
                Err(reason) if was_healthy[index] => {
                    let prearm = Diagnostics::new(snapshot, sensors).prearm_failure_reason();
                    warn!(lane = lane.name(), at_ms = now_ms, %reason, ?prearm, "lane unhealthy");
                    was_healthy[index] = false;
                    report.health_changes.push(HealthChange {
                        at_ms: now_ms,
                        lane: index,
                        healthy: false,
                    });
                }
                Ok(()) if !was_healthy[index] => {
                    info!(lane = lane.name(), at_ms = now_ms, "lane healthy");
                    was_healthy[index] = true;
                    report.health_changes.push(HealthChange {
                        at_ms: now_ms,
                        lane: index,
                        healthy: true,
                    });
                }
                _ => {}
            }
            summaries.push(summary);
        }

        if let Some(switch) = arbiter.update(now_ms, &summaries) {
            report.switches.push(switch);
        }

        let output = arbiter.primary().and_then(|index| lanes.get(index)).map(|lane| {
            let snapshot = lane.snapshot();
            let position = PositionResolver::new(snapshot, lane.config(), sensors);
            let guidance = GuidanceLimits::new(snapshot, lane.config(), sensors);
            let output = PrimaryOutput {
                status: FaultStatusAggregator::new(snapshot).status_report(),
                llh: position.llh(),
                hagl: position.hagl(),
                limits: guidance.control_limits(),
                height_limit: guidance.height_control_limit(),
            };
            debug!(
                lane = lane.name(),
                at_ms = now_ms,
                flags = output.status.flags.bits(),
                vel_var = output.status.vel_var,
                pos_var = output.status.pos_var,
                hgt_var = output.status.hgt_var,
                llh_valid = output.llh.valid,
                "primary output"
            );
            output
        });

        report.cycles.push(CycleRecord {
            now_ms,
            primary: arbiter.primary(),
            summaries,
            output,
        });
    }

    info!(
        name = %replay.name,
        cycles = report.cycles.len(),
        switches = report.switches.len(),
        final_primary = ?report.final_primary(),
        "replay finished"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{ReplayConfig, SensorsConfig};

    fn settled(at_ms: TimeMs, velocity_ratio: f32) -> (TimeMs, EstimatorSnapshot) {
        let mut snapshot = EstimatorSnapshot {
            states_initialised: true,
            tilt_aligned: true,
            yaw_aligned: true,
            aiding_mode: AidingMode::Absolute,
            ..Default::default()
        };
        snapshot.test_ratios.velocity = velocity_ratio;
        snapshot.test_ratios.position = velocity_ratio;
        (at_ms, snapshot)
    }

    fn scenario(lanes: Vec<ResolvedLane>) -> Scenario {
        Scenario {
            replay: ReplayConfig {
                name: "unit".to_string(),
                duration_ms: 3_000,
                cycle_ms: 500,
                switch_margin: 0.3,
            },
            sensors: SensorsConfig::default(),
            lanes,
        }
    }

    fn lane(name: &str, keyframes: Vec<(TimeMs, EstimatorSnapshot)>) -> ResolvedLane {
        ResolvedLane {
            name: name.to_string(),
            config: LaneConfig::default(),
            keyframes,
        }
    }

    #[test]
    fn lane_replay_follows_keyframes_and_clock() {
        let resolved = lane("imu0", vec![settled(0, 0.1), settled(1_000, 0.7)]);
        let mut replay = LaneReplay::new(&resolved);

        replay.advance(999);
        assert_eq!(replay.snapshot().test_ratios.velocity, 0.1);
        assert_eq!(replay.snapshot().timing.imu_sample_ms, 999);

        replay.advance(1_000);
        assert_eq!(replay.snapshot().test_ratios.velocity, 0.7);
    }

    #[test]
    fn no_primary_until_a_lane_settles() {
        let scenario = scenario(vec![lane("imu0", vec![settled(0, 0.1)])]);
        let report = run(&scenario);

        assert_eq!(report.cycles.len(), 7);
        assert_eq!(report.primary_at(500), None);
        assert_eq!(report.primary_at(1_000), Some(0));
        assert!(report.cycles[0].output.is_none());
        assert!(report.cycles[2].output.is_some());
    }

    #[test]
    fn settling_lanes_only_report_becoming_healthy() {
        let scenario = scenario(vec![
            lane("imu0", vec![settled(0, 0.1)]),
            lane("imu1", vec![settled(0, 0.2)]),
        ]);
        let report = run(&scenario);

        assert_eq!(
            report.health_changes,
            vec![
                HealthChange { at_ms: 1_000, lane: 0, healthy: true },
                HealthChange { at_ms: 1_000, lane: 1, healthy: true },
            ]
        );
    }

    #[test]
    fn lane_losing_health_after_settling_is_reported() {
        let mut faulted = settled(2_000, 0.1);
        faulted.1.faults.bad_airspeed = true;
        let scenario = scenario(vec![lane("imu0", vec![settled(0, 0.1), faulted])]);
        let report = run(&scenario);

        assert_eq!(
            report.health_changes,
            vec![
                HealthChange { at_ms: 1_000, lane: 0, healthy: true },
                HealthChange { at_ms: 2_000, lane: 0, healthy: false },
            ]
        );
    }

    #[test]
    fn degrading_primary_hands_over() {
        let scenario = scenario(vec![
            lane("imu0", vec![settled(0, 0.1), settled(2_000, 0.9)]),
            lane("imu1", vec![settled(0, 0.2)]),
        ]);
        let report = run(&scenario);

        assert_eq!(report.primary_at(1_500), Some(0));
        assert_eq!(report.final_primary(), Some(1));
        assert_eq!(report.switches.len(), 2);
        assert_eq!(report.switches[1].at_ms, 2_000);
    }
}
