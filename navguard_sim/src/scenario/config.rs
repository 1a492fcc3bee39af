// navguard_sim/src/scenario/config.rs

//! The on-disk shape of a replay scenario.

use figment::value::Dict;
use nalgebra::Vector3;
use navguard_core::prelude::{GpsFix, Location, RangeOrientation, TimeMs};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    pub replay: ReplayConfig,
    #[serde(default)]
    pub sensors: SensorsConfig,
    #[serde(default)]
    pub lanes: Vec<LaneScript>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplayConfig {
    pub name: String,
    pub duration_ms: TimeMs,
    #[serde(default = "default_cycle_ms")]
    pub cycle_ms: TimeMs,
    /// Score advantage a candidate needs before the arbiter leaves a healthy primary.
    #[serde(default = "default_switch_margin")]
    pub switch_margin: f32,
}

fn default_cycle_ms() -> TimeMs {
    100
}

fn default_switch_margin() -> f32 {
    0.3
}

/// One estimator lane: its configuration and how its snapshot evolves.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaneScript {
    pub name: String,
    /// Catalog key of a lane profile, e.g. `lanes.copter_gps`.
    #[serde(default)]
    pub profile: Option<String>,
    /// Merged over the profile.
    #[serde(default)]
    pub config: Dict,
    /// Snapshot fields in effect from the start of the replay.
    #[serde(default)]
    pub initial: Dict,
    #[serde(default)]
    pub events: Vec<SnapshotEvent>,
}

/// A partial snapshot merged over the lane's state from `at_ms` onwards.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SnapshotEvent {
    pub at_ms: TimeMs,
    pub set: Dict,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SensorsConfig {
    pub gps: Option<GpsScript>,
    pub rangefinder: Option<RangeFinderScript>,
    pub compass: Option<CompassScript>,
    pub airspeed: Option<AirspeedScript>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GpsScript {
    pub fix: GpsFix,
    pub location: Location,
    #[serde(default = "default_satellites")]
    pub num_satellites: u8,
    /// Windows during which the receiver has no fix.
    #[serde(default)]
    pub outages: Vec<Outage>,
}

fn default_satellites() -> u8 {
    12
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Outage {
    pub start_ms: TimeMs,
    pub end_ms: TimeMs,
}

impl Outage {
    pub fn contains(&self, now_ms: TimeMs) -> bool {
        (self.start_ms..self.end_ms).contains(&now_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RangeFinderScript {
    #[serde(default = "default_orientation")]
    pub orientation: RangeOrientation,
    pub max_range_m: f32,
    #[serde(default)]
    pub ground_clearance_m: f32,
}

fn default_orientation() -> RangeOrientation {
    RangeOrientation::Down
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompassScript {
    #[serde(default = "default_true")]
    pub healthy: bool,
    /// Hard-iron offsets per compass instance, milligauss.
    #[serde(default)]
    pub offsets: Vec<Vector3<f32>>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AirspeedScript {
    pub sensor_count: u8,
}

