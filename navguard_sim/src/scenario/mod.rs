// navguard_sim/src/scenario/mod.rs

//! Loading, resolving and validating replay scenarios from disk.

mod catalog;
mod config;
mod resolver;

use std::path::Path;

use figment::{
    providers::{Format, Toml},
    value::{Dict, Tag, Value},
    Figment,
};
use navguard_core::prelude::{EstimatorSnapshot, LaneConfig, TimeMs};
use tracing::info;

pub use catalog::{load_catalog, ProfileCatalog};
pub use config::{
    AirspeedScript, CompassScript, GpsScript, LaneScript, Outage, RangeFinderScript,
    ReplayConfig, ScenarioConfig, SensorsConfig, SnapshotEvent,
};
pub use resolver::{deep_merge, resolve_lane_config};

use crate::error::ScenarioError;

/// A lane ready to replay: its configuration and the full snapshot in effect
/// from each keyframe time onwards, in time order.
#[derive(Debug, Clone)]
pub struct ResolvedLane {
    pub name: String,
    pub config: LaneConfig,
    pub keyframes: Vec<(TimeMs, EstimatorSnapshot)>,
}

#[derive(Debug, Clone)]
pub struct Scenario {
    pub replay: ReplayConfig,
    pub sensors: SensorsConfig,
    pub lanes: Vec<ResolvedLane>,
}

/// Reads the scenario at `path` and resolves every lane against `catalog`.
pub fn load_scenario(path: &Path, catalog: &ProfileCatalog) -> Result<Scenario, ScenarioError> {
    info!(?path, "loading scenario");
    let raw: ScenarioConfig = Figment::new()
        .merge(Toml::file(path))
        .extract()
        .map_err(|e| ScenarioError::Load {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
    resolve_scenario(raw, catalog)
}

/// Resolves an already-parsed scenario. Split out so tests can build
/// scenarios from strings.
pub fn resolve_scenario(
    raw: ScenarioConfig,
    catalog: &ProfileCatalog,
) -> Result<Scenario, ScenarioError> {
    if raw.lanes.is_empty() {
        return Err(ScenarioError::NoLanes);
    }
    if raw.replay.cycle_ms == 0 {
        return Err(ScenarioError::ZeroCycle);
    }

    let lanes = raw
        .lanes
        .iter()
        .map(|lane| {
            let config = resolve_lane_config(lane, catalog)?;
            let keyframes = build_keyframes(lane)?;
            info!(lane = %lane.name, keyframes = keyframes.len(), "resolved lane");
            Ok(ResolvedLane {
                name: lane.name.clone(),
                config,
                keyframes,
            })
        })
        .collect::<Result<Vec<_>, ScenarioError>>()?;

    Ok(Scenario {
        replay: raw.replay,
        sensors: raw.sensors,
        lanes,
    })
}

/// Applies the lane's events cumulatively over its initial snapshot. Every
/// intermediate state is extracted here so malformed events fail at load time.
fn build_keyframes(lane: &LaneScript) -> Result<Vec<(TimeMs, EstimatorSnapshot)>, ScenarioError> {
    let mut events: Vec<&SnapshotEvent> = lane.events.iter().collect();
    events.sort_by_key(|event| event.at_ms);

    let mut state: Dict = lane.initial.clone();
    let mut keyframes = vec![(0, extract_snapshot(lane, 0, &state)?)];
    for event in events {
        deep_merge(&mut state, &event.set);
        keyframes.push((event.at_ms, extract_snapshot(lane, event.at_ms, &state)?));
    }
    Ok(keyframes)
}

fn extract_snapshot(
    lane: &LaneScript,
    at_ms: TimeMs,
    state: &Dict,
) -> Result<EstimatorSnapshot, ScenarioError> {
    Value::Dict(Tag::Default, state.clone())
        .deserialize()
        .map_err(|e| ScenarioError::Snapshot {
            lane: lane.name.clone(),
            at_ms,
            source: Box::new(e),
        })
}
