// navguard_core/src/config.rs

//! Per-lane configuration. Every operation receives this explicitly so that
//! redundant lanes can run side by side with different sensor affinities.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{HeightSource, VelocitySource};

/// The full configuration of one estimator lane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LaneConfig {
    pub affinity: AffinityFlags,
    pub sources: SourceSelection,
    pub origin_height_mode: OriginHeightMode,
    /// Maximum rate the optical flow sensor can measure, in rad/s.
    pub max_flow_rate: f32,
    pub vehicle: VehicleProfile,
}

impl Default for LaneConfig {
    fn default() -> Self {
        Self {
            affinity: AffinityFlags::default(),
            sources: SourceSelection::default(),
            origin_height_mode: OriginHeightMode::default(),
            max_flow_rate: 2.5,
            vehicle: VehicleProfile::default(),
        }
    }
}

impl LaneConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.max_flow_rate.is_finite() || self.max_flow_rate < 0.0 {
            return Err(ConfigError::InvalidFlowRate(self.max_flow_rate));
        }
        Ok(())
    }
}

/// Which sensors this lane is allowed to be judged on when its error score
/// is compared against other lanes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AffinityFlags {
    pub magnetometer: bool,
    pub airspeed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceSelection {
    pub velocity_xy: VelocitySource,
    pub position_z: HeightSource,
}

/// Where corrections of the height reference against WGS-84 are applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum OriginHeightMode {
    /// Corrections move the reported origin altitude; local heights stay untouched.
    #[default]
    CorrectOrigin,
    /// The origin altitude is static and corrections are folded into the local
    /// vertical position.
    CorrectLocal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum VehicleClass {
    #[default]
    Copter,
    FixedWing,
    Ground,
    Submarine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VehicleProfile {
    pub class: VehicleClass,
    /// The vehicle flies nose-first, like a plane in forward flight.
    pub fly_forward: bool,
}

impl VehicleProfile {
    /// Sideslip is negligible for forward-flying air vehicles.
    pub fn assume_zero_sideslip(&self) -> bool {
        self.fly_forward && self.class != VehicleClass::Ground
    }
}
