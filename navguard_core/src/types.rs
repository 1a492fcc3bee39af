// navguard_core/src/types.rs

use serde::{Deserialize, Serialize};

// --- Core Type Aliases ---
/// Milliseconds on the flight stack's monotonic clock. Wraps like the hardware counter.
pub type TimeMs = u32;

// --- Aiding ---
/// The estimator's current reliance tier for horizontal position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum AidingMode {
    /// Dead-reckoning only, no position aiding.
    #[default]
    None,
    /// Relative aiding, e.g. optical flow.
    Relative,
    /// Absolute aiding, e.g. GPS.
    Absolute,
}

/// Horizontal velocity/position sources a lane can be configured to use.
///
/// Only `Gps` and `ExtNav` publish velocity innovation variances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum VelocitySource {
    None,
    #[default]
    Gps,
    Beacon,
    OpticalFlow,
    ExtNav,
    WheelEncoder,
}

/// Vertical position sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum HeightSource {
    #[default]
    Baro,
    RangeFinder,
    Gps,
    Beacon,
    ExtNav,
}

// --- Value + validity ---
/// A value paired with a flag saying whether consumers may trust it.
///
/// Degraded conditions never produce an error: the value is still the best
/// available answer and `valid` carries the degradation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Estimate<T> {
    pub value: T,
    pub valid: bool,
}

impl<T> Estimate<T> {
    pub fn valid(value: T) -> Self {
        Self { value, valid: true }
    }

    pub fn invalid(value: T) -> Self {
        Self {
            value,
            valid: false,
        }
    }
}

// --- Reset records ---
/// The change applied by the most recent reset of one kind.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, bound(deserialize = "T: Deserialize<'de> + Default"))]
pub struct ResetEvent<T> {
    pub magnitude: T,
    /// Time of the reset, 0 if it never happened.
    pub time_ms: TimeMs,
}

impl<T> ResetEvent<T> {
    pub fn has_occurred(&self) -> bool {
        self.time_ms != 0
    }
}
