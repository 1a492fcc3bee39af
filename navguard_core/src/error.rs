// navguard_core/src/error.rs

use thiserror::Error;

use crate::reporting::faults::FaultBits;

/// Why a snapshot failed the health check. The variants follow the order in
/// which the checks run; the first failing check is reported.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum UnhealthyReason {
    #[error("filter faults present: {0:?}")]
    Faults(FaultBits),

    #[error("velocity, position and height test ratios all exceed 1 ({vel:.2}, {pos:.2}, {hgt:.2})")]
    CompoundDivergence { vel: f32, pos: f32, hgt: f32 },

    #[error("filter still settling ({elapsed_ms} ms since start)")]
    Settling { elapsed_ms: u32 },

    #[error("static innovations out of bounds on ground (horizontal {horiz_sq:.2} m^2, height {height:.2} m)")]
    StaticInnovations { horiz_sq: f32, height: f32 },
}

/// Lane configuration rejected by `LaneConfig::validate`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("max_flow_rate must be finite and non-negative, got {0}")]
    InvalidFlowRate(f32),
}
