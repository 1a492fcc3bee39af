// navguard_core/src/prelude.rs

// --- Core Abstractions (The contracts with the outside world) ---
pub use crate::sensors::{
    AirspeedProvider, CompassProvider, GpsProvider, RangeFinderProvider, SensorContext,
};
pub use crate::snapshot::{EstimatorSnapshot, SnapshotSource};

// --- Core Data Structures ---
pub use crate::config::{LaneConfig, OriginHeightMode, VehicleClass};
pub use crate::geo::Location;
pub use crate::sensors::{GpsFix, RangeOrientation};
pub use crate::types::{AidingMode, Estimate, HeightSource, ResetEvent, TimeMs, VelocitySource};

// --- Evaluation (one snapshot in, one answer out) ---
pub use crate::diagnostics::Diagnostics;
pub use crate::guidance::{ControlLimits, GuidanceLimits};
pub use crate::health::{check_health, healthy};
pub use crate::position::PositionResolver;
pub use crate::reporting::{FaultStatusAggregator, InnovationReporter};
pub use crate::scoring::{error_score, LaneSummary};

// --- Errors ---
pub use crate::error::{ConfigError, UnhealthyReason};
