// navguard_sim/src/prelude.rs

// Re-export the core prelude so replay code reads the same as library code.
pub use navguard_core::prelude::*;

// --- Replay harness ---
pub use crate::arbiter::{LaneArbiter, LaneSwitch};
pub use crate::error::ScenarioError;
pub use crate::replay::{run, CycleRecord, HealthChange, LaneReplay, PrimaryOutput, ReplayReport};
pub use crate::scenario::{load_catalog, load_scenario, ProfileCatalog, Scenario};
