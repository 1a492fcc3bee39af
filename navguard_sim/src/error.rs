// navguard_sim/src/error.rs

use std::path::PathBuf;

use navguard_core::error::ConfigError;
use thiserror::Error;

/// Everything that can go wrong between a scenario file on disk and a
/// runnable replay.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("failed to load scenario {path}: {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("lane '{lane}' references unknown profile '{profile}'")]
    UnknownProfile { lane: String, profile: String },

    #[error("profile '{0}' must be a table to be merged")]
    ProfileNotATable(String),

    #[error("lane '{lane}': {source}")]
    LaneConfig {
        lane: String,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("lane '{lane}': snapshot at {at_ms} ms is malformed: {source}")]
    Snapshot {
        lane: String,
        at_ms: u32,
        #[source]
        source: Box<figment::Error>,
    },

    #[error(transparent)]
    InvalidConfig(#[from] ConfigError),

    #[error("scenario has no lanes")]
    NoLanes,

    #[error("cycle period must be non-zero")]
    ZeroCycle,
}
