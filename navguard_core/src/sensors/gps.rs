// navguard_core/src/sensors/gps.rs

use serde::{Deserialize, Serialize};

use crate::geo::Location;
use crate::types::TimeMs;

/// Fix quality, ordered from worst to best so checks read as `fix >= GpsFix::Fix2D`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "PascalCase")]
pub enum GpsFix {
    #[default]
    NoGps,
    NoFix,
    Fix2D,
    Fix3D,
    Dgps,
    RtkFloat,
    RtkFixed,
}

/// Status of the GPS receivers, indexed by instance.
pub trait GpsProvider: Send + Sync {
    fn fix(&self, instance: u8) -> GpsFix;

    fn location(&self, instance: u8) -> Location;

    fn num_satellites(&self, instance: u8) -> u8;

    fn last_update_ms(&self, instance: u8) -> TimeMs;
}
