// navguard_core/src/reporting/mod.rs

//! Externally consumed reports: fault and status bitmasks, innovations and
//! consistency metrics.

pub mod faults;
pub mod innovations;

pub use faults::{
    filter_faults, FaultBits, FaultStatusAggregator, FilterFaults, GpsCheckBits, StatusBits,
    StatusReport,
};
pub use innovations::{
    InnovationReport, InnovationReporter, SourceInnovation, SynthAirDataInnovations,
    VarianceReport,
};

#[cfg(feature = "body-odom")]
pub use innovations::BodyOdomDebug;
