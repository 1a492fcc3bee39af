// navguard_sim/src/lib.rs

// This prelude is for convenience for other files WITHIN the navguard_sim crate.
pub mod prelude;

pub mod arbiter;
pub mod cli;
pub mod error;
pub mod providers;
pub mod replay;
pub mod scenario;
