// navguard_core/src/lib.rs

// Everything here reads a published estimator snapshot; nothing writes one.
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod geo;
pub mod guidance;
pub mod health;
pub mod position;
pub mod prelude;
pub mod reporting;
pub mod scoring;
pub mod sensors;
pub mod snapshot;
pub mod types;
