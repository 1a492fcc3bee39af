// navguard_sim/src/cli.rs

use clap::Parser;
use std::path::PathBuf;

/// Replays scripted estimator lanes through the navigation health monitor.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The path to the scenario TOML file to replay.
    #[arg(short, long, default_value = "assets/scenarios/gps_outage.toml")]
    pub scenario: PathBuf,

    /// Directory of lane profiles that scenarios may reference by name.
    #[arg(short, long, default_value = "assets/catalog")]
    pub catalog: PathBuf,

    /// Log filter used when `RUST_LOG` is not set, e.g. `debug` or `navguard_core=trace`.
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
