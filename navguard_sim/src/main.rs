// navguard_sim/src/main.rs

use std::process::ExitCode;

use clap::Parser;
use navguard_sim::cli::Cli;
use navguard_sim::prelude::*;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    let cli = Cli::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let catalog = load_catalog(&cli.catalog);
    info!(profiles = catalog.len(), "profile catalog ready");

    let scenario = match load_scenario(&cli.scenario, &catalog) {
        Ok(scenario) => scenario,
        Err(e) => {
            error!(%e, "could not load scenario");
            return ExitCode::FAILURE;
        }
    };

    let report = run(&scenario);
    for switch in &report.switches {
        let to = &report.lane_names[switch.to];
        let from = switch.from.map(|index| report.lane_names[index].as_str());
        info!(at_ms = switch.at_ms, ?from, %to, "lane switch");
    }
    ExitCode::SUCCESS
}
