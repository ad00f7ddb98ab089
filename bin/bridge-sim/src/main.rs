//! The bridge simulator runs a Hub and its Gateways in one process and drives them from scenario
//! files.

use std::{fs, path::Path};

use anyhow::Context;
use args::{Cli, Command};
use clap::Parser;
use config::Config;
use omnibridge_common::logging;
use omnibridge_orchestrator::scenario::Scenario;
use omnibridge_params::BridgeParams;
use serde::de::DeserializeOwned;
use tracing::{debug, info, trace};

mod args;
mod bootstrap;
mod config;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = parse_toml::<Config>(&cli.config)?;

    let mut logger = logging::config_from_env("bridge-sim");
    if let Some(url) = &config.logging.otlp_url {
        logger.set_otlp_url(url.clone());
    }
    logging::init(logger).context("failed to initialize logging")?;

    let params = if cli.params.exists() {
        parse_toml::<BridgeParams>(&cli.params)?
    } else {
        info!(path = %cli.params.display(), "params file not found, using defaults");
        BridgeParams::default()
    };

    let mut network = bootstrap::bootstrap(params, &config)?;

    match cli.command {
        Command::Status => {
            println!("{}", network.snapshot_json()?);
        }
        Command::Run { scenario, quiet } => {
            let contents = fs::read_to_string(&scenario)
                .with_context(|| format!("failed to read scenario {}", scenario.display()))?;
            let scenario = Scenario::from_toml(&contents)?;
            info!(name = %scenario.name, "starting scenario");

            let report = scenario.run(&mut network)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
            if !quiet {
                println!("{}", network.snapshot_json()?);
            }
        }
    }

    info!("bridge simulation complete");
    Ok(())
}

/// Reads and parses a TOML file from the given path into the given type `T`.
fn parse_toml<T>(path: impl AsRef<Path>) -> anyhow::Result<T>
where
    T: std::fmt::Debug + DeserializeOwned,
{
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read TOML file {}", path.display()))?;
    trace!(?contents, "read file");

    let parsed = toml::from_str::<T>(&contents)
        .with_context(|| format!("failed to parse TOML file {}", path.display()))?;
    debug!(?parsed, "parsed TOML file");

    Ok(parsed)
}
