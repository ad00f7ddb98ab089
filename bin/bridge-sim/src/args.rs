//! Parses command-line arguments for the bridge simulator.

use std::path::PathBuf;

use clap::{crate_version, Parser, Subcommand};

#[derive(Debug, Parser)]
#[clap(
    name = "bridge-sim",
    about = "Simulates a hub-and-spoke token bridge",
    version = crate_version!()
)]
pub(crate) struct Cli {
    #[clap(
        long,
        short = 'p',
        help = "The file containing the protocol params; defaults apply if it is missing",
        default_value = "params.toml"
    )]
    pub params: PathBuf,

    #[clap(
        long,
        short = 'c',
        help = "The file containing the network topology",
        default_value = "config.toml"
    )]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Builds the network from the config and prints its snapshot.
    Status,

    /// Runs a scenario against the network and prints the step reports and the final snapshot.
    Run {
        #[clap(long, short = 's', help = "The scenario file")]
        scenario: PathBuf,

        #[clap(long, help = "Print only the step reports")]
        quiet: bool,
    },
}
