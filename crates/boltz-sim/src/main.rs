use std::error::Error;

use clap::{Parser, Subcommand};
use commands::{
    run::{self, RunArgs},
    sweep::{self, SweepArgs},
    validate::{self, ValidateArgs},
};

mod commands;

#[derive(Parser, Debug)]
#[command(name = "boltz-sim", about = "Canonical-ensemble Metropolis sampler CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the configured replicates at a single β.
    Run(RunArgs),
    /// Run the configured β sweep, streaming results per batch.
    Sweep(SweepArgs),
    /// Check a configuration and print the resolved parameters.
    Validate(ValidateArgs),
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    match cli.command {
        Command::Run(args) => run::run(&args),
        Command::Sweep(args) => sweep::run(&args),
        Command::Validate(args) => validate::run(&args),
    }
}
