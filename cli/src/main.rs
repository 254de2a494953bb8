mod cli;
mod commands;
mod logger;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use commands::{fields, sum};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose)?;

    match &cli.command {
        Commands::Sum(args) => sum::run(&cli, args),
        Commands::Fields(args) => fields::run(&cli, args),
    }
}
