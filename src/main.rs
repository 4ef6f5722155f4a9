mod archive;
mod cli;
mod config;
mod extract;
mod hash;
mod logging;
mod package;
mod scan;
mod utils;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands, ExtractArgs};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Some(Commands::Extract(args)) => scan::run(args, config_path)?,
        Some(Commands::Config(args)) => config::commands::run(args, config_path)?,
        None => scan::run(ExtractArgs::default(), config_path)?,
    }

    Ok(())
}
