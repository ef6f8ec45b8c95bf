use clap::Parser;

use crate::cli::{CliArgs, Commands};

mod cli;
mod commands;

pub type CliResult<T> = freqmark_core::Result<T>;

fn main() -> CliResult<()> {
    env_logger::init();

    let args = CliArgs::parse();
    let options = args.options();

    match args.command {
        Commands::Embed(embed) => embed.run(options),
        Commands::Frame(frame) => frame.run(options),
    }
}
