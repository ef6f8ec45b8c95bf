use clap::{Parser, Subcommand};
use freqmark_core::WatermarkOptions;

use crate::commands::*;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct CliArgs {
    /// Experimental: number of pixels transformed together
    #[arg(long = "x-chunk-size", default_value = "5000", global = true)]
    pub chunk_size: usize,

    /// Experimental: transform chunks in parallel
    #[arg(long = "x-parallel", global = true)]
    pub parallel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

impl CliArgs {
    pub fn options(&self) -> WatermarkOptions {
        WatermarkOptions::default()
            .with_chunk_size(self.chunk_size)
            .with_parallel(self.parallel)
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Embed(embed::EmbedArgs),
    Frame(frame::FrameArgs),
}
