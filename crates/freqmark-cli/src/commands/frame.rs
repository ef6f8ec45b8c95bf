use std::path::PathBuf;

use clap::Args;
use freqmark_core::WatermarkOptions;

use crate::CliResult;

/// Prints the framed bit string a watermark would be embedded as
#[derive(Args, Debug)]
pub struct FrameArgs {
    /// A text message used as watermark
    #[arg(
        short,
        long,
        value_name = "text message",
        required_unless_present = "watermark"
    )]
    pub message: Option<String>,

    /// An image used as watermark, wins over a text message
    #[arg(short, long, value_name = "watermark image")]
    pub watermark: Option<PathBuf>,
}

impl FrameArgs {
    pub fn run(self, options: WatermarkOptions) -> CliResult<()> {
        let framed = freqmark_core::api::frame::prepare()
            .with_options(options)
            .use_text(self.message)
            .use_watermark_image(self.watermark)
            .execute()?;

        println!("{}", framed.as_str());
        Ok(())
    }
}
