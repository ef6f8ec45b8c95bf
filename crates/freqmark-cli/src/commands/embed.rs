use std::path::PathBuf;

use clap::Args;
use freqmark_core::WatermarkOptions;

use crate::CliResult;

/// Embeds a text or image watermark into a PNG image
#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Background image that receives the watermark, used readonly.
    #[arg(short = 'i', long = "in", value_name = "background image", required = true)]
    pub background: PathBuf,

    /// Watermarked image will be stored as PNG file
    #[arg(
        short = 'o',
        long = "out",
        value_name = "output image file",
        required = true
    )]
    pub write_to_file: PathBuf,

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

impl EmbedArgs {
    pub fn run(self, options: WatermarkOptions) -> CliResult<()> {
        freqmark_core::api::embed::prepare()
            .with_options(options)
            .use_text(self.message)
            .use_watermark_image(self.watermark)
            .with_background(self.background)
            .with_output(self.write_to_file)
            .execute()
    }
}
