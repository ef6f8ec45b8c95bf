use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::ImageFormat;
use log::error;

use super::open_image;
use crate::media::PixelBuffer;
use crate::task::WatermarkTask;
use crate::{WatermarkError, WatermarkOptions, WatermarkRequest};

pub fn prepare() -> EmbedApi {
    EmbedApi::default()
}

#[derive(Default, Debug)]
pub struct EmbedApi {
    text: Option<String>,
    watermark_image: Option<PathBuf>,
    background: Option<PathBuf>,
    output: Option<PathBuf>,
    options: WatermarkOptions,
}

impl EmbedApi {
    pub fn with_options(mut self, options: WatermarkOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(text.to_string());
        self
    }

    pub fn use_text<S: AsRef<str>>(mut self, text: Option<S>) -> Self {
        self.text = text.map(|s| s.as_ref().to_string());
        self
    }

    /// Image used as watermark, wins over a text watermark
    pub fn with_watermark_image<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.watermark_image = Some(image.as_ref().to_path_buf());
        self
    }

    pub fn use_watermark_image(mut self, image: Option<PathBuf>) -> Self {
        self.watermark_image = image;
        self
    }

    pub fn with_background<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.background = Some(image.as_ref().to_path_buf());
        self
    }

    /// The watermarked image is written there as PNG
    pub fn with_output<A: AsRef<Path>>(mut self, output: A) -> Self {
        self.output = Some(output.as_ref().to_path_buf());
        self
    }

    pub fn execute(self) -> Result<(), WatermarkError> {
        let Some(background) = self.background else {
            return Err(WatermarkError::BackgroundNotSet);
        };
        let Some(output) = self.output else {
            return Err(WatermarkError::TargetNotSet);
        };

        let watermark_image = match self.watermark_image {
            Some(path) => Some(open_image(&path)?),
            None => None,
        };
        let request = WatermarkRequest::new(open_image(&background)?)
            .use_text(self.text)
            .use_image(watermark_image);

        let image = WatermarkTask::new(self.options).spawn(request).join()?;
        save_png(&image, &output)
    }
}

fn save_png(image: &PixelBuffer, file: &Path) -> Result<(), WatermarkError> {
    let f = File::create(file).map_err(|e| {
        error!("Error creating file {file:?}: {e}");
        WatermarkError::WriteError { source: e }
    })?;

    let mut writer = BufWriter::new(f);
    image
        .to_rgba()
        .write_to(&mut writer, ImageFormat::Png)
        .map_err(|e| {
            error!("Error saving image: {e}");
            WatermarkError::ImageEncodingError
        })?;

    writer
        .flush()
        .map_err(|source| WatermarkError::WriteError { source })
}
