use std::path::{Path, PathBuf};

use super::open_image;
use crate::payload::{self, FramedPayload};
use crate::{WatermarkError, WatermarkOptions};

/// Frames a watermark without embedding it, useful to inspect what a run would carry
pub fn prepare() -> FrameApi {
    FrameApi::default()
}

#[derive(Default, Debug)]
pub struct FrameApi {
    text: Option<String>,
    watermark_image: Option<PathBuf>,
    options: WatermarkOptions,
}

impl FrameApi {
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

    pub fn with_watermark_image<A: AsRef<Path>>(mut self, image: A) -> Self {
        self.watermark_image = Some(image.as_ref().to_path_buf());
        self
    }

    pub fn use_watermark_image(mut self, image: Option<PathBuf>) -> Self {
        self.watermark_image = image;
        self
    }

    pub fn execute(self) -> Result<FramedPayload, WatermarkError> {
        self.options.validate()?;
        let image = match self.watermark_image {
            Some(path) => Some(open_image(&path)?),
            None => None,
        };

        payload::encode_watermark(self.text.as_deref(), image.as_ref(), &self.options.tags)
    }
}
