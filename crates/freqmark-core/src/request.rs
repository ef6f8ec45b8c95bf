use crate::media::PixelBuffer;

/// Everything one watermark run needs: the background and the watermark.
///
/// If both a text and an image are set, the image is used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkRequest {
    background: PixelBuffer,
    watermark_text: Option<String>,
    watermark_image: Option<PixelBuffer>,
}

impl WatermarkRequest {
    pub fn new(background: PixelBuffer) -> Self {
        Self {
            background,
            watermark_text: None,
            watermark_image: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.watermark_text = Some(text.into());
        self
    }

    pub fn use_text<S: AsRef<str>>(mut self, text: Option<S>) -> Self {
        self.watermark_text = text.map(|s| s.as_ref().to_string());
        self
    }

    pub fn with_image(mut self, image: PixelBuffer) -> Self {
        self.watermark_image = Some(image);
        self
    }

    pub fn use_image(mut self, image: Option<PixelBuffer>) -> Self {
        self.watermark_image = image;
        self
    }

    pub fn background(&self) -> &PixelBuffer {
        &self.background
    }

    pub fn watermark_text(&self) -> Option<&str> {
        self.watermark_text.as_deref()
    }

    pub fn watermark_image(&self) -> Option<&PixelBuffer> {
        self.watermark_image.as_ref()
    }
}
