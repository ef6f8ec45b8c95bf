use crate::error::WatermarkError;
use crate::payload::PayloadOrigin;
use crate::result::Result;

/// Default number of pixels processed by one transform.
pub const DEFAULT_CHUNK_SIZE: usize = 5000;

/// Default number of framed bits grouped into one payload code.
pub const DEFAULT_CODE_WIDTH: usize = 8;

pub const IMG_PREFIX_FLAG: &str = "0110100101101101";
pub const IMG_SUFFIX_FLAG: &str = "0110110101101001";
pub const TEXT_PREFIX_FLAG: &str = "0111010001111000";
pub const TEXT_SUFFIX_FLAG: &str = "0111100001110100";

/// Pipeline configuration for embedding a watermark
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatermarkOptions {
    /// Number of pixels transformed together.
    /// Images with fewer pixels than this are transformed in one piece.
    ///
    /// Note this number bounds the peak memory of a single transform.
    pub chunk_size: usize,

    /// Tag pairs that frame the payload bits, one pair per payload origin
    pub tags: FramingTags,

    /// Valid range of a single color channel, results are clamped into it
    pub channel_range: ChannelRange,

    /// How many framed bits form one payload code
    pub code_width: usize,

    /// If true chunks are processed on the rayon thread pool
    pub parallel: bool,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            tags: FramingTags::default(),
            channel_range: ChannelRange::default(),
            code_width: DEFAULT_CODE_WIDTH,
            parallel: false,
        }
    }
}

impl WatermarkOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn with_tags(mut self, tags: FramingTags) -> Self {
        self.tags = tags;
        self
    }

    pub fn with_code_width(mut self, code_width: usize) -> Self {
        self.code_width = code_width;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(WatermarkError::InvalidOptions(
                "chunk size must be at least one pixel".to_string(),
            ));
        }
        if !(1..=32).contains(&self.code_width) {
            return Err(WatermarkError::InvalidOptions(format!(
                "code width {} is outside of 1..=32",
                self.code_width
            )));
        }
        self.channel_range.validate()?;
        self.tags.validate()
    }
}

/// The four tag sequences around a payload.
///
/// The decode side tells image payloads from text payloads by these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramingTags {
    pub image_prefix: String,
    pub image_suffix: String,
    pub text_prefix: String,
    pub text_suffix: String,
}

impl Default for FramingTags {
    fn default() -> Self {
        Self {
            image_prefix: IMG_PREFIX_FLAG.to_string(),
            image_suffix: IMG_SUFFIX_FLAG.to_string(),
            text_prefix: TEXT_PREFIX_FLAG.to_string(),
            text_suffix: TEXT_SUFFIX_FLAG.to_string(),
        }
    }
}

impl FramingTags {
    /// prefix and suffix for the given origin
    pub fn pair(&self, origin: PayloadOrigin) -> (&str, &str) {
        match origin {
            PayloadOrigin::Image => (&self.image_prefix, &self.image_suffix),
            PayloadOrigin::Text => (&self.text_prefix, &self.text_suffix),
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, tag) in [
            ("image prefix", &self.image_prefix),
            ("image suffix", &self.image_suffix),
            ("text prefix", &self.text_prefix),
            ("text suffix", &self.text_suffix),
        ] {
            if tag.is_empty() || !tag.bytes().all(|b| b == b'0' || b == b'1') {
                return Err(WatermarkError::InvalidOptions(format!(
                    "{name} must be a non-empty string of '0' and '1'"
                )));
            }
        }
        // a framed string must match exactly one prefix and one suffix
        let (image, text) = (&self.image_prefix, &self.text_prefix);
        if image.starts_with(text.as_str()) || text.starts_with(image.as_str()) {
            return Err(WatermarkError::InvalidOptions(
                "image and text prefix must not be a prefix of each other".to_string(),
            ));
        }
        let (image, text) = (&self.image_suffix, &self.text_suffix);
        if image.ends_with(text.as_str()) || text.ends_with(image.as_str()) {
            return Err(WatermarkError::InvalidOptions(
                "image and text suffix must not be a suffix of each other".to_string(),
            ));
        }

        Ok(())
    }
}

/// Inclusive range a rounded channel value is clamped into
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChannelRange {
    pub min: u8,
    pub max: u8,
}

impl Default for ChannelRange {
    fn default() -> Self {
        Self { min: 0, max: 255 }
    }
}

impl ChannelRange {
    pub fn validate(&self) -> Result<()> {
        if self.min > self.max {
            return Err(WatermarkError::InvalidOptions(format!(
                "channel range [{}, {}] is inverted",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// rounds to the nearest integer and clamps into the range
    ///
    /// An inverted range does not panic, every value lands on `max`.
    pub fn quantize(&self, value: f64) -> u8 {
        // NaN clamps to min
        let rounded = value.round();
        if rounded.is_nan() {
            return self.min;
        }
        rounded.max(self.min as f64).min(self.max as f64) as u8
    }
}
