mod bitmap;
mod codec;

pub use bitmap::*;
pub use codec::*;

use log::debug;

use crate::error::WatermarkError;
use crate::media::PixelBuffer;
use crate::options::FramingTags;
use crate::request::WatermarkRequest;
use crate::result::Result;

/// Turns the watermark of a request into its framed bit string.
///
/// An image watermark wins over text. Fails with
/// [`WatermarkError::NoWatermark`] if the request carries neither.
pub fn encode(request: &WatermarkRequest, tags: &FramingTags) -> Result<FramedPayload> {
    encode_watermark(request.watermark_text(), request.watermark_image(), tags)
}

/// Same as [`encode`], for a watermark that is not part of a request.
pub fn encode_watermark(
    text: Option<&str>,
    image: Option<&PixelBuffer>,
    tags: &FramingTags,
) -> Result<FramedPayload> {
    let (origin, text) = match (image, text) {
        (Some(image), _) => (PayloadOrigin::Image, bitmap_to_string(image)?),
        (None, Some(text)) => (PayloadOrigin::Text, text.to_string()),
        (None, None) => return Err(WatermarkError::NoWatermark),
    };

    let framed = FramedPayload::frame(origin, &string_to_binary(&text), tags)?;
    debug!(
        "framed {:?} payload of {} chars into {} bits",
        origin,
        text.chars().count(),
        framed.len()
    );

    Ok(framed)
}
