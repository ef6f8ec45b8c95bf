//! Flattening of packed pixels into numeric channel arrays and back.
//!
//! Every pixel turns into four consecutive values in the order
//! alpha, red, green, blue. The reverse direction is where fractional drift
//! from the transform gets resolved: values are rounded to the nearest integer
//! and clamped into the configured [`ChannelRange`].

use super::pixels::{pack_argb, unpack_argb};
use crate::error::WatermarkError;
use crate::options::ChannelRange;
use crate::result::Result;

pub const CHANNELS_PER_PIXEL: usize = 4;

/// decomposes packed pixels into `[a, r, g, b, a, r, g, b, ..]`
pub fn to_channels(pixels: &[u32]) -> Vec<f64> {
    let mut channels = Vec::with_capacity(pixels.len() * CHANNELS_PER_PIXEL);
    for pixel in pixels {
        channels.extend(unpack_argb(*pixel).iter().map(|c| *c as f64));
    }
    channels
}

/// recombines channel values into packed pixels, see [`to_channels`]
pub fn from_channels(channels: &[f64], range: ChannelRange) -> Result<Vec<u32>> {
    range.validate()?;
    if channels.len() % CHANNELS_PER_PIXEL != 0 {
        return Err(WatermarkError::MalformedChannels(channels.len()));
    }

    Ok(channels
        .chunks_exact(CHANNELS_PER_PIXEL)
        .map(|c| {
            pack_argb(
                range.quantize(c[0]),
                range.quantize(c[1]),
                range.quantize(c[2]),
                range.quantize(c[3]),
            )
        })
        .collect())
}
