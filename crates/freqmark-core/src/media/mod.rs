pub mod channels;
mod pixels;

pub use channels::{from_channels, to_channels, CHANNELS_PER_PIXEL};
pub use pixels::*;
