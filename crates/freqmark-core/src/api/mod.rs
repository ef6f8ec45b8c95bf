use std::path::Path;

use log::error;

use crate::media::PixelBuffer;
use crate::WatermarkError;

pub mod embed;
pub mod frame;

/// opens any image format the `image` crate knows, as ARGB pixels
pub(crate) fn open_image(path: &Path) -> Result<PixelBuffer, WatermarkError> {
    let image = image::open(path)
        .map_err(|e| {
            error!("Error opening image {path:?}: {e}");
            WatermarkError::InvalidImageMedia
        })?
        .to_rgba8();

    Ok(PixelBuffer::from_rgba(&image))
}
