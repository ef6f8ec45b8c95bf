use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use log::error;

use crate::error::WatermarkError;
use crate::media::PixelBuffer;
use crate::result::Result;

/// Reduces a watermark image to text: PNG encoded, then base64.
pub fn bitmap_to_string(bitmap: &PixelBuffer) -> Result<String> {
    let mut png = Cursor::new(Vec::new());
    bitmap
        .to_rgba()
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| {
            error!("Error encoding watermark image: {e}");
            WatermarkError::ImageEncodingError
        })?;

    Ok(STANDARD.encode(png.into_inner()))
}

/// inverse of [`bitmap_to_string`]
pub fn string_to_bitmap(text: &str) -> Result<PixelBuffer> {
    let png = STANDARD.decode(text)?;
    let image = image::load_from_memory_with_format(&png, ImageFormat::Png)
        .map_err(|_e| WatermarkError::InvalidImageMedia)?
        .to_rgba8();

    Ok(PixelBuffer::from_rgba(&image))
}
