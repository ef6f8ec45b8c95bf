use image::{Rgba, RgbaImage};

use crate::error::WatermarkError;
use crate::result::Result;

/// packs four channel values into one `0xAARRGGBB` pixel
#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    (a as u32) << 24 | (r as u32) << 16 | (g as u32) << 8 | b as u32
}

/// splits a `0xAARRGGBB` pixel into `[a, r, g, b]`
#[inline]
pub fn unpack_argb(pixel: u32) -> [u8; 4] {
    [
        (pixel >> 24) as u8,
        (pixel >> 16) as u8,
        (pixel >> 8) as u8,
        pixel as u8,
    ]
}

/// A row-major image of packed ARGB pixels.
///
/// This is what the watermark pipeline reads and writes, independent of any
/// file format. Use [`PixelBuffer::from_rgba`] and [`PixelBuffer::to_rgba`] to
/// move between this and `image::RgbaImage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, pixels: Vec<u32>) -> Result<Self> {
        let expected = (width as usize).checked_mul(height as usize);
        if expected != Some(pixels.len()) {
            return Err(WatermarkError::InvalidPixelBuffer {
                width,
                height,
                len: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    /// a fully transparent black buffer of the given size
    pub fn blank(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
        }
    }

    pub fn from_rgba(image: &RgbaImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = image
            .pixels()
            .map(|Rgba([r, g, b, a])| pack_argb(*a, *r, *g, *b))
            .collect();

        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn to_rgba(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| {
            let index = y as usize * self.width as usize + x as usize;
            let [a, r, g, b] = unpack_argb(self.pixels[index]);
            Rgba([r, g, b, a])
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u32] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u32> {
        self.pixels
    }
}

impl From<&RgbaImage> for PixelBuffer {
    fn from(image: &RgbaImage) -> Self {
        Self::from_rgba(image)
    }
}

impl From<&PixelBuffer> for RgbaImage {
    fn from(buffer: &PixelBuffer) -> Self {
        buffer.to_rgba()
    }
}
