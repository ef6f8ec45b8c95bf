use std::ops::Range;
use std::sync::Arc;

use log::debug;
use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::embed::{CoefficientEmbedder, IdentityEmbedder};
use crate::error::WatermarkError;
use crate::media::{from_channels, to_channels, PixelBuffer, CHANNELS_PER_PIXEL};
use crate::options::WatermarkOptions;
use crate::result::Result;
use crate::transform::{DctPlan, TransformEngine};

/// A contiguous run of pixels that is transformed on its own
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub index: usize,
    pub start: usize,
    pub len: usize,
}

impl Chunk {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }

    /// number of channel values, and so the transform length, of this chunk
    pub fn channel_len(&self) -> usize {
        self.len * CHANNELS_PER_PIXEL
    }
}

/// Partition of `pixel_count` pixels into chunks of at most `chunk_size`.
///
/// Images smaller than one chunk stay in one piece, everything else is cut
/// into `ceil(pixel_count / chunk_size)` chunks where only the last one may be
/// shorter. An empty image has no chunks at all.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ChunkPlan {
    pixel_count: usize,
    stride: usize,
}

impl ChunkPlan {
    /// a `chunk_size` of 0 is treated as 1
    pub fn new(pixel_count: usize, chunk_size: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        let stride = if pixel_count < chunk_size {
            pixel_count
        } else {
            chunk_size
        };

        Self {
            pixel_count,
            stride,
        }
    }

    /// pixels per chunk, except for a shorter last one
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn len(&self) -> usize {
        if self.pixel_count == 0 {
            0
        } else {
            self.pixel_count.div_ceil(self.stride)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// chunk `i` covers `[i·stride, min((i+1)·stride, pixel_count))`
    pub fn chunk(&self, index: usize) -> Option<Chunk> {
        if index >= self.len() {
            return None;
        }
        let start = index * self.stride;

        Some(Chunk {
            index,
            start,
            len: self.stride.min(self.pixel_count - start),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = Chunk> + '_ {
        (0..self.len()).filter_map(move |i| self.chunk(i))
    }
}

/// Runs every chunk of an image through
/// channels → DCT-II → embedder → DCT-III → rescale → pixels.
pub struct ChunkedProcessor {
    options: WatermarkOptions,
    embedder: Arc<dyn CoefficientEmbedder>,
}

impl ChunkedProcessor {
    pub fn new(options: WatermarkOptions) -> Self {
        Self {
            options,
            embedder: Arc::new(IdentityEmbedder),
        }
    }

    pub fn with_embedder(mut self, embedder: Arc<dyn CoefficientEmbedder>) -> Self {
        self.embedder = embedder;
        self
    }

    pub fn options(&self) -> &WatermarkOptions {
        &self.options
    }

    /// Produces the watermarked copy of `background`.
    ///
    /// Fails with [`WatermarkError::PixelsNotEnough`] before any transform
    /// when `payload` has more codes than the background has channel values.
    pub fn process(
        &self,
        background: &PixelBuffer,
        payload: &[u32],
        cancel: &CancellationToken,
    ) -> Result<PixelBuffer> {
        self.options.validate()?;

        let available = background.pixel_count().saturating_mul(CHANNELS_PER_PIXEL);
        if payload.len() > available {
            return Err(WatermarkError::PixelsNotEnough {
                required: payload.len(),
                available,
            });
        }

        let (width, height) = background.dimensions();
        let mut output = PixelBuffer::blank(width, height);
        let plan = ChunkPlan::new(background.pixel_count(), self.options.chunk_size);
        if plan.is_empty() {
            return Ok(output);
        }

        let stride = plan.stride();
        let mut engine = TransformEngine::new();
        let full_plan = engine.plan(stride * CHANNELS_PER_PIXEL)?;
        let tail_plan = match plan.chunk(plan.len() - 1) {
            Some(last) => engine.plan(last.channel_len())?,
            None => Arc::clone(&full_plan),
        };
        let full: &DctPlan = &full_plan;
        let tail: &DctPlan = &tail_plan;
        let dct_for = move |chunk: &Chunk| if chunk.len == stride { full } else { tail };

        debug!(
            "processing {} pixels in {} chunk(s) of up to {} pixels, parallel: {}",
            background.pixel_count(),
            plan.len(),
            plan.stride(),
            self.options.parallel
        );

        let input = background.pixels();
        if self.options.parallel {
            let chunks: Vec<Chunk> = plan.iter().collect();
            chunks
                .par_iter()
                .zip(input.par_chunks(stride))
                .zip(output.pixels_mut().par_chunks_mut(stride))
                .try_for_each(|((chunk, src), dst)| {
                    cancel.check()?;
                    self.process_chunk(chunk, src, dst, dct_for(chunk), payload)
                })?;
        } else {
            for ((chunk, src), dst) in plan
                .iter()
                .zip(input.chunks(stride))
                .zip(output.pixels_mut().chunks_mut(stride))
            {
                cancel.check()?;
                self.process_chunk(&chunk, src, dst, dct_for(&chunk), payload)?;
            }
        }

        Ok(output)
    }

    fn process_chunk(
        &self,
        chunk: &Chunk,
        src: &[u32],
        dst: &mut [u32],
        dct: &DctPlan,
        payload: &[u32],
    ) -> Result<()> {
        let mut coefficients = to_channels(src);
        dct.forward(&mut coefficients)?;
        self.embedder.embed(chunk, &mut coefficients, payload)?;
        dct.inverse(&mut coefficients)?;

        let scale = coefficients.len() as f64 / 2.0;
        for value in coefficients.iter_mut() {
            *value /= scale;
        }

        let pixels = from_channels(&coefficients, self.options.channel_range)?;
        if pixels.len() != dst.len() {
            return Err(WatermarkError::MalformedChannels(coefficients.len()));
        }
        dst.copy_from_slice(&pixels);

        debug!(
            "chunk #{} done, pixels {}..{}",
            chunk.index,
            chunk.start,
            chunk.end()
        );

        Ok(())
    }
}
