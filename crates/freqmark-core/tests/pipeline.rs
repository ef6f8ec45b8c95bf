use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use freqmark_core::chunk::{Chunk, ChunkPlan, ChunkedProcessor};
use freqmark_core::embed::CoefficientEmbedder;
use freqmark_core::media::{from_channels, to_channels, unpack_argb};
use freqmark_core::payload::{self, binary_to_string, unframe, PayloadOrigin};
use freqmark_core::transform::{forward_transform, inverse_transform};
use freqmark_core::{
    BuildFinishListener, CancellationToken, ChannelRange, FailureKind, PixelBuffer,
    WatermarkOptions, WatermarkRequest, WatermarkTask,
};

const SMALL_CHUNK: usize = 8;

#[derive(Default)]
struct Outcome {
    successes: Vec<PixelBuffer>,
    failures: Vec<FailureKind>,
}

impl BuildFinishListener for Outcome {
    fn on_success(&mut self, image: PixelBuffer) {
        self.successes.push(image);
    }

    fn on_failure(&mut self, kind: FailureKind) {
        self.failures.push(kind);
    }
}

/// remembers the range of every chunk it is handed, and how many coefficients came with it
#[derive(Default)]
struct ChunkRecorder {
    seen: Mutex<Vec<(Chunk, usize)>>,
    calls: AtomicUsize,
}

impl CoefficientEmbedder for ChunkRecorder {
    fn embed(&self, chunk: &Chunk, coefficients: &mut [f64], _: &[u32]) -> freqmark_core::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen
            .lock()
            .expect("recorder lock")
            .push((*chunk, coefficients.len()));
        Ok(())
    }
}

fn gradient(width: u32, height: u32) -> PixelBuffer {
    let pixels = (0..width * height)
        .map(|i| {
            let v = (i * 7) as u8;
            u32::from_be_bytes([255 - v / 2, v, v.wrapping_mul(3), 255 - v])
        })
        .collect();
    PixelBuffer::new(width, height, pixels).unwrap()
}

fn max_channel_drift(a: &PixelBuffer, b: &PixelBuffer) -> i16 {
    a.pixels()
        .iter()
        .zip(b.pixels())
        .flat_map(|(x, y)| {
            let x = unpack_argb(*x);
            let y = unpack_argb(*y);
            (0..4).map(move |c| (x[c] as i16 - y[c] as i16).abs())
        })
        .max()
        .unwrap_or(0)
}

#[test]
fn should_watermark_4x4_image_with_hi() {
    let background = gradient(4, 4);
    let mut outcome = Outcome::default();

    WatermarkTask::default()
        .spawn(WatermarkRequest::new(background.clone()).with_text("hi"))
        .deliver(&mut outcome);

    assert!(outcome.failures.is_empty(), "no failure expected");
    assert_eq!(outcome.successes.len(), 1);
    let output = &outcome.successes[0];
    assert_eq!(output.dimensions(), background.dimensions());
    assert!(max_channel_drift(output, &background) <= 1);
}

#[test]
fn framed_hi_has_16_bits_plus_tags() {
    let opts = WatermarkOptions::default();
    let request = WatermarkRequest::new(gradient(4, 4)).with_text("hi");
    let framed = payload::encode(&request, &opts.tags).unwrap();

    assert_eq!(
        framed.len(),
        16 + opts.tags.text_prefix.len() + opts.tags.text_suffix.len()
    );
    let (origin, inner) = unframe(framed.as_str(), &opts.tags).unwrap();
    assert_eq!(origin, PayloadOrigin::Text);
    assert_eq!(binary_to_string(inner).unwrap(), "hi");
}

#[test]
fn should_process_three_chunks_and_a_short_tail() {
    let pixel_count = 3 * SMALL_CHUNK + 7;
    let background = gradient(pixel_count as u32, 1);
    let recorder = Arc::new(ChunkRecorder::default());
    let processor = ChunkedProcessor::new(WatermarkOptions::default().with_chunk_size(SMALL_CHUNK))
        .with_embedder(recorder.clone());

    let output = processor
        .process(&background, &[1, 0, 1], &CancellationToken::new())
        .unwrap();

    let seen = recorder.seen.lock().unwrap().clone();
    let ranges: Vec<_> = seen.iter().map(|(c, _)| c.range()).collect();
    assert_eq!(ranges, vec![0..8, 8..16, 16..24, 24..31]);
    for (chunk, coefficients) in &seen {
        assert_eq!(*coefficients, chunk.len * 4);
    }
    assert_eq!(max_channel_drift(&output, &background), 0);
}

#[test]
fn capacity_boundary_through_the_task() {
    // 48 framed bits with 1-bit codes give 48 codes, 12 pixels carry exactly that
    let opts = WatermarkOptions::default().with_code_width(1);

    let fits = WatermarkTask::new(opts.clone())
        .execute(&WatermarkRequest::new(gradient(12, 1)).with_text("hi"));
    assert!(fits.is_ok());

    let mut outcome = Outcome::default();
    WatermarkTask::new(opts)
        .spawn(WatermarkRequest::new(gradient(11, 1)).with_text("hi"))
        .deliver(&mut outcome);
    assert_eq!(outcome.failures, vec![FailureKind::PixelsNotEnough]);
}

#[test]
fn capacity_boundary_on_the_processor() {
    let background = gradient(5, 3);
    let processor = ChunkedProcessor::new(WatermarkOptions::default());
    let cancel = CancellationToken::new();
    let limit = 4 * background.pixel_count();

    assert!(processor.process(&background, &vec![0; limit], &cancel).is_ok());
    let err = processor
        .process(&background, &vec![0; limit + 1], &cancel)
        .unwrap_err();
    assert_eq!(err.failure_kind(), FailureKind::PixelsNotEnough);
}

#[test]
fn missing_watermark_never_reaches_the_transform() {
    let recorder = Arc::new(ChunkRecorder::default());
    let mut outcome = Outcome::default();

    WatermarkTask::default()
        .with_embedder(recorder.clone())
        .spawn(WatermarkRequest::new(gradient(16, 16)))
        .deliver(&mut outcome);

    assert_eq!(outcome.failures, vec![FailureKind::NoWatermark]);
    assert!(outcome.successes.is_empty());
    assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn image_watermark_is_framed_as_image() {
    let opts = WatermarkOptions::default();
    let request = WatermarkRequest::new(gradient(64, 64)).with_image(gradient(3, 3));
    let framed = payload::encode(&request, &opts.tags).unwrap();

    assert!(framed.as_str().starts_with(&opts.tags.image_prefix));
    assert!(framed.as_str().ends_with(&opts.tags.image_suffix));
}

#[test]
fn chunk_round_trip_through_free_functions() {
    let pixels = gradient(13, 1).into_pixels();
    let mut buffer = to_channels(&pixels);
    forward_transform(&mut buffer).unwrap();
    inverse_transform(&mut buffer).unwrap();
    let scale = buffer.len() as f64 / 2.0;
    buffer.iter_mut().for_each(|v| *v /= scale);

    assert_eq!(from_channels(&buffer, ChannelRange::default()).unwrap(), pixels);
}

mod properties {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn round_trip_reproduces_pixels(
            pixels in proptest::collection::vec(any::<u32>(), 1..64),
            chunk_size in 1usize..40,
        ) {
            let background = PixelBuffer::new(pixels.len() as u32, 1, pixels).unwrap();
            let output = ChunkedProcessor::new(WatermarkOptions::default().with_chunk_size(chunk_size))
                .process(&background, &[], &CancellationToken::new())
                .unwrap();

            prop_assert!(max_channel_drift(&output, &background) <= 1);
        }

        #[test]
        fn chunks_partition_the_pixels(pixel_count in 0usize..5000, chunk_size in 1usize..700) {
            let plan = ChunkPlan::new(pixel_count, chunk_size);
            let chunks: Vec<Chunk> = plan.iter().collect();

            let expected = if pixel_count == 0 {
                0
            } else if pixel_count < chunk_size {
                1
            } else {
                pixel_count.div_ceil(chunk_size)
            };
            prop_assert_eq!(chunks.len(), expected);
            prop_assert_eq!(chunks.iter().map(|c| c.len).sum::<usize>(), pixel_count);

            let mut next = 0;
            for (i, chunk) in chunks.iter().enumerate() {
                prop_assert_eq!(chunk.index, i);
                prop_assert_eq!(chunk.start, next);
                prop_assert!(chunk.len >= 1);
                next = chunk.end();
            }
        }
    }
}
