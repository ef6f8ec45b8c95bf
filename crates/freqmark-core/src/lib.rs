//! # Freqmark Core API
//!
//! Embeds a watermark, either a short text or a small image, into a
//! background image by sending its color channels through a DCT round trip.
//!
//! The pipeline per run is
//! - [`payload::encode`] turns the watermark into a framed bit string, tagged
//!   as text or image origin, and groups it into numeric codes
//! - [`chunk::ChunkedProcessor`] cuts the background into bounded chunks and
//!   runs every chunk through channels → DCT-II → [`embed::CoefficientEmbedder`]
//!   → DCT-III → pixels
//! - [`task::WatermarkTask`] runs both off the calling thread and reports one
//!   outcome to a [`task::BuildFinishListener`]
//!
//! # Usage Examples
//!
//! ## Watermark an image file
//!
//! ```rust,no_run
//! freqmark_core::api::embed::prepare()
//!     .with_text("Hello, World!")
//!     .with_background("background.png")
//!     .with_output("watermarked.png")
//!     .execute()
//!     .expect("Failed to embed watermark");
//! ```
//!
//! ## Run a task and listen for the outcome
//!
//! ```rust
//! use freqmark_core::{FnListener, PixelBuffer, WatermarkRequest, WatermarkTask};
//!
//! let background = PixelBuffer::new(4, 4, vec![0xff20_4060; 16]).unwrap();
//! let request = WatermarkRequest::new(background).with_text("hi");
//!
//! let mut listener = FnListener::new(
//!     |image: PixelBuffer| assert_eq!(image.dimensions(), (4, 4)),
//!     |kind| panic!("watermark failed: {kind}"),
//! );
//! WatermarkTask::default().spawn(request).deliver(&mut listener);
//! ```

#![warn(clippy::redundant_else)]

pub mod api;
pub mod cancel;
pub mod chunk;
pub mod embed;
pub mod error;
pub mod media;
pub mod options;
pub mod payload;
pub mod request;
pub mod result;
pub mod task;
pub mod transform;

pub use crate::cancel::CancellationToken;
pub use crate::error::{FailureKind, WatermarkError};
pub use crate::media::PixelBuffer;
pub use crate::options::{ChannelRange, FramingTags, WatermarkOptions};
pub use crate::request::WatermarkRequest;
pub use crate::result::Result;
pub use crate::task::{BuildFinishListener, FnListener, TaskHandle, WatermarkTask};
