use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::WatermarkError;
use crate::result::Result;

/// Cooperative cancellation flag shared between a task handle and its worker.
///
/// The chunked processor checks it before every chunk, a chunk that already
/// started runs to its end.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// `Err(WatermarkError::Cancelled)` once [`cancel`](Self::cancel) was called
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(WatermarkError::Cancelled)
        } else {
            Ok(())
        }
    }
}
