//! Off-thread execution of the watermark pipeline.
//!
//! [`WatermarkTask::spawn`] moves a request onto a worker thread and hands
//! back a [`TaskHandle`]. The handle delivers the outcome to a
//! [`BuildFinishListener`] on whatever thread calls
//! [`deliver`](TaskHandle::deliver) or [`try_deliver`](TaskHandle::try_deliver),
//! and it does so exactly once.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{error, info};

use crate::cancel::CancellationToken;
use crate::chunk::ChunkedProcessor;
use crate::embed::{CoefficientEmbedder, IdentityEmbedder};
use crate::error::{FailureKind, WatermarkError};
use crate::media::PixelBuffer;
use crate::options::WatermarkOptions;
use crate::payload;
use crate::request::WatermarkRequest;
use crate::result::Result;

const WORKER_NAME: &str = "freqmark-worker";

/// Receives the single outcome of a watermark task.
pub trait BuildFinishListener {
    fn on_success(&mut self, image: PixelBuffer);

    fn on_failure(&mut self, kind: FailureKind);
}

/// Listener made of two closures
pub struct FnListener<S, F> {
    on_success: S,
    on_failure: F,
}

impl<S, F> FnListener<S, F>
where
    S: FnMut(PixelBuffer),
    F: FnMut(FailureKind),
{
    pub fn new(on_success: S, on_failure: F) -> Self {
        Self {
            on_success,
            on_failure,
        }
    }
}

impl<S, F> BuildFinishListener for FnListener<S, F>
where
    S: FnMut(PixelBuffer),
    F: FnMut(FailureKind),
{
    fn on_success(&mut self, image: PixelBuffer) {
        (self.on_success)(image)
    }

    fn on_failure(&mut self, kind: FailureKind) {
        (self.on_failure)(kind)
    }
}

#[derive(Clone)]
pub struct WatermarkTask {
    options: WatermarkOptions,
    embedder: Arc<dyn CoefficientEmbedder>,
}

impl Default for WatermarkTask {
    fn default() -> Self {
        Self::new(WatermarkOptions::default())
    }
}

impl WatermarkTask {
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

    /// Runs the pipeline on the current thread.
    pub fn execute(&self, request: &WatermarkRequest) -> Result<PixelBuffer> {
        self.run(request, &CancellationToken::new())
    }

    /// Runs the pipeline on a worker thread.
    pub fn spawn(&self, request: WatermarkRequest) -> TaskHandle {
        let cancel = CancellationToken::new();
        let (sender, receiver) = mpsc::channel();
        let fallback = sender.clone();

        let task = self.clone();
        let worker_cancel = cancel.clone();
        let worker = thread::Builder::new()
            .name(WORKER_NAME.to_string())
            .spawn(move || {
                let result = task.run(&request, &worker_cancel);
                // the handle may have been dropped already
                let _ = sender.send(result);
            });

        let worker = match worker {
            Ok(worker) => Some(worker),
            Err(e) => {
                error!("Error spawning {WORKER_NAME}: {e}");
                let _ = fallback.send(Err(WatermarkError::IoError(e)));
                None
            }
        };

        TaskHandle {
            receiver,
            worker,
            cancel,
            delivered: false,
        }
    }

    fn run(&self, request: &WatermarkRequest, cancel: &CancellationToken) -> Result<PixelBuffer> {
        self.options.validate()?;
        let framed = payload::encode(request, &self.options.tags)?;
        let codes = framed.to_codes(self.options.code_width)?;

        ChunkedProcessor::new(self.options.clone())
            .with_embedder(Arc::clone(&self.embedder))
            .process(request.background(), &codes, cancel)
    }
}

/// The caller's side of a spawned [`WatermarkTask`].
pub struct TaskHandle {
    receiver: Receiver<Result<PixelBuffer>>,
    worker: Option<JoinHandle<()>>,
    cancel: CancellationToken,
    delivered: bool,
}

impl TaskHandle {
    /// Asks the worker to stop at the next chunk boundary.
    /// A cancelled task reports [`FailureKind::CreateFailed`].
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Blocks until the worker is done and returns its result.
    ///
    /// After a successful [`try_deliver`](Self::try_deliver) the result is
    /// gone and this returns [`WatermarkError::WorkerFailed`].
    pub fn join(mut self) -> Result<PixelBuffer> {
        if self.delivered {
            return Err(WatermarkError::WorkerFailed);
        }
        let result = self
            .receiver
            .recv()
            .unwrap_or(Err(WatermarkError::WorkerFailed));
        self.reap_worker();
        result
    }

    /// Blocks until the worker is done, then fires exactly one callback on `listener`.
    pub fn deliver<L: BuildFinishListener + ?Sized>(self, listener: &mut L) {
        if self.delivered {
            return;
        }
        report(self.join(), listener);
    }

    /// Fires the callback if the worker is done, without blocking.
    ///
    /// Returns `true` on the one call that fired it.
    pub fn try_deliver<L: BuildFinishListener + ?Sized>(&mut self, listener: &mut L) -> bool {
        if self.delivered {
            return false;
        }
        let result = match self.receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return false,
            Err(TryRecvError::Disconnected) => Err(WatermarkError::WorkerFailed),
        };

        self.delivered = true;
        self.reap_worker();
        report(result, listener);
        true
    }

    fn reap_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("{WORKER_NAME} panicked");
            }
        }
    }
}

fn report<L: BuildFinishListener + ?Sized>(result: Result<PixelBuffer>, listener: &mut L) {
    match result {
        Ok(image) => {
            info!(
                "watermark built into {}x{} image",
                image.width(),
                image.height()
            );
            listener.on_success(image);
        }
        Err(e) => {
            let kind = e.failure_kind();
            error!("watermark task failed with {}: {e}", kind.code());
            listener.on_failure(kind);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::Chunk;
    use crate::test_utils::{noise_image, CountingEmbedder, RecordingListener};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    #[test]
    fn should_deliver_success_for_text_watermark() {
        let background = noise_image(4, 4);
        let request = WatermarkRequest::new(background.clone()).with_text("hi");
        let mut listener = RecordingListener::default();

        WatermarkTask::default().spawn(request).deliver(&mut listener);

        assert!(listener.failures.is_empty());
        assert_eq!(listener.successes.len(), 1);
        assert_eq!(listener.successes[0].dimensions(), (4, 4));
    }

    #[test]
    fn should_report_no_watermark_before_touching_pixels() {
        let counter = CountingEmbedder::default();
        let calls = counter.calls();
        let task = WatermarkTask::default().with_embedder(Arc::new(counter));
        let mut listener = RecordingListener::default();

        task.spawn(WatermarkRequest::new(noise_image(4, 4)))
            .deliver(&mut listener);

        assert_eq!(listener.failures, vec![FailureKind::NoWatermark]);
        assert!(listener.successes.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn should_report_pixels_not_enough() {
        // 48 framed bits are 6 codes, a single pixel only has 4 channels
        let request = WatermarkRequest::new(noise_image(1, 1)).with_text("hi");
        let mut listener = RecordingListener::default();

        WatermarkTask::default().spawn(request).deliver(&mut listener);

        assert_eq!(listener.failures, vec![FailureKind::PixelsNotEnough]);
    }

    #[test]
    fn zero_sized_background_is_not_enough() {
        let request = WatermarkRequest::new(PixelBuffer::blank(0, 0)).with_text("");
        let mut listener = RecordingListener::default();

        WatermarkTask::default().spawn(request).deliver(&mut listener);

        assert_eq!(listener.failures, vec![FailureKind::PixelsNotEnough]);
    }

    #[test]
    fn invalid_options_report_create_failed() {
        let request = WatermarkRequest::new(noise_image(4, 4)).with_text("hi");
        let mut listener = RecordingListener::default();

        WatermarkTask::new(WatermarkOptions::default().with_chunk_size(0))
            .spawn(request)
            .deliver(&mut listener);

        assert_eq!(listener.failures, vec![FailureKind::CreateFailed]);
    }

    #[test]
    fn empty_watermark_image_reports_create_failed() {
        let request = WatermarkRequest::new(noise_image(64, 64)).with_image(PixelBuffer::blank(0, 0));
        let mut listener = RecordingListener::default();

        WatermarkTask::default().spawn(request).deliver(&mut listener);

        assert!(listener.successes.is_empty());
        assert_eq!(listener.failures, vec![FailureKind::CreateFailed]);
    }

    /// announces every call, then blocks until the test opens the gate
    struct GatedEmbedder {
        entered: Mutex<mpsc::Sender<()>>,
        gate: Mutex<Receiver<()>>,
        calls: AtomicUsize,
    }

    impl CoefficientEmbedder for GatedEmbedder {
        fn embed(&self, _: &Chunk, _: &mut [f64], _: &[u32]) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let _ = self.entered.lock().unwrap().send(());
            let _ = self.gate.lock().unwrap().recv();
            Ok(())
        }
    }

    #[test]
    fn cancelled_task_reports_create_failed() {
        let (entered, inside_first_chunk) = mpsc::channel();
        let (open_gate, gate) = mpsc::channel();
        let embedder = Arc::new(GatedEmbedder {
            entered: Mutex::new(entered),
            gate: Mutex::new(gate),
            calls: AtomicUsize::new(0),
        });
        // four chunks of one pixel, the worker parks inside the first one
        let task = WatermarkTask::new(WatermarkOptions::default().with_chunk_size(1))
            .with_embedder(embedder.clone());
        let request = WatermarkRequest::new(noise_image(2, 2)).with_text("hi");
        let mut listener = RecordingListener::default();

        let handle = task.spawn(request);
        inside_first_chunk.recv().unwrap();
        handle.cancel();
        open_gate.send(()).unwrap();
        drop(open_gate);
        handle.deliver(&mut listener);

        assert!(listener.successes.is_empty());
        assert_eq!(listener.failures, vec![FailureKind::CreateFailed]);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn try_deliver_should_fire_exactly_once() {
        let request = WatermarkRequest::new(noise_image(8, 8)).with_text("hi");
        let mut listener = RecordingListener::default();
        let mut handle = WatermarkTask::default().spawn(request);

        let mut fired = 0;
        for _ in 0..2000 {
            if handle.try_deliver(&mut listener) {
                fired += 1;
            }
            if fired > 0 && handle.try_deliver(&mut listener) {
                fired += 1;
            }
            if fired > 0 {
                break;
            }
            thread::sleep(Duration::from_millis(5));
        }

        assert_eq!(fired, 1);
        assert_eq!(listener.successes.len(), 1);
        handle.deliver(&mut listener);
        assert_eq!(listener.successes.len(), 1, "deliver after try_deliver must not fire");
    }

    #[test]
    fn fn_listener_should_forward_to_closures() {
        let mut seen = None;
        {
            let mut listener = FnListener::new(
                |image: PixelBuffer| seen = Some(image.dimensions()),
                |kind| panic!("unexpected failure {kind}"),
            );
            WatermarkTask::default()
                .spawn(WatermarkRequest::new(noise_image(5, 3)).with_text("x"))
                .deliver(&mut listener);
        }
        assert_eq!(seen, Some((5, 3)));
    }

    #[test]
    fn execute_runs_on_the_calling_thread() {
        let background = noise_image(6, 6);
        let output = WatermarkTask::default()
            .execute(&WatermarkRequest::new(background.clone()).with_text("hi"))
            .unwrap();
        assert_eq!(output, background);
    }
}
