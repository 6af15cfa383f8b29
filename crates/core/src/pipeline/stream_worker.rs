use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::effects::domain::effect_kind::StrategySet;
use crate::effects::domain::effect_parameters::EffectParameters;
use crate::shared::face_gallery::FaceGallery;
use crate::shared::frame::Frame;

use super::predict_use_case::PredictUseCase;

pub const DEFAULT_QUEUE_CAPACITY: usize = 2;

/// What the worker hands back once the stream ends.
pub struct StreamOutput {
    /// Every face cropped during the stream, in processing order.
    pub gallery: FaceGallery,
    /// Annotated frames not yet taken from [`StreamWorker::try_recv`].
    pub frames: Vec<Frame>,
    pub submitted: usize,
    pub dropped: usize,
    pub processed: usize,
    /// Returned so the caller can report its logger summary.
    pub use_case: PredictUseCase,
}

/// Processes a live frame sequence on one dedicated thread.
///
/// The thread owns the use case and the face gallery, so every frame of
/// the stream is handled strictly in order by a single writer. Submission
/// never blocks: when the worker falls behind and the queue is full the
/// new frame is dropped.
pub struct StreamWorker {
    input: Option<Sender<Frame>>,
    output: Receiver<Frame>,
    handle: Option<JoinHandle<(PredictUseCase, FaceGallery, usize)>>,
    submitted: usize,
    dropped: usize,
}

impl StreamWorker {
    pub fn spawn(
        mut use_case: PredictUseCase,
        strategies: StrategySet,
        params: EffectParameters,
        capacity: usize,
    ) -> Self {
        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Frame>(capacity.max(1));
        let (out_tx, out_rx) = crossbeam_channel::unbounded::<Frame>();

        let handle = std::thread::spawn(move || {
            let mut gallery = FaceGallery::new();
            let mut processed = 0;
            for frame in frame_rx {
                let annotated = use_case.process_frame(frame, &mut gallery, &strategies, &params);
                processed += 1;
                if out_tx.send(annotated).is_err() {
                    break;
                }
            }
            (use_case, gallery, processed)
        });

        Self {
            input: Some(frame_tx),
            output: out_rx,
            handle: Some(handle),
            submitted: 0,
            dropped: 0,
        }
    }

    /// Queues `frame`; returns `false` if it was dropped as stale.
    pub fn submit(&mut self, frame: Frame) -> bool {
        let Some(input) = self.input.as_ref() else {
            return false;
        };
        self.submitted += 1;
        match input.try_send(frame) {
            Ok(()) => true,
            Err(TrySendError::Full(frame)) => {
                self.dropped += 1;
                log::debug!("Worker busy, dropping frame {}", frame.index());
                false
            }
            Err(TrySendError::Disconnected(frame)) => {
                self.dropped += 1;
                log::warn!("Worker stopped, dropping frame {}", frame.index());
                false
            }
        }
    }

    /// Next finished frame, if any is ready.
    pub fn try_recv(&self) -> Option<Frame> {
        self.output.try_recv().ok()
    }

    /// Closes the input, waits for queued frames to finish and returns the
    /// session state.
    pub fn finish(mut self) -> Result<StreamOutput, Box<dyn std::error::Error>> {
        drop(self.input.take());
        let handle = self.handle.take().ok_or("stream worker already finished")?;
        let (use_case, gallery, processed) = handle
            .join()
            .map_err(|_| "stream worker thread panicked")?;
        let frames: Vec<Frame> = self.output.try_iter().collect();

        log::info!(
            "Stream finished: {processed} processed, {} dropped, {} faces",
            self.dropped,
            gallery.len()
        );

        Ok(StreamOutput {
            gallery,
            frames,
            submitted: self.submitted,
            dropped: self.dropped,
            processed,
            use_case,
        })
    }
}

impl Drop for StreamWorker {
    fn drop(&mut self) {
        drop(self.input.take());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}
