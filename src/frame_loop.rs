use crate::{
    analysis::{Analyzer, FrameMetrics},
    display::DeviceState,
    error::Error,
    pose::Pose,
};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};
use tracing::{info, instrument, trace, warn};

/// A stream of image buffers.
pub(crate) trait FrameSource {
    type Frame;

    /// Block until the next frame is available; `None` once the stream has ended.
    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Error>;

    /// Hand a frame's resources back to the source.
    fn release(&mut self, frame: Self::Frame);
}

pub(crate) trait PoseEstimator<F> {
    /// Zero or more candidate poses for `frame`.
    fn estimate(&mut self, frame: &F, timestamp_ms: u64) -> Result<Vec<Pose>, Error>;
}

pub(crate) trait Presenter {
    fn present(&mut self, metrics: FrameMetrics) -> Result<(), Error>;
}

/// Cooperative stop signal shared between the loop and whoever wants to end it.
#[derive(Debug, Clone, Default)]
pub(crate) struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_canceled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum LoopState {
    Idle,
    Scheduled,
    Running,
    /// Terminal: a cancellation was observed.
    Canceled,
    /// Terminal: the source ran dry or too many frames failed.
    Stopped,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum LoopExit {
    Canceled,
    Exhausted,
}

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Timing {
    pub(crate) inference: Duration,
    pub(crate) frames: usize,
}

/// Frames per second implied by a single inference latency, counted in whole milliseconds.
///
/// Sub-millisecond latencies count as one millisecond.
pub(crate) fn fps_from_latency(latency: Duration) -> u32 {
    u32::try_from(1000 / latency.as_millis().max(1)).unwrap_or(u32::MAX)
}

pub(crate) struct FrameLoop<S, E, P> {
    source: S,
    estimator: E,
    presenter: P,
    analyzer: Analyzer,
    device: DeviceState,
    cancel: CancelToken,
    max_consecutive_failures: usize,
    state: LoopState,
    pub(crate) timing: Timing,
}

impl<S, E, P> FrameLoop<S, E, P>
where
    S: FrameSource,
    E: PoseEstimator<S::Frame>,
    P: Presenter,
{
    pub(crate) fn new(
        source: S,
        estimator: E,
        presenter: P,
        analyzer: Analyzer,
        device: DeviceState,
        cancel: CancelToken,
        max_consecutive_failures: usize,
    ) -> Self {
        Self {
            source,
            estimator,
            presenter,
            analyzer,
            device,
            cancel,
            max_consecutive_failures: max_consecutive_failures.max(1),
            state: LoopState::Idle,
            timing: Timing::default(),
        }
    }

    pub(crate) fn state(&self) -> LoopState {
        self.state
    }

    fn transition(&mut self, state: LoopState) {
        trace!(from = ?self.state, to = ?state, "frame loop transition");
        self.state = state;
    }

    /// Process frames one at a time until the source ends, the token is canceled, or too many
    /// frames in a row fail.
    pub(crate) fn run(&mut self) -> Result<LoopExit, Error> {
        let epoch = Instant::now();
        let mut failures = 0;

        self.transition(LoopState::Scheduled);
        loop {
            if self.cancel.is_canceled() {
                return Ok(self.canceled());
            }

            self.transition(LoopState::Running);
            let (poses, latency) = match self.acquire_and_estimate(epoch) {
                Ok(Some(estimated)) => estimated,
                Ok(None) => {
                    self.transition(LoopState::Stopped);
                    info!(frames = self.timing.frames, "frame source exhausted");
                    return Ok(LoopExit::Exhausted);
                }
                Err(error) => {
                    failures += 1;
                    warn!(%error, failures, "failed to process frame");
                    if failures >= self.max_consecutive_failures {
                        self.transition(LoopState::Stopped);
                        self.presenter.present(FrameMetrics::stalled())?;
                        return Err(Error::Stalled(failures));
                    }
                    self.transition(LoopState::Scheduled);
                    continue;
                }
            };
            failures = 0;

            if self.cancel.is_canceled() {
                return Ok(self.canceled());
            }

            self.timing.inference += latency;
            self.timing.frames += 1;

            let metrics = self.analyzer.analyze(
                &poses,
                fps_from_latency(latency),
                self.device.orientation(),
                self.device.facing(),
            );
            if let Err(error) = self.presenter.present(metrics) {
                self.transition(LoopState::Stopped);
                return Err(error);
            }

            self.transition(LoopState::Scheduled);
        }
    }

    fn canceled(&mut self) -> LoopExit {
        self.transition(LoopState::Canceled);
        info!(frames = self.timing.frames, "frame loop canceled");
        LoopExit::Canceled
    }

    /// Pull one frame and run the estimator on it. The frame is released before returning,
    /// whether or not estimation succeeded.
    #[instrument(name = "FrameLoop::acquire_and_estimate", skip_all)]
    fn acquire_and_estimate(
        &mut self,
        epoch: Instant,
    ) -> Result<Option<(Vec<Pose>, Duration)>, Error> {
        let frame = match self.source.next_frame()? {
            Some(frame) => frame,
            None => return Ok(None),
        };

        let timestamp_ms = u64::try_from(epoch.elapsed().as_millis()).unwrap_or(u64::MAX);
        let start_inference = Instant::now();
        let poses = self.estimator.estimate(&frame, timestamp_ms);
        let latency = start_inference.elapsed();

        self.source.release(frame);

        Ok(Some((poses?, latency)))
    }
}
