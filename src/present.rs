use crate::{analysis::FrameMetrics, error::Error, frame_loop::Presenter};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::mpsc::{Receiver, Sender};
use tracing::{info, trace, warn};

/// Forwards metrics to a rendering thread.
pub(crate) struct ChannelPresenter {
    tx: Sender<FrameMetrics>,
}

impl ChannelPresenter {
    pub(crate) fn new(tx: Sender<FrameMetrics>) -> Self {
        Self { tx }
    }
}

impl Presenter for ChannelPresenter {
    fn present(&mut self, metrics: FrameMetrics) -> Result<(), Error> {
        self.tx.send(metrics).map_err(|_| Error::PresentationClosed)
    }
}

pub(crate) fn spinner() -> ProgressBar {
    ProgressBar::new_spinner().with_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{prefix:.bold.dim} {spinner} {wide_msg}"),
    )
}

fn status_text(metrics: &FrameMetrics) -> String {
    let posture = match (metrics.is_detected, metrics.is_straight) {
        (false, _) => "not detected",
        (true, true) => "straight",
        (true, false) => "not straight",
    };
    format!(
        "FPS: {} | height: {} | {} | keypoints: {}",
        metrics.fps,
        metrics.height,
        posture,
        metrics.keypoints.len()
    )
}

/// Consume metrics until the loop hangs up, keeping only the latest frame's values.
///
/// Returns the last metrics received, if any.
pub(crate) fn render(
    rx: Receiver<FrameMetrics>,
    progress: Option<&ProgressBar>,
) -> Option<FrameMetrics> {
    let mut latest = None;
    while let Ok(metrics) = rx.recv() {
        let text = status_text(&metrics);
        if metrics.is_stalled {
            warn!(message = "pose stream stalled", status = %text);
        } else {
            info!(
                fps = metrics.fps,
                height = metrics.height,
                straight = metrics.is_straight,
                detected = metrics.is_detected,
            );
            for keypoint in &metrics.keypoints {
                trace!(
                    keypoint = %keypoint.kind,
                    x = keypoint.point.x,
                    y = keypoint.point.y,
                    score = keypoint.score,
                );
            }
        }
        if let Some(progress) = progress {
            progress.set_message(text);
            progress.inc(1);
        }
        latest = Some(metrics);
    }
    if let Some(progress) = progress {
        progress.finish();
    }
    latest
}
