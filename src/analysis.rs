use crate::{
    config,
    display::{CameraFacing, CoordinateMapper, Orientation},
    geometry::Point,
    height::HeightEstimator,
    keypoints::IndexedKeypoints,
    pose::{KeypointKind, Pose},
    posture::Classifier,
};
use tracing::{debug, instrument};

/// A confidently observed keypoint in display coordinates.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct RenderableKeypoint {
    pub(crate) kind: KeypointKind,
    pub(crate) point: Point,
    pub(crate) score: f32,
}

/// Everything the presentation layer needs about one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct FrameMetrics {
    pub(crate) keypoints: Vec<RenderableKeypoint>,
    pub(crate) fps: u32,
    pub(crate) height: u32,
    pub(crate) is_straight: bool,
    pub(crate) is_detected: bool,
    /// Set only on the final report of a loop that gave up after repeated failures.
    pub(crate) is_stalled: bool,
}

impl FrameMetrics {
    pub(crate) fn stalled() -> Self {
        Self {
            is_stalled: true,
            ..Self::default()
        }
    }
}

pub(crate) struct Analyzer {
    threshold: f32,
    classifier: Classifier,
    height: HeightEstimator,
    mapper: CoordinateMapper,
}

impl Analyzer {
    pub(crate) fn new(analysis: &config::Analysis, mapper: CoordinateMapper) -> Self {
        Self {
            threshold: analysis.threshold,
            classifier: Classifier::new(analysis.bounds()),
            height: HeightEstimator::new(analysis.height_ratio),
            mapper,
        }
    }

    /// Derive the metrics of a frame from the estimator's poses; only the first pose is used.
    #[instrument(name = "Analyzer::analyze", skip(self, poses), fields(num_poses = poses.len()))]
    pub(crate) fn analyze(
        &self,
        poses: &[Pose],
        fps: u32,
        orientation: Orientation,
        facing: CameraFacing,
    ) -> FrameMetrics {
        let indexed = IndexedKeypoints::index(poses.first(), self.threshold);
        let posture = self.classifier.classify(&indexed);
        let height = self.height.estimate(&indexed);

        let keypoints = indexed
            .iter()
            .map(|keypoint| RenderableKeypoint {
                kind: keypoint.kind,
                point: self.mapper.map(keypoint.point, orientation, facing),
                score: keypoint.confidence(),
            })
            .collect::<Vec<_>>();

        debug!(
            pose_score = ?poses.first().and_then(|pose| pose.score),
            joints = keypoints.len(),
            height,
            detected = posture.detected,
            straight = posture.straight,
        );

        FrameMetrics {
            keypoints,
            fps,
            height,
            is_straight: posture.straight,
            is_detected: posture.detected,
            is_stalled: false,
        }
    }
}
