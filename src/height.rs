use crate::{keypoints::IndexedKeypoints, pose::KeypointKind};
use num_traits::ToPrimitive;

pub(crate) const DEFAULT_HEIGHT_RATIO: f32 = 8.5;

/// Relative body height, measured in eye separations and scaled by a fixed ratio.
#[derive(Debug, Copy, Clone)]
pub(crate) struct HeightEstimator {
    pub(crate) ratio: f32,
}

impl Default for HeightEstimator {
    fn default() -> Self {
        Self {
            ratio: DEFAULT_HEIGHT_RATIO,
        }
    }
}

impl HeightEstimator {
    pub(crate) fn new(ratio: f32) -> Self {
        Self { ratio }
    }

    /// Zero when an eye or ankle is missing or the eyes share a column.
    pub(crate) fn estimate(&self, keypoints: &IndexedKeypoints) -> u32 {
        self.try_estimate(keypoints).unwrap_or(0)
    }

    fn try_estimate(&self, keypoints: &IndexedKeypoints) -> Option<u32> {
        let point = |kind| keypoints.get(kind).map(|keypoint| keypoint.point);
        let left_eye = point(KeypointKind::LeftEye)?;
        let right_eye = point(KeypointKind::RightEye)?;
        let left_ankle = point(KeypointKind::LeftAnkle)?;
        let right_ankle = point(KeypointKind::RightAnkle)?;

        let eye_offset = (left_eye.x - right_eye.x).abs();
        if eye_offset == 0.0 {
            return None;
        }
        let height_offset =
            ((left_eye.y + right_eye.y) - (left_ankle.y + right_ankle.y)).abs() / 2.0;

        // NaN and infinity fail the conversion
        (height_offset / eye_offset * self.ratio).floor().to_u32()
    }
}
