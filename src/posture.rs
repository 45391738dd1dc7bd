use crate::{
    geometry::{approximately_collinear, slope_delta, Bounds, Point},
    keypoints::IndexedKeypoints,
    pose::KeypointKind,
};
use tracing::{instrument, trace};

/// A single alignment test over indexed joints.
#[derive(Debug, Copy, Clone)]
pub(crate) enum Check {
    /// Both joints sit on a horizontal line, anchored at `x = 0` on the first joint's height.
    Level(KeypointKind, KeypointKind),
    /// Both joints sit on a vertical line, anchored at `y = 0` on the first joint's column.
    Plumb(KeypointKind, KeypointKind),
    /// Three joints form a straight chain.
    Chain(KeypointKind, KeypointKind, KeypointKind),
}

impl Check {
    /// The three points handed to the collinearity test, or `None` if a joint is missing.
    fn points(self, keypoints: &IndexedKeypoints) -> Option<(Point, Point, Point)> {
        let point = |kind| keypoints.get(kind).map(|keypoint| keypoint.point);
        match self {
            Self::Level(a, b) => {
                let (a, b) = (point(a)?, point(b)?);
                Some((Point::new(0.0, a.y), a, b))
            }
            Self::Plumb(a, b) => {
                let (a, b) = (point(a)?, point(b)?);
                Some((Point::new(a.x, 0.0), a, b))
            }
            Self::Chain(a, b, c) => Some((point(a)?, point(b)?, point(c)?)),
        }
    }
}

pub(crate) mod constants {
    use super::Check::{self, *};
    use crate::pose::KeypointKind::*;

    pub(crate) const CHECKS: [Check; 17] = [
        // left/right pairs level with each other
        Level(LeftEye, RightEye),
        Level(LeftShoulder, RightShoulder),
        Level(LeftElbow, RightElbow),
        Level(LeftWrist, RightWrist),
        Level(LeftHip, RightHip),
        Level(LeftKnee, RightKnee),
        Level(LeftAnkle, RightAnkle),
        // legs
        Chain(LeftHip, LeftKnee, LeftAnkle),
        Chain(RightHip, RightKnee, RightAnkle),
        // body lines
        Chain(LeftEye, LeftKnee, LeftAnkle),
        Chain(RightEye, RightKnee, RightAnkle),
        // arms
        Chain(LeftShoulder, LeftElbow, LeftWrist),
        Chain(RightShoulder, RightElbow, RightWrist),
        // arm and leg envelopes
        Plumb(LeftShoulder, LeftWrist),
        Plumb(RightShoulder, RightWrist),
        Plumb(LeftAnkle, LeftHip),
        Plumb(RightAnkle, RightHip),
    ];
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub(crate) struct Posture {
    /// Every canonical joint was confidently observed.
    pub(crate) detected: bool,
    pub(crate) straight: bool,
}

#[derive(Debug, Copy, Clone, Default)]
pub(crate) struct Classifier {
    pub(crate) bounds: Bounds,
}

impl Classifier {
    pub(crate) fn new(bounds: Bounds) -> Self {
        Self { bounds }
    }

    #[instrument(name = "Classifier::classify", skip_all, fields(joints = keypoints.len()))]
    pub(crate) fn classify(&self, keypoints: &IndexedKeypoints) -> Posture {
        if !keypoints.is_complete() {
            return Posture::default();
        }

        // every check runs so that each delta is traced
        let straight = constants::CHECKS
            .iter()
            .fold(true, |straight, &check| self.evaluate(check, keypoints) && straight);

        Posture {
            detected: true,
            straight,
        }
    }

    fn evaluate(&self, check: Check, keypoints: &IndexedKeypoints) -> bool {
        match check.points(keypoints) {
            Some((p1, p2, p3)) => {
                let aligned = approximately_collinear(p1, p2, p3, self.bounds);
                trace!(?check, delta = slope_delta(p1, p2, p3), aligned);
                aligned
            }
            None => false,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{constants, Classifier, Posture};
    use crate::{
        keypoints::IndexedKeypoints,
        pose::{Keypoint, KeypointKind, Pose},
    };

    /// A symmetric upright pose: left joints at x = 80/90, right joints at x = 110/120, with
    /// paired joints at equal heights and each side stacked vertically.
    pub(crate) fn standing() -> Pose {
        use KeypointKind::*;
        let layout = [
            (Nose, 100.0, 60.0),
            (LeftEye, 90.0, 50.0),
            (RightEye, 110.0, 50.0),
            (LeftEar, 85.0, 55.0),
            (RightEar, 115.0, 55.0),
            (LeftShoulder, 80.0, 100.0),
            (RightShoulder, 120.0, 100.0),
            (LeftElbow, 80.0, 160.0),
            (RightElbow, 120.0, 160.0),
            (LeftWrist, 80.0, 220.0),
            (RightWrist, 120.0, 220.0),
            (LeftHip, 90.0, 230.0),
            (RightHip, 110.0, 230.0),
            (LeftKnee, 90.0, 320.0),
            (RightKnee, 110.0, 320.0),
            (LeftAnkle, 90.0, 400.0),
            (RightAnkle, 110.0, 400.0),
        ];
        Pose {
            keypoints: layout
                .iter()
                .map(|&(kind, x, y)| Keypoint::new(kind, x, y, Some(0.9)).unwrap())
                .collect(),
            score: Some(0.9),
        }
    }

    fn moved(mut pose: Pose, kind: KeypointKind, x: f32, y: f32) -> Pose {
        pose.keypoints
            .iter_mut()
            .filter(|keypoint| keypoint.kind == kind)
            .for_each(|keypoint| {
                keypoint.point.x = x;
                keypoint.point.y = y;
            });
        pose
    }

    fn classify(pose: &Pose) -> Posture {
        Classifier::default().classify(&IndexedKeypoints::index(Some(pose), 0.3))
    }

    /// One-based positions of the checks that reject `pose`.
    fn failing_checks(pose: &Pose) -> Vec<usize> {
        let keypoints = IndexedKeypoints::index(Some(pose), 0.3);
        let classifier = Classifier::default();
        constants::CHECKS
            .iter()
            .enumerate()
            .filter(|&(_, &check)| !classifier.evaluate(check, &keypoints))
            .map(|(position, _)| position + 1)
            .collect()
    }

    #[test]
    fn standing_pose_is_straight() {
        assert!(failing_checks(&standing()).is_empty());
        assert_eq!(
            classify(&standing()),
            Posture {
                detected: true,
                straight: true
            }
        );
    }

    #[test]
    fn tilted_head_is_not_straight() {
        // eye line slope of 0.5 falls inside the rejection window
        let pose = moved(standing(), KeypointKind::RightEye, 110.0, 60.0);
        assert_eq!(failing_checks(&pose), [1]);
        assert_eq!(
            classify(&pose),
            Posture {
                detected: true,
                straight: false
            }
        );
    }

    #[test]
    fn dropped_shoulder_fails_only_the_shoulder_line() {
        // shoulder line slope of 0.5; the right arm stays vertical
        let pose = moved(standing(), KeypointKind::RightShoulder, 120.0, 120.0);
        assert_eq!(failing_checks(&pose), [2]);
        assert!(!classify(&pose).straight);
    }

    #[test]
    fn slightly_angled_arm_passes_the_plumb_line() {
        // the anchored segment is vertical, so the shoulder -> wrist slope of 60 lands far above
        // the upper bound
        let pose = moved(standing(), KeypointKind::LeftWrist, 82.0, 220.0);
        assert!(failing_checks(&pose).is_empty());
        assert!(classify(&pose).straight);
    }

    #[test]
    fn bent_knee_is_not_straight() {
        // hip -> knee slope 1, knee -> ankle slope about -0.9
        let pose = moved(standing(), KeypointKind::LeftKnee, 180.0, 320.0);
        assert!(!classify(&pose).straight);
    }

    #[test]
    fn missing_joint_is_undetected() {
        let mut pose = standing();
        pose.keypoints.retain(|keypoint| keypoint.kind != KeypointKind::Nose);
        assert_eq!(classify(&pose), Posture::default());
    }

    #[test]
    fn low_confidence_joint_is_undetected() {
        let mut pose = standing();
        pose.keypoints[KeypointKind::LeftWrist.idx()].score = Some(0.2);
        assert_eq!(
            classify(&pose),
            Posture {
                detected: false,
                straight: false
            }
        );
    }
}
