use crate::{error::Error, geometry::Point};
use num_traits::FromPrimitive;
use ordered_float::NotNan;
use std::str::FromStr;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, num_derive::FromPrimitive)]
pub(crate) enum KeypointKind {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

pub(crate) const NUM_KEYPOINTS: usize = 17;

impl KeypointKind {
    pub(crate) const ALL: [KeypointKind; NUM_KEYPOINTS] = [
        Self::Nose,
        Self::LeftEye,
        Self::RightEye,
        Self::LeftEar,
        Self::RightEar,
        Self::LeftShoulder,
        Self::RightShoulder,
        Self::LeftElbow,
        Self::RightElbow,
        Self::LeftWrist,
        Self::RightWrist,
        Self::LeftHip,
        Self::RightHip,
        Self::LeftKnee,
        Self::RightKnee,
        Self::LeftAnkle,
        Self::RightAnkle,
    ];

    #[inline]
    pub(crate) fn idx(self) -> usize {
        self as usize
    }

    /// Kind of the keypoint at position `index` of an estimator's output.
    pub(crate) fn from_position(index: usize) -> Result<Self, Error> {
        Self::from_usize(index).ok_or(Error::ConvertUSizeToKeypointKind(index))
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            Self::Nose => "nose",
            Self::LeftEye => "left_eye",
            Self::RightEye => "right_eye",
            Self::LeftEar => "left_ear",
            Self::RightEar => "right_ear",
            Self::LeftShoulder => "left_shoulder",
            Self::RightShoulder => "right_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::RightElbow => "right_elbow",
            Self::LeftWrist => "left_wrist",
            Self::RightWrist => "right_wrist",
            Self::LeftHip => "left_hip",
            Self::RightHip => "right_hip",
            Self::LeftKnee => "left_knee",
            Self::RightKnee => "right_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightAnkle => "right_ankle",
        }
    }
}

impl FromStr for KeypointKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| Error::UnknownKeypointName(s.to_owned()))
    }
}

impl std::fmt::Display for KeypointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct Keypoint {
    pub(crate) kind: KeypointKind,
    pub(crate) point: Point,
    pub(crate) score: Option<f32>,
}

impl Keypoint {
    pub(crate) fn new(kind: KeypointKind, x: f32, y: f32, score: Option<f32>) -> Result<Self, Error> {
        let x = NotNan::new(x).map_err(|e| Error::ConstructNotNan(e, x))?;
        let y = NotNan::new(y).map_err(|e| Error::ConstructNotNan(e, y))?;
        Ok(Self {
            kind,
            point: Point::new(x.into_inner(), y.into_inner()),
            score,
        })
    }

    /// Confidence with an unknown score counted as zero.
    #[inline]
    pub(crate) fn confidence(&self) -> f32 {
        self.score.unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct Pose {
    pub(crate) keypoints: Vec<Keypoint>,
    pub(crate) score: Option<f32>,
}
