//! Recorded pose streams, one JSON object per line.
//!
//! A recording stands in for the camera, the orientation sensor and the pose estimator at once:
//! every line is a frame, optionally carrying an orientation or camera change, together with the
//! poses the estimator produced for it.

use crate::{
    display::{CameraFacing, DeviceState, Orientation},
    error::Error,
    frame_loop::{FrameSource, PoseEstimator},
    pose::{Keypoint, KeypointKind, Pose},
};
use std::{
    fs::File,
    io::{BufRead, BufReader, Lines},
    path::Path,
    time::Duration,
};
use tracing::trace;

#[derive(Debug, serde::Deserialize)]
struct RecordedKeypoint {
    name: Option<String>,
    x: f32,
    y: f32,
    score: Option<f32>,
}

#[derive(Debug, serde::Deserialize)]
struct RecordedPose {
    score: Option<f32>,
    keypoints: Vec<RecordedKeypoint>,
}

#[derive(Debug, serde::Deserialize)]
struct Record {
    orientation: Option<Orientation>,
    facing: Option<CameraFacing>,
    #[serde(default)]
    poses: Vec<RecordedPose>,
}

impl RecordedPose {
    fn to_pose(&self) -> Result<Pose, Error> {
        let keypoints = self
            .keypoints
            .iter()
            .enumerate()
            .map(|(position, keypoint)| {
                let kind = match keypoint.name.as_deref() {
                    Some(name) => name.parse()?,
                    None => KeypointKind::from_position(position)?,
                };
                Keypoint::new(kind, keypoint.x, keypoint.y, keypoint.score)
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Pose {
            keypoints,
            score: self.score,
        })
    }
}

/// A frame read from a recording, holding the estimator output in its raw recorded form.
#[derive(Debug)]
pub(crate) struct RecordedFrame {
    pub(crate) line: usize,
    poses: Vec<RecordedPose>,
}

pub(crate) struct ReplaySource<R> {
    lines: Lines<R>,
    line: usize,
    device: DeviceState,
    interval: Duration,
}

impl ReplaySource<BufReader<File>> {
    pub(crate) fn open<P>(path: P, device: DeviceState, interval: Duration) -> Result<Self, Error>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::OpenRecording(e, path.to_owned()))?;
        Ok(Self::new(BufReader::new(file), device, interval))
    }
}

impl<R> ReplaySource<R>
where
    R: BufRead,
{
    /// Replay `reader`, waiting `interval` before handing out each frame.
    pub(crate) fn new(reader: R, device: DeviceState, interval: Duration) -> Self {
        Self {
            lines: reader.lines(),
            line: 0,
            device,
            interval,
        }
    }
}

impl<R> FrameSource for ReplaySource<R>
where
    R: BufRead,
{
    type Frame = RecordedFrame;

    fn next_frame(&mut self) -> Result<Option<Self::Frame>, Error> {
        for text in &mut self.lines {
            self.line += 1;
            let text = text.map_err(Error::ReadFrame)?;
            if text.trim().is_empty() {
                continue;
            }

            let record = serde_json::from_str::<Record>(&text)
                .map_err(|e| Error::ParseFrame(e, self.line))?;
            if let Some(orientation) = record.orientation {
                self.device.set_orientation(orientation);
            }
            if let Some(facing) = record.facing {
                self.device.set_facing(facing);
            }

            if !self.interval.is_zero() {
                std::thread::sleep(self.interval);
            }
            return Ok(Some(RecordedFrame {
                line: self.line,
                poses: record.poses,
            }));
        }
        Ok(None)
    }

    fn release(&mut self, frame: Self::Frame) {
        trace!(line = frame.line, "releasing recorded frame");
    }
}

/// Decodes the poses stored alongside each recorded frame.
#[derive(Debug, Default)]
pub(crate) struct ReplayEstimator;

impl PoseEstimator<RecordedFrame> for ReplayEstimator {
    fn estimate(&mut self, frame: &RecordedFrame, timestamp_ms: u64) -> Result<Vec<Pose>, Error> {
        trace!(line = frame.line, timestamp_ms, poses = frame.poses.len());
        frame
            .poses
            .iter()
            .map(RecordedPose::to_pose)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| Error::Estimator(Box::new(e)))
    }
}

#[cfg(test)]
mod tests {
    use super::{ReplayEstimator, ReplaySource};
    use crate::{
        display::{CameraFacing, DeviceState, Orientation},
        error::Error,
        frame_loop::{FrameSource, PoseEstimator},
        pose::KeypointKind,
    };
    use std::{io::Cursor, time::Duration};

    fn source(text: &str) -> (ReplaySource<Cursor<&str>>, DeviceState) {
        let device = DeviceState::new(Orientation::PortraitUp, CameraFacing::Front);
        (
            ReplaySource::new(Cursor::new(text), device.clone(), Duration::ZERO),
            device,
        )
    }

    #[test]
    fn named_and_positional_keypoints() {
        let (mut source, _) = source(concat!(
            r#"{"poses": [{"score": 0.8, "keypoints": ["#,
            r#"{"x": 1, "y": 2, "score": 0.9}, "#,
            r#"{"x": 3, "y": 4}, "#,
            r#"{"name": "right_ankle", "x": 5, "y": 6, "score": 0.7}"#,
            r#"]}]}"#,
        ));
        let frame = source.next_frame().unwrap().unwrap();
        let poses = ReplayEstimator.estimate(&frame, 0).unwrap();
        source.release(frame);

        assert_eq!(poses.len(), 1);
        let kinds = poses[0]
            .keypoints
            .iter()
            .map(|keypoint| keypoint.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            [
                KeypointKind::Nose,
                KeypointKind::LeftEye,
                KeypointKind::RightAnkle
            ]
        );
        assert_eq!(poses[0].keypoints[1].score, None);
        assert_eq!(poses[0].score, Some(0.8));
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn blank_lines_are_skipped_and_orientation_is_applied() {
        let (mut source, device) = source(
            "\n{\"poses\": []}\n\n{\"orientation\": \"landscape-left\", \"facing\": \"back\"}\n",
        );
        let first = source.next_frame().unwrap().unwrap();
        assert_eq!(first.line, 2);
        assert_eq!(device.orientation(), Orientation::PortraitUp);

        let second = source.next_frame().unwrap().unwrap();
        assert_eq!(second.line, 4);
        assert!(ReplayEstimator.estimate(&second, 10).unwrap().is_empty());
        assert_eq!(device.orientation(), Orientation::LandscapeLeft);
        assert_eq!(device.facing(), CameraFacing::Back);
    }

    #[test]
    fn malformed_line_reports_its_number() {
        let (mut source, _) = source("{\"poses\": []}\nnot json\n{\"poses\": []}\n");
        assert!(source.next_frame().unwrap().is_some());
        assert!(matches!(source.next_frame(), Err(Error::ParseFrame(_, 2))));
        assert!(source.next_frame().unwrap().is_some());
    }

    #[test]
    fn unknown_keypoint_name_fails_estimation() {
        let (mut source, _) =
            source(r#"{"poses": [{"keypoints": [{"name": "tail", "x": 0, "y": 0}]}]}"#);
        let frame = source.next_frame().unwrap().unwrap();
        let error = ReplayEstimator.estimate(&frame, 0).unwrap_err();
        assert!(matches!(error, Error::Estimator(_)));
        assert_eq!(
            std::error::Error::source(&error).map(ToString::to_string),
            Some("unknown keypoint name: tail".to_owned())
        );
    }
}
