#[derive(Debug, thiserror::Error)]
pub(crate) enum Error {
    #[error("failed to construct NotNan from f32: {1}")]
    ConstructNotNan(#[source] ordered_float::FloatIsNan, f32),

    #[error("failed to convert usize value to keypoint kind: {0}")]
    ConvertUSizeToKeypointKind(usize),

    #[error("unknown keypoint name: {0}")]
    UnknownKeypointName(String),

    #[error("unknown orientation: {0}")]
    UnknownOrientation(String),

    #[error("unknown camera facing: {0}")]
    UnknownCameraFacing(String),

    #[error("unknown platform: {0}")]
    UnknownPlatform(String),

    #[error("failed to open recording: {1:?}")]
    OpenRecording(#[source] std::io::Error, std::path::PathBuf),

    #[error("failed to read frame")]
    ReadFrame(#[source] std::io::Error),

    #[error("failed to parse frame on line {1}")]
    ParseFrame(#[source] serde_json::Error, usize),

    #[error("pose estimator failed")]
    Estimator(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("presentation consumer hung up")]
    PresentationClosed,

    #[error("frame loop stalled after {0} consecutive failures")]
    Stalled(usize),
}
