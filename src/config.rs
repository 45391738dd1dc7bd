use crate::geometry::Bounds;

const DEFAULT_SCORE_THRESHOLD: &str = "0.3";
const DEFAULT_LOWER_BOUND: &str = "0.3";
const DEFAULT_UPPER_BOUND: &str = "3";
const DEFAULT_HEIGHT_RATIO: &str = "8.5";
const DEFAULT_TENSOR_WIDTH: &str = "180";
const DEFAULT_MAX_CONSECUTIVE_FAILURES: &str = "3";

/// Tunables of the per-frame analysis and of the frame loop.
#[derive(Debug, Clone, Copy, structopt::StructOpt)]
pub(crate) struct Analysis {
    /// Keypoint score a joint must exceed to be used.
    #[structopt(short, long, default_value = DEFAULT_SCORE_THRESHOLD)]
    pub(crate) threshold: f32,

    /// Slope differences at or below this count as aligned.
    #[structopt(long, default_value = DEFAULT_LOWER_BOUND)]
    pub(crate) lower_bound: f32,

    /// Slope differences at or above this count as aligned (near-vertical segments).
    #[structopt(long, default_value = DEFAULT_UPPER_BOUND)]
    pub(crate) upper_bound: f32,

    /// Body heights per eye separation.
    #[structopt(long, default_value = DEFAULT_HEIGHT_RATIO)]
    pub(crate) height_ratio: f32,

    /// Width of the image the pose estimator sees; the height follows from the aspect ratio.
    #[structopt(long, default_value = DEFAULT_TENSOR_WIDTH)]
    pub(crate) tensor_width: f32,

    /// Stop the loop after this many failed frames in a row.
    #[structopt(long, default_value = DEFAULT_MAX_CONSECUTIVE_FAILURES)]
    pub(crate) max_consecutive_failures: usize,
}

impl Default for Analysis {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SCORE_THRESHOLD.parse().unwrap(),
            lower_bound: DEFAULT_LOWER_BOUND.parse().unwrap(),
            upper_bound: DEFAULT_UPPER_BOUND.parse().unwrap(),
            height_ratio: DEFAULT_HEIGHT_RATIO.parse().unwrap(),
            tensor_width: DEFAULT_TENSOR_WIDTH.parse().unwrap(),
            max_consecutive_failures: DEFAULT_MAX_CONSECUTIVE_FAILURES.parse().unwrap(),
        }
    }
}

impl Analysis {
    pub(crate) fn bounds(&self) -> Bounds {
        Bounds {
            lower: self.lower_bound,
            upper: self.upper_bound,
        }
    }
}
