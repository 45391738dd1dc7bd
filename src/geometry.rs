/// Slope used in place of a division by zero for segments with no horizontal extent.
pub(crate) const VERTICAL_SLOPE: f32 = 1e6;

const DEFAULT_LOWER_BOUND: f32 = 0.3;
const DEFAULT_UPPER_BOUND: f32 = 3.0;

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub(crate) struct Point {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

impl Point {
    #[inline]
    pub(crate) const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Slope of the segment from `self` to `other`.
    ///
    /// A vertical segment reports [`VERTICAL_SLOPE`] regardless of direction and a zero-length
    /// segment reports zero. Steeper slopes saturate at `±VERTICAL_SLOPE`, so the result is
    /// finite for finite inputs and independent of the traversal direction.
    pub(crate) fn slope_to(self, other: Self) -> f32 {
        // f64 keeps differences of extreme f32 coordinates finite
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        let vertical = f64::from(VERTICAL_SLOPE);
        if dx != 0.0 {
            (dy / dx).clamp(-vertical, vertical) as f32
        } else if dy != 0.0 {
            VERTICAL_SLOPE
        } else {
            0.0
        }
    }
}

/// Slope-difference window outside of which three points count as aligned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Bounds {
    pub(crate) lower: f32,
    pub(crate) upper: f32,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            lower: DEFAULT_LOWER_BOUND,
            upper: DEFAULT_UPPER_BOUND,
        }
    }
}

/// Absolute difference between the slopes of `p1 -> p2` and `p2 -> p3`.
pub(crate) fn slope_delta(p1: Point, p2: Point, p3: Point) -> f32 {
    (p1.slope_to(p2) - p2.slope_to(p3)).abs()
}

/// Whether `p1 -> p2 -> p3` is close enough to a straight line.
///
/// Both a near-zero slope difference (parallel segments) and a very large one (both segments
/// close to vertical) are accepted.
pub(crate) fn approximately_collinear(p1: Point, p2: Point, p3: Point, bounds: Bounds) -> bool {
    let delta = slope_delta(p1, p2, p3);
    delta <= bounds.lower || delta >= bounds.upper
}

#[cfg(test)]
mod tests {
    use super::{approximately_collinear, slope_delta, Bounds, Point, VERTICAL_SLOPE};
    use assert_approx_eq::assert_approx_eq;
    use proptest::prelude::*;

    #[test]
    fn horizontal_line_is_collinear() {
        let (p1, p2, p3) = (Point::new(0.0, 0.0), Point::new(1.0, 0.0), Point::new(2.0, 0.0));
        assert_approx_eq!(slope_delta(p1, p2, p3), 0.0);
        assert!(approximately_collinear(p1, p2, p3, Bounds::default()));
    }

    #[test]
    fn peak_is_not_collinear() {
        let (p1, p2, p3) = (Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0));
        assert_approx_eq!(slope_delta(p1, p2, p3), 2.0);
        assert!(!approximately_collinear(p1, p2, p3, Bounds::default()));
    }

    #[test]
    fn vertical_line_is_collinear() {
        let (p1, p2, p3) = (
            Point::new(5.0, 0.0),
            Point::new(5.0, 10.0),
            Point::new(5.0, 20.0),
        );
        assert_eq!(slope_delta(p1, p2, p3), 0.0);
        assert!(approximately_collinear(p1, p2, p3, Bounds::default()));
    }

    #[test]
    fn vertical_then_sloped_hits_upper_bound() {
        let (p1, p2, p3) = (
            Point::new(5.0, 0.0),
            Point::new(5.0, 10.0),
            Point::new(15.0, 20.0),
        );
        assert_approx_eq!(slope_delta(p1, p2, p3), VERTICAL_SLOPE - 1.0);
        assert!(approximately_collinear(p1, p2, p3, Bounds::default()));
    }

    #[test]
    fn coincident_points_do_not_produce_nan() {
        let p = Point::new(3.0, 3.0);
        let delta = slope_delta(p, p, Point::new(4.0, 3.0));
        assert!(delta.is_finite());
        assert!(approximately_collinear(p, p, Point::new(4.0, 3.0), Bounds::default()));
    }

    #[test]
    fn near_vertical_segments_saturate() {
        let (p1, p2, p3) = (
            Point::new(0.0, 0.0),
            Point::new(1e-44, 1.0),
            Point::new(2e-44, 2.0),
        );
        assert_eq!(p1.slope_to(p2), VERTICAL_SLOPE);
        assert_eq!(slope_delta(p1, p2, p3), 0.0);
        assert!(approximately_collinear(p1, p2, p3, Bounds::default()));
    }

    #[test]
    fn extreme_coordinates_stay_finite() {
        let (p1, p2, p3) = (
            Point::new(0.0, 0.0),
            Point::new(0.5, 3e38),
            Point::new(1.0, -3e38),
        );
        let delta = slope_delta(p1, p2, p3);
        assert!(delta.is_finite());
        assert_approx_eq!(delta, 2.0 * VERTICAL_SLOPE);
        assert!(approximately_collinear(p1, p2, p3, Bounds::default()));
    }

    #[test]
    fn custom_bounds() {
        let (p1, p2, p3) = (Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 0.0));
        let bounds = Bounds {
            lower: 2.5,
            upper: 10.0,
        };
        assert!(approximately_collinear(p1, p2, p3, bounds));
    }

    fn coordinate() -> impl Strategy<Value = f32> {
        -1000.0_f32..1000.0
    }

    proptest! {
        #[test]
        fn collinearity_is_symmetric_under_reversal(
            x1 in coordinate(), y1 in coordinate(),
            x2 in coordinate(), y2 in coordinate(),
            x3 in coordinate(), y3 in coordinate(),
        ) {
            let (p1, p2, p3) = (Point::new(x1, y1), Point::new(x2, y2), Point::new(x3, y3));
            prop_assume!(p1 != p2 && p2 != p3);
            let bounds = Bounds::default();
            prop_assert_eq!(
                approximately_collinear(p1, p2, p3, bounds),
                approximately_collinear(p3, p2, p1, bounds)
            );
        }
    }
}
