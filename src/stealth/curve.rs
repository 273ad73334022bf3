//! Pointer trajectory generation
//!
//! Builds curved, slightly shaky paths between two screen coordinates so
//! pointer movement never travels in a perfectly straight line.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Fewest points on any generated path
pub const MIN_PATH_POINTS: usize = 10;
/// Most points on any generated path
pub const MAX_PATH_POINTS: usize = 100;

/// Distance in pixels covered by one path sample
const PIXELS_PER_STEP: f64 = 5.0;
/// Control point noise spread (each axis gets +/- half of this)
const CONTROL_POINT_SPREAD: f64 = 50.0;
/// Per-point jitter spread (each axis gets +/- half of this)
const POINT_JITTER_SPREAD: f64 = 2.0;

/// A 2-D page coordinate
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point
    pub fn distance_to(&self, other: Point) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }

    /// Point at fraction `t` of the straight segment towards `other`
    fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Number of samples for a move of the given length
pub fn step_count(distance: f64) -> usize {
    ((distance / PIXELS_PER_STEP) as usize).clamp(MIN_PATH_POINTS, MAX_PATH_POINTS)
}

/// Generate a human-looking path from `start` to `end`
///
/// The path is a cubic Bézier curve whose two control points sit at 25% and
/// 75% of the straight line, each pushed off it by up to 25px per axis.
/// Every sample, endpoints included, then receives up to 1px of jitter, so
/// the first and last points are close to but not exactly the inputs.
///
/// Samples are capped at [`MAX_PATH_POINTS`], so moves longer than about
/// 5000px take steps wider than 50px.
pub fn generate_path<R: Rng + ?Sized>(rng: &mut R, start: Point, end: Point) -> Vec<Point> {
    let steps = step_count(start.distance_to(end));

    let cp1 = offset(rng, start.lerp(end, 0.25), CONTROL_POINT_SPREAD);
    let cp2 = offset(rng, start.lerp(end, 0.75), CONTROL_POINT_SPREAD);

    (0..steps)
        .map(|i| {
            let t = i as f64 / (steps - 1) as f64;
            let point = cubic_bezier(start, cp1, cp2, end, t);
            offset(rng, point, POINT_JITTER_SPREAD)
        })
        .collect()
}

/// Evaluate a cubic Bézier curve at `t` in [0, 1]
pub fn cubic_bezier(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let uu = u * u;
    let tt = t * t;

    let a = uu * u;
    let b = 3.0 * uu * t;
    let c = 3.0 * u * tt;
    let d = tt * t;

    Point::new(
        a * p0.x + b * p1.x + c * p2.x + d * p3.x,
        a * p0.y + b * p1.y + c * p2.y + d * p3.y,
    )
}

/// Total distance travelled along a path
pub fn path_length(path: &[Point]) -> f64 {
    path.windows(2).map(|w| w[0].distance_to(w[1])).sum()
}

fn offset<R: Rng + ?Sized>(rng: &mut R, point: Point, spread: f64) -> Point {
    Point::new(
        point.x + (rng.gen::<f64>() - 0.5) * spread,
        point.y + (rng.gen::<f64>() - 0.5) * spread,
    )
}
