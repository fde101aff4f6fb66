//! Quadratic and cubic Bézier helpers (evaluation, de Casteljau split,
//! flatness bounds).

use super::polygon_2d::point_to_segment_dist;
use super::{lerp, Point2};

/// Evaluates a quadratic Bézier at `t`.
#[must_use]
pub fn quad_point(ctrl: &[Point2; 3], t: f64) -> Point2 {
    let a = lerp(&ctrl[0], &ctrl[1], t);
    let b = lerp(&ctrl[1], &ctrl[2], t);
    lerp(&a, &b, t)
}

/// Evaluates a cubic Bézier at `t`.
#[must_use]
pub fn cubic_point(ctrl: &[Point2; 4], t: f64) -> Point2 {
    let (left, _) = split_cubic(ctrl, t);
    left[3]
}

/// Splits a quadratic Bézier at `t` into two quadratics.
#[must_use]
pub fn split_quad(ctrl: &[Point2; 3], t: f64) -> ([Point2; 3], [Point2; 3]) {
    let a = lerp(&ctrl[0], &ctrl[1], t);
    let b = lerp(&ctrl[1], &ctrl[2], t);
    let m = lerp(&a, &b, t);
    ([ctrl[0], a, m], [m, b, ctrl[2]])
}

/// Splits a cubic Bézier at `t` into two cubics.
#[must_use]
pub fn split_cubic(ctrl: &[Point2; 4], t: f64) -> ([Point2; 4], [Point2; 4]) {
    let ab = lerp(&ctrl[0], &ctrl[1], t);
    let bc = lerp(&ctrl[1], &ctrl[2], t);
    let cd = lerp(&ctrl[2], &ctrl[3], t);
    let abc = lerp(&ab, &bc, t);
    let bcd = lerp(&bc, &cd, t);
    let m = lerp(&abc, &bcd, t);
    ([ctrl[0], ab, abc, m], [m, bcd, cd, ctrl[3]])
}

/// Upper bound of the distance between a Bézier curve and its chord.
///
/// The curve lies inside the convex hull of its control points, so the
/// largest control-point distance to the chord bounds the deviation.
#[must_use]
pub fn flatness(ctrl: &[Point2]) -> f64 {
    let [first, interior @ .., last] = ctrl else {
        return 0.0;
    };
    interior
        .iter()
        .map(|p| point_to_segment_dist(p, first, last))
        .fold(0.0, f64::max)
}

/// Length of the control polygon, an upper bound of the curve length.
#[must_use]
pub fn control_polygon_length(ctrl: &[Point2]) -> f64 {
    ctrl.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
}
