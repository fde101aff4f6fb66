//! Path discretization: contours → polygons at a caller-chosen resolution.

mod subdivide;

use tracing::trace;

use crate::error::{OptionsError, Result};
use crate::geometry::{Contour, PathShape, Polygon};
use crate::math::polygon_2d::perimeter_2d;
use crate::math::{lerp, TOLERANCE};

use subdivide::{flatten_segment, Bound};

/// Upper bound on the points a single contour may discretize to.
///
/// Alignment scores every cyclic offset, so its cost grows with the square
/// of the point count; use [`crate::morph::AlignmentSearch::Strided`] for
/// dense contours.
pub const MAX_CONTOUR_POINTS: usize = 1 << 20;

/// Resolution of a discretization. Exactly one criterion governs a call.
///
/// A bound so fine that a contour would need more than
/// [`MAX_CONTOUR_POINTS`] points is rejected with `InvalidOptions`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AccuracySpec {
    /// Maximum deviation between a curve and its chords.
    Tolerance(f64),
    /// Maximum length of a chord replacing a curved piece.
    MaxSegmentLength(f64),
    /// Exactly this many points per contour, evenly spaced by arc length.
    SampleCount(usize),
}

impl Default for AccuracySpec {
    fn default() -> Self {
        Self::MaxSegmentLength(10.0)
    }
}

impl AccuracySpec {
    /// Checks that the governing value is usable.
    ///
    /// # Errors
    ///
    /// Returns `MorphError::InvalidOptions` for non-positive or non-finite
    /// bounds and for sample counts below two or above
    /// [`MAX_CONTOUR_POINTS`].
    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Tolerance(value) if !(value.is_finite() && value > 0.0) => {
                Err(OptionsError::NotPositive {
                    name: "tolerance",
                    value,
                }
                .into())
            }
            Self::MaxSegmentLength(value) if !(value.is_finite() && value > 0.0) => {
                Err(OptionsError::NotPositive {
                    name: "max segment length",
                    value,
                }
                .into())
            }
            Self::SampleCount(value) if value < 2 => Err(OptionsError::TooSmall {
                name: "sample count",
                value,
                min: 2,
            }
            .into()),
            Self::SampleCount(value) if value > MAX_CONTOUR_POINTS => {
                Err(OptionsError::TooLarge {
                    name: "sample count",
                    value,
                    max: MAX_CONTOUR_POINTS,
                }
                .into())
            }
            _ => Ok(()),
        }
    }
}

/// Discretizes every contour of a shape into a polygon.
#[derive(Debug)]
pub struct Discretize<'a> {
    shape: &'a PathShape,
    accuracy: AccuracySpec,
}

impl<'a> Discretize<'a> {
    /// Creates a new discretization operation.
    #[must_use]
    pub fn new(shape: &'a PathShape, accuracy: AccuracySpec) -> Self {
        Self { shape, accuracy }
    }

    /// Executes the discretization, one polygon per contour, in order.
    ///
    /// # Errors
    ///
    /// Returns `MorphError::InvalidOptions` for an unusable accuracy or one
    /// that needs too many points, and `MorphError::MalformedShape` for
    /// non-finite or discontinuous input.
    pub fn execute(&self) -> Result<Vec<Polygon>> {
        self.accuracy.validate()?;
        self.shape.validate()?;
        self.shape
            .contours
            .iter()
            .map(|c| discretize_contour(c, self.accuracy))
            .collect()
    }
}

/// Discretizes a single, already validated contour.
///
/// # Errors
///
/// Returns `MorphError::InvalidOptions` when the contour would need more
/// than [`MAX_CONTOUR_POINTS`] points.
pub fn discretize_contour(contour: &Contour, accuracy: AccuracySpec) -> Result<Polygon> {
    let polygon = match accuracy {
        AccuracySpec::Tolerance(tol) => flatten(contour, Bound::Deviation(tol))?,
        AccuracySpec::MaxSegmentLength(len) => flatten(contour, Bound::Length(len))?,
        AccuracySpec::SampleCount(n) => {
            let (lo, hi) = contour.bounds();
            let diag = (hi - lo).norm();
            if diag < TOLERANCE {
                Polygon::new(vec![contour.start, contour.start], contour.closed)
            } else {
                let fine = flatten(contour, Bound::Deviation(diag * 1e-3))?;
                resample(&fine, n)
            }
        }
    };
    trace!(
        points = polygon.len(),
        closed = polygon.closed,
        "discretized contour"
    );
    Ok(polygon)
}

fn flatten(contour: &Contour, bound: Bound) -> Result<Polygon> {
    let mut points = vec![contour.start];
    for seg in &contour.segments {
        flatten_segment(seg, bound, &mut points);
        if points.len() > MAX_CONTOUR_POINTS {
            return Err(OptionsError::TooFine {
                limit: MAX_CONTOUR_POINTS,
            }
            .into());
        }
    }
    if contour.closed && points.len() > 1 {
        if let Some(last) = points.last() {
            if (last - contour.start).norm() < TOLERANCE {
                points.pop();
            }
        }
    }
    if perimeter_2d(&points, contour.closed) < TOLERANCE {
        return Ok(Polygon::new(
            vec![contour.start, contour.start],
            contour.closed,
        ));
    }
    Ok(Polygon::new(points, contour.closed))
}

/// Resamples a polyline to exactly `n` points evenly spaced by arc length.
fn resample(polygon: &Polygon, n: usize) -> Polygon {
    let points = &polygon.points;
    let closed = polygon.closed;
    let total = polygon.perimeter();
    if total < TOLERANCE || points.len() < 2 {
        return polygon.clone();
    }

    let edge_count = polygon.edge_count();
    #[allow(clippy::cast_precision_loss)]
    let step = if closed {
        total / n as f64
    } else {
        total / (n - 1) as f64
    };

    let mut out = Vec::with_capacity(n);
    let mut edge = 0;
    let mut walked = 0.0;
    for k in 0..n {
        #[allow(clippy::cast_precision_loss)]
        let target = step * k as f64;
        while edge + 1 < edge_count && walked + polygon.edge_length(edge) < target {
            walked += polygon.edge_length(edge);
            edge += 1;
        }
        let a = points[edge];
        let b = points[(edge + 1) % points.len()];
        let len = polygon.edge_length(edge);
        let t = if len > 0.0 {
            ((target - walked) / len).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(lerp(&a, &b, t));
    }
    if !closed {
        if let (Some(slot), Some(end)) = (out.last_mut(), points.last()) {
            *slot = *end;
        }
    }
    Polygon::new(out, closed)
}

/// Discretizes each contour of `shape`, failing fast on malformed input.
///
/// # Errors
///
/// See [`Discretize::execute`].
pub fn discretize(shape: &PathShape, accuracy: AccuracySpec) -> Result<Vec<Polygon>> {
    Discretize::new(shape, accuracy).execute()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{MorphError, ShapeError};
    use crate::geometry::Segment;
    use crate::math::polygon_2d::point_to_segment_dist;
    use crate::math::Point2;
    use approx::assert_abs_diff_eq;

    fn square() -> PathShape {
        PathShape::rect(Point2::new(0.0, 0.0), 10.0, 10.0)
    }

    #[test]
    fn straight_segments_pass_through() {
        let polys = discretize(&square(), AccuracySpec::Tolerance(0.01)).unwrap();
        assert_eq!(polys.len(), 1);
        assert_eq!(polys[0].len(), 4);
        assert!(polys[0].closed);
        assert_eq!(polys[0].points[2], Point2::new(10.0, 10.0));
    }

    #[test]
    fn lines_ignore_length_bound() {
        let polys = discretize(&square(), AccuracySpec::MaxSegmentLength(1.0)).unwrap();
        assert_eq!(polys[0].len(), 4);
    }

    #[test]
    fn explicit_closing_point_is_dropped() {
        let shape = PathShape::new(vec![Contour::from_points(
            &[
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(0.0, 1.0),
                Point2::new(0.0, 0.0),
            ],
            true,
        )]);
        let polys = discretize(&shape, AccuracySpec::Tolerance(0.1)).unwrap();
        assert_eq!(polys[0].len(), 3);
    }

    #[test]
    fn circle_within_tolerance() {
        let center = Point2::new(0.0, 0.0);
        let shape = PathShape::circle(center, 10.0);
        let polys = discretize(&shape, AccuracySpec::Tolerance(0.01)).unwrap();
        let poly = &polys[0];
        assert!(poly.len() > 16);
        for p in &poly.points {
            assert_abs_diff_eq!((p - center).norm(), 10.0, epsilon = 1e-9);
        }
        // Chord midpoints stay within the tolerance of the circle.
        for i in 0..poly.edge_count() {
            let a = poly.points[i];
            let b = poly.points[(i + 1) % poly.len()];
            let m = crate::math::midpoint(&a, &b);
            assert!(10.0 - (m - center).norm() <= 0.01 + 1e-12);
        }
    }

    #[test]
    fn length_bound_limits_chords() {
        let shape = PathShape::circle(Point2::new(0.0, 0.0), 10.0);
        let polys = discretize(&shape, AccuracySpec::MaxSegmentLength(2.0)).unwrap();
        let poly = &polys[0];
        for i in 0..poly.edge_count() {
            assert!(poly.edge_length(i) <= 2.0 + 1e-9);
        }
    }

    #[test]
    fn cubic_deviation_bound() {
        let seg = Segment::Cubic {
            from: Point2::new(0.0, 0.0),
            ctrl1: Point2::new(0.0, 10.0),
            ctrl2: Point2::new(10.0, 10.0),
            to: Point2::new(10.0, 0.0),
        };
        let contour = Contour {
            start: seg.start(),
            segments: vec![seg],
            closed: false,
            key: None,
        };
        let poly = discretize_contour(&contour, AccuracySpec::Tolerance(0.05)).unwrap();
        assert_eq!(poly.points[0], Point2::new(0.0, 0.0));
        assert_eq!(*poly.points.last().unwrap(), Point2::new(10.0, 0.0));
        for k in 0..=50 {
            let p = seg.point_at(f64::from(k) / 50.0);
            let d = poly
                .points
                .windows(2)
                .map(|w| point_to_segment_dist(&p, &w[0], &w[1]))
                .fold(f64::INFINITY, f64::min);
            assert!(d <= 0.05 + 1e-9, "deviation {d}");
        }
    }

    #[test]
    fn sample_count_is_exact() {
        let polys = discretize(&square(), AccuracySpec::SampleCount(8)).unwrap();
        assert_eq!(polys[0].len(), 8);
        assert_eq!(polys[0].points[0], Point2::new(0.0, 0.0));
        assert_abs_diff_eq!(polys[0].points[1].x, 5.0, epsilon = 1e-9);

        let open = PathShape::new(vec![Contour::new(Point2::new(0.0, 0.0))
            .line_to(Point2::new(9.0, 0.0))]);
        let polys = discretize(&open, AccuracySpec::SampleCount(4)).unwrap();
        let xs: Vec<f64> = polys[0].points.iter().map(|p| p.x).collect();
        assert_abs_diff_eq!(xs[1], 3.0, epsilon = 1e-9);
        assert_eq!(xs[3], 9.0);
    }

    #[test]
    fn degenerate_contour_gives_two_duplicates() {
        let p = Point2::new(3.0, 4.0);
        let shape = PathShape::new(vec![Contour::point(p), Contour::new(p)]);
        let polys = discretize(&shape, AccuracySpec::default()).unwrap();
        assert_eq!(polys[0].points, vec![p, p]);
        assert_eq!(polys[1].points, vec![p, p]);
    }

    #[test]
    fn malformed_input_fails_fast() {
        let shape = PathShape::new(vec![
            Contour::new(Point2::new(0.0, 0.0)).line_to(Point2::new(f64::INFINITY, 0.0))
        ]);
        assert!(matches!(
            discretize(&shape, AccuracySpec::default()),
            Err(MorphError::MalformedShape(ShapeError::NonFinite { .. }))
        ));
    }

    #[test]
    fn invalid_accuracy() {
        assert!(matches!(
            discretize(&square(), AccuracySpec::Tolerance(0.0)),
            Err(MorphError::InvalidOptions(_))
        ));
        assert!(matches!(
            discretize(&square(), AccuracySpec::SampleCount(1)),
            Err(MorphError::InvalidOptions(_))
        ));
        assert!(matches!(
            discretize(&square(), AccuracySpec::SampleCount(MAX_CONTOUR_POINTS + 1)),
            Err(MorphError::InvalidOptions(OptionsError::TooLarge { .. }))
        ));
    }

    #[test]
    fn overly_fine_bound_is_rejected() {
        let shape = PathShape::circle(Point2::new(0.0, 0.0), 10.0);
        assert!(matches!(
            discretize(&shape, AccuracySpec::MaxSegmentLength(1e-9)),
            Err(MorphError::InvalidOptions(OptionsError::TooFine { .. }))
        ));
        // Lines are never subdivided, so a polygon is fine at any bound.
        assert!(discretize(&square(), AccuracySpec::MaxSegmentLength(1e-9)).is_ok());
    }
}
