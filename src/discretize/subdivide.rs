use crate::geometry::Segment;
use crate::math::arc_2d::ArcParams;
use crate::math::bezier_2d::{control_polygon_length, flatness, split_cubic, split_quad};
use crate::math::Point2;

use super::MAX_CONTOUR_POINTS;

/// Bisection depth cap; 2^24 pieces per segment is far below any sane bound.
const MAX_DEPTH: u32 = 24;

/// Stopping criterion for recursive bisection.
#[derive(Debug, Clone, Copy)]
pub(super) enum Bound {
    Deviation(f64),
    Length(f64),
}

/// A curved piece that can be bisected and measured.
trait Subdivide: Sized {
    /// Upper bound of the distance between the piece and its chord.
    fn deviation(&self) -> f64;
    /// Upper bound of the piece's length.
    fn length(&self) -> f64;
    fn halves(&self) -> (Self, Self);
    fn end(&self) -> Point2;
}

impl Subdivide for [Point2; 3] {
    fn deviation(&self) -> f64 {
        flatness(self)
    }

    fn length(&self) -> f64 {
        control_polygon_length(self)
    }

    fn halves(&self) -> (Self, Self) {
        split_quad(self, 0.5)
    }

    fn end(&self) -> Point2 {
        self[2]
    }
}

impl Subdivide for [Point2; 4] {
    fn deviation(&self) -> f64 {
        flatness(self)
    }

    fn length(&self) -> f64 {
        control_polygon_length(self)
    }

    fn halves(&self) -> (Self, Self) {
        split_cubic(self, 0.5)
    }

    fn end(&self) -> Point2 {
        self[3]
    }
}

impl Subdivide for ArcParams {
    fn deviation(&self) -> f64 {
        self.sagitta_bound()
    }

    fn length(&self) -> f64 {
        self.length_bound()
    }

    fn halves(&self) -> (Self, Self) {
        (self.sub_arc(0.0, 0.5), self.sub_arc(0.5, 1.0))
    }

    fn end(&self) -> Point2 {
        self.point_at(1.0)
    }
}

fn bisect<S: Subdivide>(piece: &S, bound: Bound, depth: u32, out: &mut Vec<Point2>) {
    let done = match bound {
        Bound::Deviation(tol) => piece.deviation() <= tol,
        Bound::Length(len) => piece.length() <= len,
    };
    // Past the point cap the caller reports an error; stop refining.
    if done || depth >= MAX_DEPTH || out.len() >= MAX_CONTOUR_POINTS {
        out.push(piece.end());
        return;
    }
    let (left, right) = piece.halves();
    bisect(&left, bound, depth + 1, out);
    bisect(&right, bound, depth + 1, out);
}

/// Appends the points of `seg` after its start point to `out`.
///
/// Straight segments contribute only their end point. The last pushed point
/// is always the segment's exact end point. Once `out` holds
/// [`MAX_CONTOUR_POINTS`] points, curves contribute only coarse pieces.
pub(super) fn flatten_segment(seg: &Segment, bound: Bound, out: &mut Vec<Point2>) {
    match *seg {
        Segment::Line { to, .. } => out.push(to),
        Segment::Quadratic { from, ctrl, to } => bisect(&[from, ctrl, to], bound, 0, out),
        Segment::Cubic {
            from,
            ctrl1,
            ctrl2,
            to,
        } => bisect(&[from, ctrl1, ctrl2, to], bound, 0, out),
        Segment::Arc { to, .. } => match seg.arc_params() {
            Some(arc) => {
                bisect(&arc, bound, 0, out);
                // Trigonometry drifts; pin the end point.
                if let Some(last) = out.last_mut() {
                    *last = to;
                }
            }
            None => out.push(to),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_quad_emits_single_point() {
        let mut out = Vec::new();
        let seg = Segment::Quadratic {
            from: Point2::new(0.0, 0.0),
            ctrl: Point2::new(1.0, 0.0),
            to: Point2::new(2.0, 0.0),
        };
        flatten_segment(&seg, Bound::Deviation(0.1), &mut out);
        assert_eq!(out, vec![Point2::new(2.0, 0.0)]);
    }

    #[test]
    fn bisection_count_grows_as_bound_shrinks() {
        let seg = Segment::Cubic {
            from: Point2::new(0.0, 0.0),
            ctrl1: Point2::new(0.0, 10.0),
            ctrl2: Point2::new(10.0, 10.0),
            to: Point2::new(10.0, 0.0),
        };
        let mut coarse = Vec::new();
        let mut fine = Vec::new();
        flatten_segment(&seg, Bound::Length(5.0), &mut coarse);
        flatten_segment(&seg, Bound::Length(0.5), &mut fine);
        assert!(fine.len() > coarse.len());
        assert_eq!(coarse.last(), Some(&Point2::new(10.0, 0.0)));
    }

    #[test]
    fn arc_end_point_is_exact() {
        let seg = Segment::Arc {
            from: Point2::new(0.0, 0.0),
            to: Point2::new(0.3, 0.7),
            radii: crate::math::Vector2::new(1.0, 1.0),
            x_rotation: 0.0,
            large_arc: true,
            sweep: false,
        };
        let mut out = Vec::new();
        flatten_segment(&seg, Bound::Deviation(0.001), &mut out);
        assert_eq!(out.last(), Some(&Point2::new(0.3, 0.7)));
    }
}
