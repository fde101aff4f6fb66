use crate::math::polygon_2d::{perimeter_2d, signed_area_2d};
use crate::math::Point2;

use super::Contour;

/// A discretized contour: ordered points plus a closed flag.
///
/// Closed polygons do not repeat their first point; the edge from the last
/// point back to the first is implied by `closed`.
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    pub points: Vec<Point2>,
    pub closed: bool,
}

impl Polygon {
    /// Creates a polygon from points.
    #[must_use]
    pub fn new(points: Vec<Point2>, closed: bool) -> Self {
        Self { points, closed }
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the polygon has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of edges: `len` for closed polygons, `len - 1` for open ones.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        let n = self.points.len();
        if n < 2 {
            0
        } else if self.closed {
            n
        } else {
            n - 1
        }
    }

    /// Length of edge `i`, running from point `i` to its successor.
    #[must_use]
    pub fn edge_length(&self, i: usize) -> f64 {
        let n = self.points.len();
        (self.points[(i + 1) % n] - self.points[i]).norm()
    }

    /// Signed area (zero for open polygons).
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        if self.closed {
            signed_area_2d(&self.points)
        } else {
            0.0
        }
    }

    /// Total edge length.
    #[must_use]
    pub fn perimeter(&self) -> f64 {
        perimeter_2d(&self.points, self.closed)
    }

    /// Returns the polygon traversed in the opposite direction.
    ///
    /// Closed polygons keep their first point so that only the direction
    /// changes.
    #[must_use]
    pub fn reversed(&self) -> Self {
        let mut points = self.points.clone();
        if self.closed && points.len() > 1 {
            points[1..].reverse();
        } else {
            points.reverse();
        }
        Self {
            points,
            closed: self.closed,
        }
    }

    /// Converts back into a contour of straight lines.
    #[must_use]
    pub fn to_contour(&self, key: Option<String>) -> Contour {
        Contour {
            key,
            ..Contour::from_points(&self.points, self.closed)
        }
    }
}
