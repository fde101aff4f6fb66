use tracing::trace;

use crate::geometry::Polygon;
use crate::math::midpoint;

/// Brings two polygons to the same point count by refining the sparser one.
#[derive(Debug)]
pub struct Equalize<'a> {
    a: &'a Polygon,
    b: &'a Polygon,
    target: Option<usize>,
}

impl<'a> Equalize<'a> {
    /// Creates a new equalization of `a` and `b`.
    #[must_use]
    pub fn new(a: &'a Polygon, b: &'a Polygon) -> Self {
        Self { a, b, target: None }
    }

    /// Raises both polygons to at least `count` points.
    #[must_use]
    pub fn with_target(mut self, count: usize) -> Self {
        self.target = Some(count);
        self
    }

    /// Executes the equalization.
    ///
    /// Both results have `max(len(a), len(b), target)` points. Points are
    /// only ever added, never moved or removed.
    #[must_use]
    pub fn execute(&self) -> (Polygon, Polygon) {
        let count = self
            .a
            .len()
            .max(self.b.len())
            .max(self.target.unwrap_or(0));
        (refine_to(self.a, count), refine_to(self.b, count))
    }
}

/// Equalizes two polygons to `max(len(a), len(b))` points.
#[must_use]
pub fn equalize(a: &Polygon, b: &Polygon) -> (Polygon, Polygon) {
    Equalize::new(a, b).execute()
}

/// Inserts midpoints into the longest edge until `polygon` has `count` points.
///
/// Ties go to the lowest edge index. A single-point polygon is padded by
/// repeating its point; an empty polygon is returned unchanged.
#[must_use]
pub fn refine_to(polygon: &Polygon, count: usize) -> Polygon {
    let mut points = polygon.points.clone();
    if points.len() >= count || points.is_empty() {
        return Polygon::new(points, polygon.closed);
    }
    if points.len() == 1 {
        return Polygon::new(vec![points[0]; count], polygon.closed);
    }

    let closed = polygon.closed;
    let mut lengths: Vec<f64> = (0..polygon.edge_count())
        .map(|i| polygon.edge_length(i))
        .collect();

    let added = count - points.len();
    while points.len() < count {
        // Lowest index wins ties: strict comparison keeps the first maximum.
        let mut longest = 0;
        for (i, &len) in lengths.iter().enumerate().skip(1) {
            if len > lengths[longest] {
                longest = i;
            }
        }
        let a = points[longest];
        let b = points[(longest + 1) % points.len()];
        let half = lengths[longest] * 0.5;
        points.insert(longest + 1, midpoint(&a, &b));
        lengths[longest] = half;
        lengths.insert(longest + 1, half);
    }
    trace!(added, count, "refined polygon");
    Polygon::new(points, closed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Point2;

    fn square(closed: bool) -> Polygon {
        Polygon::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(4.0, 0.0),
                Point2::new(4.0, 4.0),
                Point2::new(0.0, 4.0),
            ],
            closed,
        )
    }

    fn line(n: usize) -> Polygon {
        #[allow(clippy::cast_precision_loss)]
        let points = (0..n).map(|i| Point2::new(i as f64, 0.0)).collect();
        Polygon::new(points, false)
    }

    #[test]
    fn counts_match_max() {
        let (a, b) = equalize(&square(true), &line(9));
        assert_eq!(a.len(), 9);
        assert_eq!(b.len(), 9);
        assert_eq!(b, line(9));
    }

    #[test]
    fn equal_counts_are_untouched() {
        let (a, b) = equalize(&square(true), &square(true));
        assert_eq!(a, square(true));
        assert_eq!(b, square(true));
    }

    #[test]
    fn ties_go_to_lowest_edge() {
        let refined = refine_to(&square(true), 5);
        assert_eq!(refined.points[1], Point2::new(2.0, 0.0));
    }

    #[test]
    fn wrap_edge_is_refined_for_closed_only() {
        // Make the closing edge the longest one.
        let poly = Polygon::new(
            vec![
                Point2::new(0.0, 0.0),
                Point2::new(1.0, 0.0),
                Point2::new(2.0, 0.0),
                Point2::new(10.0, 0.0),
            ],
            true,
        );
        let closed = refine_to(&poly, 5);
        assert_eq!(closed.points[4], Point2::new(5.0, 0.0));

        let open = refine_to(&Polygon { closed: false, ..poly }, 5);
        assert_eq!(open.points[3], Point2::new(6.0, 0.0));
    }

    #[test]
    fn original_points_survive_in_order() {
        let original = square(true);
        let refined = refine_to(&original, 13);
        let mut it = refined.points.iter();
        for p in &original.points {
            assert!(it.any(|q| q == p), "lost {p:?}");
        }
    }

    #[test]
    fn explicit_target_raises_both() {
        let (a, b) = Equalize::new(&square(true), &square(false))
            .with_target(10)
            .execute();
        assert_eq!(a.len(), 10);
        assert_eq!(b.len(), 10);
    }

    #[test]
    fn degenerate_inputs() {
        let p = Point2::new(1.0, 1.0);
        let dup = Polygon::new(vec![p, p], true);
        let refined = refine_to(&dup, 3);
        assert_eq!(refined.points, vec![p, p, p]);
        let single = Polygon::new(vec![p], false);
        assert_eq!(refine_to(&single, 3).len(), 3);
    }
}
